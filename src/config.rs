use serde::{Deserialize, Serialize};
use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

use crate::gain::{parse_gain_delta, DEFAULT_GAIN_DELTA_DB};
use crate::graphics::{GainFaderConfig, IconStyle, LevelMeterConfig, PeakHold};
use crate::stripbus::MixerKind;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration. Unset groups fall back to renderer defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    pub mixer_kind: Option<MixerKind>,
    /// dB per dial tick, as typed in the key settings
    pub gain_step: Option<String>,
    pub vertical_meter: Option<bool>,
    pub meter: Option<LevelMeterConfig>,
    pub fader: Option<GainFaderConfig>,
    pub icon: Option<IconStyle>,
}

impl Config {
    pub fn mixer_kind(&self) -> MixerKind {
        self.mixer_kind.unwrap_or(MixerKind::Potato)
    }

    pub fn gain_step_db(&self) -> f64 {
        self.gain_step.as_deref().map_or(DEFAULT_GAIN_DELTA_DB, parse_gain_delta)
    }

    pub fn vertical_meter(&self) -> bool {
        self.vertical_meter.unwrap_or(false)
    }

    /// Configured meter, or the stereo dial meter when none is set.
    pub fn meter(&self) -> LevelMeterConfig {
        self.meter.clone().unwrap_or_else(LevelMeterConfig::dial)
    }

    pub fn fader(&self) -> GainFaderConfig {
        self.fader.unwrap_or_default()
    }

    pub fn icon(&self) -> IconStyle {
        self.icon.unwrap_or_default()
    }
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "stripdeck", about = "Mixer strip key renderer", version, disable_help_flag = false)]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    /// verbose logging
    #[arg(long, action = ArgAction::SetTrue)]
    pub debug: bool,
    #[arg(long)]
    pub log_level: Option<String>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
    /// output directory for the rendered images
    #[arg(long, default_value = ".", value_hint = ValueHint::DirPath)]
    pub out: PathBuf,
    /// per-channel levels in dB, e.g. -6,-30
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub levels: Vec<f64>,
    /// fader gain in dB
    #[arg(long, allow_hyphen_values = true)]
    pub gain: Option<f64>,
    /// dial step per tick, in dB
    #[arg(long, allow_hyphen_values = true)]
    pub step: Option<String>,
    /// dial ticks applied to --gain
    #[arg(long, allow_hyphen_values = true, default_value_t = 0)]
    pub ticks: i32,
    /// mixer edition: basic | banana | potato
    #[arg(long)]
    pub kind: Option<MixerKind>,
    /// peak hold mode for the meter
    #[arg(long, value_parser = parse_peak_hold)]
    pub peak_hold: Option<PeakHold>,
    /// show a bus rather than a strip
    #[arg(long, action = ArgAction::SetTrue)]
    pub bus: bool,
    /// show a virtual input strip
    #[arg(long = "virtual", action = ArgAction::SetTrue)]
    pub virtual_strip: bool,
    /// lay the meter out bottom-to-top
    #[arg(long, action = ArgAction::SetTrue)]
    pub vertical: bool,
    /// meter frames to step, 1/15 s apart
    #[arg(long, default_value_t = 1)]
    pub frames: u32,
    /// random levels after the first frame
    #[arg(long, action = ArgAction::SetTrue)]
    pub seed_random: bool,
    /// also rasterise this SVG path data as icon.png
    #[arg(long)]
    pub icon: Option<String>,
    /// print the feedback JSON payload
    #[arg(long, action = ArgAction::SetTrue)]
    pub feedback: bool,
}

fn parse_peak_hold(s: &str) -> Result<PeakHold, String> {
    serde_yaml::from_str(s).map_err(|_| {
        format!("'{s}' is not one of none, show_peak, fill_peak, fill_peak_show_current")
    })
}

/// Config file to read: the explicit `--config` path, else the first
/// search hit.
pub fn config_path(cli: &Cli) -> Option<PathBuf> {
    cli.config.clone().or_else(find_config_file)
}

/// Public entry point: read YAML, merge, layer CLI, validate.
pub fn load(cli: &Cli) -> Result<Config, ConfigError> {
    load_from(cli, config_path(cli).as_deref())
}

/// Same as [`load`] with the file already chosen, so callers can report
/// it once logging is up.
pub fn load_from(cli: &Cli, path: Option<&Path>) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file
    if let Some(p) = path {
        if !p.exists() {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
        let y = read_yaml(p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;

    Ok(cfg)
}

/// Pretty YAML of the effective config.
pub fn dump(cfg: &Config) -> Result<String, ConfigError> {
    Ok(serde_yaml::to_string(cfg)?)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/stripdeck/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/stripdeck/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/stripdeck.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["stripdeck.yaml", "config.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    from_yaml_str(&s)
}

pub fn from_yaml_str(s: &str) -> Result<Config, ConfigError> {
    let cfg: Config = serde_yaml::from_str(s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    if src.log_level.is_some()      { dst.log_level = src.log_level; }
    if src.mixer_kind.is_some()     { dst.mixer_kind = src.mixer_kind; }
    if src.gain_step.is_some()      { dst.gain_step = src.gain_step; }
    if src.vertical_meter.is_some() { dst.vertical_meter = src.vertical_meter; }
    if src.meter.is_some()          { dst.meter = src.meter; }
    if src.fader.is_some()          { dst.fader = src.fader; }
    if src.icon.is_some()           { dst.icon = src.icon; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.debug {
        cfg.log_level = Some("debug".into());
    } else if cli.log_level.is_some() {
        cfg.log_level = cli.log_level.clone();
    }
    if cli.kind.is_some()  { cfg.mixer_kind = cli.kind; }
    if cli.step.is_some()  { cfg.gain_step = cli.step.clone(); }
    if cli.vertical        { cfg.vertical_meter = Some(true); }
    if let Some(mode) = cli.peak_hold {
        cfg.meter.get_or_insert_with(LevelMeterConfig::dial).peak_hold = mode;
    }
}

/// Reject anything the renderers would refuse at draw time.
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(meter) = cfg.meter.as_ref() {
        meter.geometry().map_err(|e| ConfigError::Validation(format!("meter: {e}")))?;
    }
    if let Some(fader) = cfg.fader.as_ref() {
        if fader.width == 0 || fader.height == 0 {
            return Err(ConfigError::Validation("fader width/height must be > 0".into()));
        }
        if fader.db_max <= fader.db_min {
            return Err(ConfigError::Validation("fader db_max must exceed db_min".into()));
        }
    }
    if let Some(icon) = cfg.icon.as_ref() {
        if icon.image_size == 0 || icon.glyph_size == 0 {
            return Err(ConfigError::Validation("icon sizes must be > 0".into()));
        }
    }
    Ok(())
}
