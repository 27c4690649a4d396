/*
 *  main.rs
 *
 *  stripdeck - mixer strips at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Render preview images and feedback payloads from the command line
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::{debug, info, warn};
use rand::Rng;
use tiny_skia::Pixmap;

use stripdeck::config::{self, Cli, Config};
use stripdeck::feedback::encode_png;
use stripdeck::gain::{adjust_gain, format_gain, GAIN_MIN_DB, GAIN_MAX_DB};
use stripdeck::graphics::icon::render_icon;
use stripdeck::graphics::level_meter::PeakTracker;
use stripdeck::graphics::{GainFader, LevelMeter};
use stripdeck::session::{RenderRequest, RenderSession, RenderWorker};
use stripdeck::stripbus::{StripOrBus, StripOrBusKind};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

// preview frame spacing
const FRAME_SECS: f64 = 1.0 / 15.0;

fn write_png(dir: &Path, name: &str, pixmap: &Pixmap) -> Result<()> {
    let path = dir.join(name);
    let png = encode_png(pixmap)?;
    fs::write(&path, png).with_context(|| format!("writing {}", path.display()))?;
    info!("wrote {} ({}x{})", path.display(), pixmap.width(), pixmap.height());
    Ok(())
}

/// Step the meter through `frames` frames of simulated time and return the
/// last image with the levels that produced it.
fn preview_meter(cli: &Cli, cfg: &Config) -> Result<(Pixmap, Vec<f64>)> {
    let mut meter = LevelMeter::with_config(cfg.meter());
    let channels = meter.config.channel_count;
    let first = if cli.levels.is_empty() { vec![-12.0; channels] } else { cli.levels.clone() };

    let mut rng = rand::rng();
    let t0 = Instant::now();
    let mut last = None;
    for frame in 0..cli.frames.max(1) {
        let levels = if frame == 0 {
            first.clone()
        } else if cli.seed_random {
            (0..channels).map(|_| rng.random_range(GAIN_MIN_DB..=GAIN_MAX_DB)).collect()
        } else {
            vec![PeakTracker::FLOOR_DB; channels]
        };
        let now = t0 + Duration::from_secs_f64(frame as f64 * FRAME_SECS);
        let pixmap = if cfg.vertical_meter() {
            meter.render_vertical_at(&levels, now)
        } else {
            meter.render_horizontal_at(&levels, now)
        }
        .with_context(|| format!("level meter frame {frame}"))?;
        debug!("frame {frame}: levels {:?} peaks {:?}", levels, meter.peaks());
        last = Some((pixmap, levels));
    }
    last.context("no frames rendered")
}

/// Blank status for the selected channel, with its default title.
fn preview_status(cli: &Cli, cfg: &Config) -> Result<(StripOrBus, String)> {
    let kind = cfg.mixer_kind();
    let (which, index) = if cli.bus {
        (StripOrBusKind::Bus, 0)
    } else if cli.virtual_strip {
        // virtual inputs follow the physical ones
        (StripOrBusKind::Strip, kind.inputs().0)
    } else {
        (StripOrBusKind::Strip, 0)
    };
    let status = StripOrBus::for_index(kind, which, index).context("building status")?;
    Ok((status, which.default_title(index)))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    // the file is read before logging is up; report it afterwards
    let path = config::config_path(&cli);
    let cfg = config::load_from(&cli, path.as_deref()).context("loading configuration")?;

    let level = cfg.log_level.clone().unwrap_or_else(|| "info".to_string());
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();

    info!("{} v.{} built {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), BUILD_DATE);
    match &path {
        Some(p) => info!("using config {}", p.display()),
        None => info!("no config file found, using defaults"),
    }

    if cli.dump_config {
        println!("{}", config::dump(&cfg)?);
        return Ok(());
    }

    fs::create_dir_all(&cli.out).with_context(|| format!("creating {}", cli.out.display()))?;

    let (meter_img, levels) = preview_meter(&cli, &cfg)?;
    write_png(&cli.out, "level_meter.png", &meter_img)?;

    let gain = adjust_gain(cli.gain.unwrap_or(0.0), cfg.gain_step_db(), cli.ticks);
    info!("gain {}", format_gain(gain));
    let fader = GainFader::with_config(cfg.fader());
    write_png(&cli.out, "gain_fader.png", &fader.render_horizontal(gain)?)?;

    let (status, title) = preview_status(&cli, &cfg)?;
    write_png(&cli.out, "status.png", &status.render_indicator()?)?;

    if let Some(path) = cli.icon.as_deref() {
        write_png(&cli.out, "icon.png", &render_icon(path, &cfg.icon())?)?;
    }

    if cli.feedback {
        let session = RenderSession::from_config(&cfg);
        let mut worker = RenderWorker::spawn(session, 4);
        let req = RenderRequest {
            context: "preview".into(),
            title: Some(title),
            levels: Some(levels),
            gain: Some(gain),
            status: Some(status),
            icon: cli.icon.clone(),
        };
        if !worker.submit(req) {
            warn!("feedback request not accepted");
        }
        match worker.rx.recv().await {
            Some(update) => println!("{}", update.payload.to_json()?),
            None => warn!("render worker closed without output"),
        }
        worker.shutdown();
    }

    Ok(())
}
