/*
 *  graphics/level_meter.rs
 *
 *  stripdeck - mixer strips at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  LED-bargraph level meter with peak hold and decay
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

//! Multi-channel level meter.
//!
//! Each channel is a row of `cell_count` cells spanning `db_min..db_max`.
//! Cells are coloured by zone (normal below `db_good`, good below 0 dB,
//! clipped from 0 dB up) and lit or unlit depending on the current level or
//! the tracked peak, per [`PeakHold`].
//!
//! The lit-cell count for the *current* level truncates, while zone bounds
//! and the peak cell round. In `FillPeakShowCurrent` that offset is what
//! keeps the live-level gap visible inside the peak bar.
//!
//! A `LevelMeter` owns its peak state and renders through `&mut self`:
//! one meter per display surface, driven by a single owner.

use std::time::Instant;

use log::debug;
use serde::{Deserialize, Serialize};
use tiny_skia::Pixmap;

use super::canvas::{fill_cell, new_surface, rotate90_ccw};
use super::color::Rgba;
use super::error::{GeometryFault, RenderError};

/// How the tracked peak is overlaid on the live level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PeakHold {
    /// live level only
    #[default]
    None,
    /// live level plus a single lit marker at the peak
    ShowPeak,
    /// bar filled up to the peak
    FillPeak,
    /// bar filled up to the peak with the live-level cell punched out
    FillPeakShowCurrent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Padding {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl Default for Padding {
    fn default() -> Self {
        Self { top: 1, right: 1, bottom: 1, left: 1 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeterImage {
    pub width: i32,
    pub height: i32,
    pub padding: Padding,
    pub background: Rgba,
}

impl Default for MeterImage {
    fn default() -> Self {
        Self {
            width: 100,
            height: 100,
            padding: Padding::default(),
            background: Rgba::TRANSPARENT,
        }
    }
}

/// On/off colour for each zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellColors {
    pub normal: Rgba,
    pub good: Rgba,
    pub clipped: Rgba,
    pub normal_off: Rgba,
    pub good_off: Rgba,
    pub clipped_off: Rgba,
}

impl Default for CellColors {
    fn default() -> Self {
        Self {
            normal: Rgba::opaque(133, 173, 185),
            good: Rgba::opaque(30, 254, 91),
            clipped: Rgba::opaque(250, 0, 0),
            normal_off: Rgba::opaque(25, 27, 27),
            good_off: Rgba::opaque(25, 27, 27),
            clipped_off: Rgba::opaque(31, 23, 21),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeterCell {
    pub length: i32,
    pub margin_x: i32,
    pub margin_y: i32,
    pub colors: CellColors,
}

impl Default for MeterCell {
    fn default() -> Self {
        Self { length: 1, margin_x: 1, margin_y: 1, colors: CellColors::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelMeterConfig {
    pub channel_count: usize,
    pub db_min: f64,
    pub db_good: f64,
    pub db_max: f64,
    pub peak_hold: PeakHold,
    pub peak_decay_db_per_sec: f64,
    pub image: MeterImage,
    pub cell: MeterCell,
}

impl Default for LevelMeterConfig {
    fn default() -> Self {
        Self {
            channel_count: 2,
            db_min: -60.0,
            db_good: -24.0,
            db_max: 12.0,
            peak_hold: PeakHold::None,
            peak_decay_db_per_sec: 12.0,
            image: MeterImage::default(),
            cell: MeterCell::default(),
        }
    }
}

/// Cell layout derived from a validated configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeterGeometry {
    pub cell_length: i32,
    pub cell_height: i32,
    pub cell_count: i32,
    pub min_good_cell_index: i32,
    pub min_clip_cell_index: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Zone {
    Normal,
    Good,
    Clipped,
}

impl LevelMeterConfig {
    /// Stereo dial meter: a thin 108x5 strip with a filled peak bar.
    pub fn dial() -> Self {
        Self {
            channel_count: 2,
            peak_hold: PeakHold::FillPeakShowCurrent,
            image: MeterImage {
                width: 108,
                height: 5,
                padding: Padding { top: 1, right: 3, bottom: 1, left: 2 },
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), RenderError> {
        if self.channel_count == 0 {
            return Err(RenderError::config("channel_count", "must be greater than 0"));
        }
        if i32::try_from(self.channel_count).is_err() {
            return Err(RenderError::config("channel_count", "must fit in 32 bits"));
        }
        if !(self.db_min < self.db_max) {
            return Err(RenderError::config("db_min", "must be less than db_max"));
        }
        if !(self.db_min <= self.db_good && self.db_good <= self.db_max) {
            return Err(RenderError::config("db_good", "must be between db_min and db_max"));
        }
        if self.db_max < 0.0 {
            return Err(RenderError::config("db_max", "must be at least 0.0"));
        }
        if self.image.width <= 0 {
            return Err(RenderError::config("image.width", "must be greater than 0"));
        }
        if self.image.height <= 0 {
            return Err(RenderError::config("image.height", "must be greater than 0"));
        }
        let p = &self.image.padding;
        for (field, v) in [
            ("image.padding.top", p.top),
            ("image.padding.right", p.right),
            ("image.padding.bottom", p.bottom),
            ("image.padding.left", p.left),
        ] {
            if v < 0 {
                return Err(RenderError::config(field, "must be greater than or equal to 0"));
            }
        }
        if self.cell.length <= 0 {
            return Err(RenderError::config("cell.length", "must be greater than 0"));
        }
        if self.cell.margin_x < 0 {
            return Err(RenderError::config("cell.margin_x", "must be greater than or equal to 0"));
        }
        if self.cell.margin_y < 0 {
            return Err(RenderError::config("cell.margin_y", "must be greater than or equal to 0"));
        }
        // the laid-out extent is bounded by size plus one margin on each axis
        if self.image.width.checked_add(self.cell.margin_x).is_none() {
            return Err(RenderError::config("cell.margin_x", "overflows the image width"));
        }
        if self.image.height.checked_add(self.cell.margin_y).is_none() {
            return Err(RenderError::config("cell.margin_y", "overflows the image height"));
        }
        Ok(())
    }

    /// Validate, then derive the cell layout.
    ///
    /// Worked in i64 so extreme padding or cell sizes cannot overflow. On
    /// success every pixel coordinate the renderer derives fits in i32.
    pub fn geometry(&self) -> Result<MeterGeometry, RenderError> {
        self.validate()?;

        let p = &self.image.padding;
        let channels = self.channel_count as i64;
        let (length, margin_x, margin_y) = (
            i64::from(self.cell.length),
            i64::from(self.cell.margin_x),
            i64::from(self.cell.margin_y),
        );

        let height_no_padding = i64::from(self.image.height) - i64::from(p.top) - i64::from(p.bottom);
        let cell_height = (height_no_padding - margin_y * (channels - 1)) / channels;
        if cell_height <= 0 {
            return Err(RenderError::Geometry(GeometryFault::CellHeight));
        }

        let width_no_padding = i64::from(self.image.width) - i64::from(p.left) - i64::from(p.right);
        let cell_count = (width_no_padding + margin_x) / (length + margin_x);
        if cell_count <= 0 {
            return Err(RenderError::Geometry(GeometryFault::CellCount));
        }

        // both are at most the padded-out image extent
        let cell_height = i32::try_from(cell_height).map_err(|_| RenderError::Geometry(GeometryFault::CellHeight))?;
        let cell_count = i32::try_from(cell_count).map_err(|_| RenderError::Geometry(GeometryFault::CellCount))?;

        Ok(MeterGeometry {
            cell_length: self.cell.length,
            cell_height,
            cell_count,
            min_good_cell_index: self.cell_index(self.db_good, cell_count),
            min_clip_cell_index: self.cell_index(0.0, cell_count),
        })
    }

    /// Rounded cell index for `db`; used for zone bounds and the peak.
    /// Not clamped, so it may fall outside `0..cell_count`.
    pub fn cell_index(&self, db: f64, cell_count: i32) -> i32 {
        ((db - self.db_min) / (self.db_max - self.db_min) * cell_count as f64).round() as i32
    }

    /// Number of lit cells for the live level: clamped fraction, truncated.
    pub fn lit_cell_count(&self, db: f64, cell_count: i32) -> i32 {
        let fraction = ((db - self.db_min) / (self.db_max - self.db_min)).clamp(0.0, 1.0);
        (fraction * cell_count as f64) as i32
    }

    /// Same meter laid out for a counter-clockwise quarter turn: width and
    /// height swap, margins swap, and padding shifts one side clockwise
    /// (top takes right, right takes bottom, bottom takes left, left takes
    /// top). Configured top padding therefore lands below the cells.
    pub fn transposed(&self) -> Self {
        let p = self.image.padding;
        let mut t = self.clone();
        t.image.width = self.image.height;
        t.image.height = self.image.width;
        t.image.padding = Padding {
            top: p.right,
            right: p.bottom,
            bottom: p.left,
            left: p.top,
        };
        t.cell.margin_x = self.cell.margin_y;
        t.cell.margin_y = self.cell.margin_x;
        t
    }
}

/// Decaying per-channel peak, sharing a single clock across channels.
#[derive(Debug, Clone, Default)]
pub struct PeakTracker {
    db: Vec<f64>,
    at: Option<Instant>,
}

impl PeakTracker {
    /// Silence floor a fresh tracker starts from.
    pub const FLOOR_DB: f64 = -200.0;

    pub fn reset(&mut self, channels: usize, now: Instant) {
        self.db = vec![Self::FLOOR_DB; channels];
        self.at = Some(now);
    }

    /// Raise each channel to a louder reading or decay it by
    /// `decay_per_sec` times the time since the previous update.
    pub fn update(&mut self, levels: &[f64], decay_per_sec: f64, now: Instant) -> &[f64] {
        let at = match self.at {
            Some(at) if self.db.len() == levels.len() => at,
            _ => {
                debug!("level meter: peak tracker (re)initialised for {} channels", levels.len());
                self.reset(levels.len(), now);
                now
            }
        };
        let decay = decay_per_sec * now.saturating_duration_since(at).as_secs_f64();
        for (peak, &current) in self.db.iter_mut().zip(levels) {
            if current > *peak {
                *peak = current;
            } else {
                *peak -= decay;
            }
        }
        self.at = Some(now);
        &self.db
    }

    pub fn peaks(&self) -> &[f64] {
        &self.db
    }
}

/// Level meter bound to one display surface.
#[derive(Debug, Clone, Default)]
pub struct LevelMeter {
    pub config: LevelMeterConfig,
    peaks: PeakTracker,
}

impl LevelMeter {
    /// Default look for `channel_count` channels.
    pub fn new(channel_count: usize) -> Self {
        Self::with_config(LevelMeterConfig { channel_count, ..Default::default() })
    }

    pub fn with_config(config: LevelMeterConfig) -> Self {
        Self { config, peaks: PeakTracker::default() }
    }

    /// Tracked peaks in dB; empty until the first render.
    pub fn peaks(&self) -> &[f64] {
        self.peaks.peaks()
    }

    pub fn reset_peaks(&mut self) {
        self.peaks.reset(self.config.channel_count, Instant::now());
    }

    pub fn geometry(&self) -> Result<MeterGeometry, RenderError> {
        self.config.geometry()
    }

    pub fn render_horizontal(&mut self, levels_db: &[f64]) -> Result<Pixmap, RenderError> {
        self.render_horizontal_at(levels_db, Instant::now())
    }

    pub fn render_vertical(&mut self, levels_db: &[f64]) -> Result<Pixmap, RenderError> {
        self.render_vertical_at(levels_db, Instant::now())
    }

    /// Render with an explicit clock; peak decay is measured against `now`.
    pub fn render_horizontal_at(&mut self, levels_db: &[f64], now: Instant) -> Result<Pixmap, RenderError> {
        let config = self.config.clone();
        self.render_with(&config, levels_db, now)
    }

    /// Render laid out bottom-to-top, one column per channel. Shares peak
    /// state with the horizontal view.
    pub fn render_vertical_at(&mut self, levels_db: &[f64], now: Instant) -> Result<Pixmap, RenderError> {
        // report faults against the fields as configured, not as transposed
        self.config.validate()?;
        let transposed = self.config.transposed();
        let pixmap = self.render_with(&transposed, levels_db, now)?;
        rotate90_ccw(&pixmap)
    }

    fn render_with(&mut self, cfg: &LevelMeterConfig, levels_db: &[f64], now: Instant) -> Result<Pixmap, RenderError> {
        if levels_db.len() < cfg.channel_count {
            return Err(RenderError::LevelCount {
                expected: cfg.channel_count,
                actual: levels_db.len(),
            });
        }
        let geo = cfg.geometry()?;
        let levels = &levels_db[..cfg.channel_count];
        let mut pixmap = new_surface(cfg.image.width as u32, cfg.image.height as u32)?;

        // decay runs regardless of mode so switching modes is seamless
        let peaks = self.peaks.update(levels, cfg.peak_decay_db_per_sec, now);

        let p = &cfg.image.padding;
        let channels = cfg.channel_count as i32;
        let bg_width = p.left + p.right + geo.cell_count * (geo.cell_length + cfg.cell.margin_x) - cfg.cell.margin_x;
        let bg_height = p.top + p.bottom + channels * (geo.cell_height + cfg.cell.margin_y) - cfg.cell.margin_y;
        fill_cell(&mut pixmap, 0, 0, bg_width, bg_height, cfg.image.background);

        for (ch, (&current, &peak)) in levels.iter().zip(peaks).enumerate() {
            let ch = ch as i32;
            let current_index = cfg.lit_cell_count(current, geo.cell_count);
            let peak_index = cfg.cell_index(peak, geo.cell_count);

            let min_off_index = match cfg.peak_hold {
                PeakHold::None | PeakHold::ShowPeak => current_index,
                PeakHold::FillPeak | PeakHold::FillPeakShowCurrent => peak_index,
            };

            for i in 0..geo.cell_count {
                let color = cell_color(&cfg.cell.colors, &geo, i, i < min_off_index);
                draw_cell(&mut pixmap, cfg, &geo, ch, i, color);
            }

            match cfg.peak_hold {
                PeakHold::ShowPeak => {
                    let color = cell_color(&cfg.cell.colors, &geo, peak_index, true);
                    draw_cell(&mut pixmap, cfg, &geo, ch, peak_index, color);
                }
                PeakHold::FillPeakShowCurrent if current_index != peak_index => {
                    let color = cell_color(&cfg.cell.colors, &geo, current_index, false);
                    draw_cell(&mut pixmap, cfg, &geo, ch, current_index, color);
                }
                _ => {}
            }
        }

        Ok(pixmap)
    }
}

fn zone(geo: &MeterGeometry, index: i32) -> Zone {
    if index < geo.min_good_cell_index {
        Zone::Normal
    } else if index < geo.min_clip_cell_index {
        Zone::Good
    } else {
        Zone::Clipped
    }
}

fn cell_color(colors: &CellColors, geo: &MeterGeometry, index: i32, lit: bool) -> Rgba {
    match (zone(geo, index), lit) {
        (Zone::Normal, true) => colors.normal,
        (Zone::Good, true) => colors.good,
        (Zone::Clipped, true) => colors.clipped,
        (Zone::Normal, false) => colors.normal_off,
        (Zone::Good, false) => colors.good_off,
        (Zone::Clipped, false) => colors.clipped_off,
    }
}

/// Paint one cell; out-of-range channels or indices are skipped.
fn draw_cell(pixmap: &mut Pixmap, cfg: &LevelMeterConfig, geo: &MeterGeometry, ch: i32, index: i32, color: Rgba) {
    if ch < 0 || ch >= cfg.channel_count as i32 || index < 0 || index >= geo.cell_count {
        return;
    }
    let x = index * (geo.cell_length + cfg.cell.margin_x) + cfg.image.padding.left;
    let y = ch * (geo.cell_height + cfg.cell.margin_y) + cfg.image.padding.top;
    fill_cell(pixmap, x, y, geo.cell_length, geo.cell_height, color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::canvas::pixel_at;
    use std::time::Duration;

    const NORMAL: Rgba = Rgba::opaque(1, 0, 0);
    const GOOD: Rgba = Rgba::opaque(2, 0, 0);
    const CLIPPED: Rgba = Rgba::opaque(3, 0, 0);
    const NORMAL_OFF: Rgba = Rgba::opaque(0, 1, 0);
    const GOOD_OFF: Rgba = Rgba::opaque(0, 2, 0);
    const CLIPPED_OFF: Rgba = Rgba::opaque(0, 3, 0);

    /// one channel, ten 1px cells, no padding or margins
    fn ten_cells(peak_hold: PeakHold) -> LevelMeter {
        LevelMeter::with_config(LevelMeterConfig {
            channel_count: 1,
            peak_hold,
            image: MeterImage {
                width: 10,
                height: 1,
                padding: Padding { top: 0, right: 0, bottom: 0, left: 0 },
                background: Rgba::TRANSPARENT,
            },
            cell: MeterCell {
                length: 1,
                margin_x: 0,
                margin_y: 0,
                colors: CellColors {
                    normal: NORMAL,
                    good: GOOD,
                    clipped: CLIPPED,
                    normal_off: NORMAL_OFF,
                    good_off: GOOD_OFF,
                    clipped_off: CLIPPED_OFF,
                },
            },
            ..Default::default()
        })
    }

    fn row(pm: &Pixmap) -> Vec<Rgba> {
        (0..pm.width()).map(|x| pixel_at(pm, x, 0).unwrap()).collect()
    }

    #[test]
    fn test_geometry_ten_cells() {
        let geo = ten_cells(PeakHold::None).geometry().unwrap();
        assert_eq!(geo.cell_count, 10);
        assert_eq!(geo.cell_height, 1);
        // round(36/72*10) and round(60/72*10)
        assert_eq!(geo.min_good_cell_index, 5);
        assert_eq!(geo.min_clip_cell_index, 8);
    }

    #[test]
    fn test_zone_colours_full_scale() {
        let mut m = ten_cells(PeakHold::None);
        let pm = m.render_horizontal(&[12.0]).unwrap();
        let want = [NORMAL, NORMAL, NORMAL, NORMAL, NORMAL, GOOD, GOOD, GOOD, CLIPPED, CLIPPED];
        assert_eq!(row(&pm), want);
    }

    #[test]
    fn test_zone_colours_silence() {
        let mut m = ten_cells(PeakHold::None);
        let pm = m.render_horizontal(&[-200.0]).unwrap();
        let want = [
            NORMAL_OFF, NORMAL_OFF, NORMAL_OFF, NORMAL_OFF, NORMAL_OFF,
            GOOD_OFF, GOOD_OFF, GOOD_OFF, CLIPPED_OFF, CLIPPED_OFF,
        ];
        assert_eq!(row(&pm), want);
    }

    #[test]
    fn test_current_level_truncates() {
        let m = ten_cells(PeakHold::None);
        // 54/72*10 = 7.5
        assert_eq!(m.config.lit_cell_count(-6.0, 10), 7);
        assert_eq!(m.config.cell_index(-6.0, 10), 8);
        assert_eq!(m.config.lit_cell_count(100.0, 10), 10);
        assert_eq!(m.config.lit_cell_count(-60.0, 10), 0);
    }

    #[test]
    fn test_peak_decay_over_one_second() {
        let t0 = Instant::now();
        for mode in [PeakHold::None, PeakHold::ShowPeak, PeakHold::FillPeak, PeakHold::FillPeakShowCurrent] {
            let mut m = ten_cells(mode);
            m.render_horizontal_at(&[0.0], t0).unwrap();
            m.render_horizontal_at(&[-200.0], t0 + Duration::from_secs(1)).unwrap();
            assert!((m.peaks()[0] - (-12.0)).abs() < 1e-9, "{mode:?}: {}", m.peaks()[0]);
        }
    }

    #[test]
    fn test_show_peak_marker() {
        let t0 = Instant::now();
        let mut m = ten_cells(PeakHold::ShowPeak);
        m.render_horizontal_at(&[0.0], t0).unwrap();
        // peak -12 dB -> round(48/72*10) = 7
        let pm = m.render_horizontal_at(&[-200.0], t0 + Duration::from_secs(1)).unwrap();
        let px = row(&pm);
        assert_eq!(px[7], GOOD);
        assert_eq!(px[6], GOOD_OFF);
        assert_eq!(px[0], NORMAL_OFF);
        assert_eq!(px[8], CLIPPED_OFF);
    }

    #[test]
    fn test_fill_peak() {
        let t0 = Instant::now();
        let mut m = ten_cells(PeakHold::FillPeak);
        m.render_horizontal_at(&[0.0], t0).unwrap();
        let pm = m.render_horizontal_at(&[-200.0], t0 + Duration::from_secs(1)).unwrap();
        let px = row(&pm);
        assert_eq!(&px[..7], &[NORMAL, NORMAL, NORMAL, NORMAL, NORMAL, GOOD, GOOD]);
        assert_eq!(&px[7..], &[GOOD_OFF, CLIPPED_OFF, CLIPPED_OFF]);
    }

    #[test]
    fn test_fill_peak_show_current_punches_gap() {
        let mut m = ten_cells(PeakHold::FillPeakShowCurrent);
        // current truncates to 7, peak rounds to 8
        let pm = m.render_horizontal(&[-6.0]).unwrap();
        let px = row(&pm);
        assert_eq!(&px[..7], &[NORMAL, NORMAL, NORMAL, NORMAL, NORMAL, GOOD, GOOD]);
        assert_eq!(px[7], GOOD_OFF);
        assert_eq!(&px[8..], &[CLIPPED_OFF, CLIPPED_OFF]);
    }

    #[test]
    fn test_peak_reinitialises_on_channel_change() {
        let mut m = ten_cells(PeakHold::None);
        m.render_horizontal(&[-10.0]).unwrap();
        assert_eq!(m.peaks().len(), 1);
        m.config.channel_count = 2;
        m.config.image.height = 3;
        m.render_horizontal(&[-200.0, -200.0]).unwrap();
        assert_eq!(m.peaks(), &[PeakTracker::FLOOR_DB, PeakTracker::FLOOR_DB]);
    }

    #[test]
    fn test_reset_peaks_returns_to_floor() {
        let mut m = ten_cells(PeakHold::None);
        m.render_horizontal(&[3.0]).unwrap();
        m.reset_peaks();
        assert_eq!(m.peaks(), &[PeakTracker::FLOOR_DB]);
    }

    #[test]
    fn test_extra_levels_ignored_short_levels_rejected() {
        let mut m = ten_cells(PeakHold::None);
        assert!(m.render_horizontal(&[-6.0, 5.0, 9.0]).is_ok());
        assert_eq!(m.peaks().len(), 1);
        m.config.channel_count = 2;
        m.config.image.height = 2;
        assert_eq!(
            m.render_horizontal(&[-6.0]).unwrap_err(),
            RenderError::LevelCount { expected: 2, actual: 1 }
        );
    }

    fn assert_rejects(field: &str, mutate: impl Fn(&mut LevelMeterConfig)) {
        let mut cfg = ten_cells(PeakHold::None).config;
        mutate(&mut cfg);
        match cfg.validate() {
            Err(RenderError::Configuration { field: f, .. }) => assert_eq!(f, field),
            other => panic!("{field}: expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_names_field() {
        assert_rejects("db_min", |c| c.db_min = 20.0);
        assert_rejects("db_good", |c| c.db_good = -80.0);
        assert_rejects("db_max", |c| {
            c.db_max = -1.0;
            c.db_good = -30.0;
        });
        assert_rejects("image.width", |c| c.image.width = 0);
        assert_rejects("image.height", |c| c.image.height = -1);
        assert_rejects("image.padding.left", |c| c.image.padding.left = -1);
        assert_rejects("cell.length", |c| c.cell.length = 0);
        assert_rejects("cell.margin_y", |c| c.cell.margin_y = -2);
        assert_rejects("channel_count", |c| c.channel_count = 0);
    }

    #[test]
    fn test_degenerate_geometry() {
        let mut m = LevelMeter::new(2);
        m.config.image.height = 1;
        m.config.image.padding = Padding { top: 0, right: 0, bottom: 0, left: 0 };
        assert_eq!(
            m.render_horizontal(&[-6.0, -6.0]).unwrap_err(),
            RenderError::Geometry(GeometryFault::CellHeight)
        );

        let mut m = LevelMeter::new(1);
        m.config.image.width = 3;
        m.config.cell.length = 4;
        assert_eq!(
            m.render_horizontal(&[-6.0]).unwrap_err(),
            RenderError::Geometry(GeometryFault::CellCount)
        );
    }

    #[test]
    fn test_failed_render_keeps_peak_state() {
        let t0 = Instant::now();
        let mut m = ten_cells(PeakHold::None);
        m.render_horizontal_at(&[0.0], t0).unwrap();
        m.config.cell.length = 0;
        assert!(m.render_horizontal_at(&[-200.0], t0 + Duration::from_secs(5)).is_err());
        assert_eq!(m.peaks(), &[0.0]);
    }

    #[test]
    fn test_transposed_layout() {
        let mut cfg = LevelMeterConfig::default();
        cfg.image.width = 5;
        cfg.image.height = 108;
        cfg.image.padding = Padding { top: 3, right: 1, bottom: 2, left: 0 };
        cfg.cell.margin_x = 4;
        cfg.cell.margin_y = 0;
        let t = cfg.transposed();
        assert_eq!((t.image.width, t.image.height), (108, 5));
        assert_eq!(t.image.padding, Padding { top: 1, right: 2, bottom: 0, left: 3 });
        assert_eq!((t.cell.margin_x, t.cell.margin_y), (0, 4));
    }

    #[test]
    fn test_vertical_rises_from_bottom() {
        let mut m = ten_cells(PeakHold::None);
        m.config.image.width = 1;
        m.config.image.height = 10;
        let pm = m.render_vertical(&[12.0]).unwrap();
        assert_eq!((pm.width(), pm.height()), (1, 10));
        assert_eq!(pixel_at(&pm, 0, 9), Some(NORMAL));
        assert_eq!(pixel_at(&pm, 0, 0), Some(CLIPPED));
    }

    #[test]
    fn test_vertical_top_padding_lands_below_cells() {
        const BG: Rgba = Rgba::opaque(9, 9, 9);
        let mut m = ten_cells(PeakHold::None);
        m.config.image.width = 3;
        m.config.image.height = 12;
        m.config.image.padding.top = 2;
        m.config.image.background = BG;
        let pm = m.render_vertical(&[12.0]).unwrap();
        assert_eq!((pm.width(), pm.height()), (3, 12));
        assert_eq!(pixel_at(&pm, 1, 11), Some(BG));
        assert_eq!(pixel_at(&pm, 1, 10), Some(BG));
        assert_eq!(pixel_at(&pm, 1, 9), Some(NORMAL));
        assert_eq!(pixel_at(&pm, 1, 0), Some(CLIPPED));
    }

    #[test]
    fn test_vertical_errors_name_configured_field() {
        let cases: [(&str, fn(&mut LevelMeterConfig)); 3] = [
            ("image.height", |c| c.image.height = 0),
            ("image.padding.top", |c| c.image.padding.top = -1),
            ("cell.margin_x", |c| c.cell.margin_x = -1),
        ];
        for (field, mutate) in cases {
            let mut m = ten_cells(PeakHold::None);
            mutate(&mut m.config);
            match m.render_vertical(&[-6.0]) {
                Err(RenderError::Configuration { field: f, .. }) => assert_eq!(f, field),
                other => panic!("{field}: expected configuration error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_extreme_sizes_are_errors_not_panics() {
        let cases: [fn(&mut LevelMeterConfig); 6] = [
            |c| c.cell.length = i32::MAX,
            |c| c.cell.margin_x = i32::MAX,
            |c| {
                c.channel_count = 2;
                c.image.height = 3;
                c.cell.margin_y = i32::MAX;
            },
            |c| {
                c.image.padding.left = i32::MAX;
                c.image.padding.right = i32::MAX;
            },
            |c| {
                c.image.padding.top = i32::MAX;
                c.image.padding.bottom = i32::MAX;
            },
            |c| c.channel_count = usize::MAX,
        ];
        for (i, mutate) in cases.iter().enumerate() {
            let mut m = ten_cells(PeakHold::None);
            mutate(&mut m.config);
            let levels = vec![-6.0; m.config.channel_count.min(2)];
            assert!(m.config.geometry().is_err(), "case {i}");
            assert!(m.render_horizontal(&levels).is_err(), "case {i}");
            assert!(m.render_vertical(&levels).is_err(), "case {i}");
            assert!(m.peaks().is_empty(), "case {i}");
        }
    }

    #[test]
    fn test_margin_overflow_is_named() {
        assert_rejects("cell.margin_x", |c| c.cell.margin_x = i32::MAX);
        assert_rejects("cell.margin_y", |c| c.cell.margin_y = i32::MAX);
        assert_rejects("channel_count", |c| c.channel_count = i32::MAX as usize + 1);
    }

    #[test]
    fn test_dial_geometry() {
        let cfg = LevelMeterConfig::dial();
        assert_eq!((cfg.image.width, cfg.image.height), (108, 5));
        assert_eq!(cfg.peak_hold, PeakHold::FillPeakShowCurrent);
        let geo = cfg.geometry().unwrap();
        // (108 - 5 + 1) / 2 and (5 - 2 - 1) / 2
        assert_eq!(geo.cell_count, 52);
        assert_eq!(geo.cell_height, 1);
        let pm = LevelMeter::with_config(cfg).render_horizontal(&[-6.0, -12.0]).unwrap();
        assert_eq!((pm.width(), pm.height()), (108, 5));
    }

    #[test]
    fn test_vertical_shares_peaks() {
        let t0 = Instant::now();
        let mut m = ten_cells(PeakHold::None);
        m.render_horizontal_at(&[0.0], t0).unwrap();
        m.config.image.width = 1;
        m.config.image.height = 10;
        m.render_vertical_at(&[-200.0], t0 + Duration::from_millis(500)).unwrap();
        assert!((m.peaks()[0] - (-6.0)).abs() < 1e-9);
    }
}
