/*
 *  graphics/gain_fader.rs
 *
 *  stripdeck - mixer strips at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Horizontal gain fader bar
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

use serde::{Deserialize, Serialize};
use tiny_skia::Pixmap;

use super::canvas::{clip_mask, fill_path, new_surface, rounded_rect_path};
use super::color::{palette, Rgba};
use super::error::RenderError;

// largest fader side; bigger sizes are clamped
const MAX_SIDE: u32 = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaderColors {
    pub background: Rgba,
    pub border: Rgba,
    pub foreground_normal: Rgba,
    pub foreground_overamplified: Rgba,
}

impl Default for FaderColors {
    fn default() -> Self {
        Self {
            background: palette::INACTIVE,
            border: palette::SHADE,
            foreground_normal: palette::BUS,
            foreground_overamplified: palette::OVERAMPLIFIED,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GainFaderConfig {
    pub colors: FaderColors,
    pub width: u32,
    pub height: u32,
    pub rounded_corners: bool,
    pub border_width: u32,
    /// paint the border with the active foreground colour
    pub border_color_is_foreground: bool,
    pub db_min: f64,
    pub db_max: f64,
}

impl Default for GainFaderConfig {
    fn default() -> Self {
        Self {
            colors: FaderColors::default(),
            width: 108,
            height: 12,
            rounded_corners: true,
            border_width: 2,
            border_color_is_foreground: false,
            db_min: -60.0,
            db_max: 12.0,
        }
    }
}

/// Stateless fader renderer.
#[derive(Debug, Clone, Default)]
pub struct GainFader {
    pub config: GainFaderConfig,
}

impl GainFader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: GainFaderConfig) -> Self {
        Self { config }
    }

    fn corner(&self, w: f32, h: f32) -> f32 {
        if self.config.rounded_corners { w.min(h) / 2.0 } else { 0.0 }
    }

    /// Render `gain_db` as a bar filled from the left.
    ///
    /// The value is not clamped: above `db_max` the bar runs past the
    /// background into the border, clipped only by the outer outline.
    pub fn render_horizontal(&self, gain_db: f64) -> Result<Pixmap, RenderError> {
        let cfg = &self.config;
        let width = cfg.width.clamp(1, MAX_SIDE);
        let height = cfg.height.clamp(1, MAX_SIDE);
        let mut pixmap = new_surface(width, height)?;

        let fg_color = if gain_db > 0.0 {
            cfg.colors.foreground_overamplified
        } else {
            cfg.colors.foreground_normal
        };
        let border_color = if cfg.border_color_is_foreground { fg_color } else { cfg.colors.border };

        // outline doubles as the clip for everything drawn after it
        let (w, h) = (width as f32, height as f32);
        let outline = rounded_rect_path(0.0, 0.0, w, h, self.corner(w, h));
        let clip = outline.as_ref().and_then(|path| clip_mask(&pixmap, path));
        if let Some(path) = &outline {
            fill_path(&mut pixmap, path, border_color, None);
        }

        let inset = cfg.border_width as f32;
        let (iw, ih) = (w - inset * 2.0, h - inset * 2.0);
        if let Some(path) = rounded_rect_path(inset, inset, iw, ih, self.corner(iw, ih)) {
            fill_path(&mut pixmap, &path, cfg.colors.background, clip.as_ref());
        }

        if gain_db == cfg.db_min {
            return Ok(pixmap);
        }

        let fw = (iw as f64 * (gain_db - cfg.db_min) / (cfg.db_max - cfg.db_min)) as f32;
        if let Some(path) = rounded_rect_path(inset, inset, fw, ih, self.corner(fw, ih)) {
            fill_path(&mut pixmap, &path, fg_color, clip.as_ref());
        }

        Ok(pixmap)
    }
}
