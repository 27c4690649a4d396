/*
 *  graphics/status_indicator.rs
 *
 *  stripdeck - mixer strips at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Rows of boolean flag markers (routing, mute, solo, ...)
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

use super::canvas::{circle_path, fill_path, new_surface, rounded_rect_path};
use super::color::Rgba;
use super::error::{ColorList, RenderError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    #[default]
    Circle,
    Square,
}

/// Shape, colours and placement for one row of markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RowStyle {
    /// colour per flag position when set
    pub colors_true: Vec<Rgba>,
    /// colour per flag position when clear
    pub colors_false: Vec<Rgba>,
    pub shape: Shape,
    pub item_margin: f32,
    pub item_size: f32,
    /// squares only
    pub item_corner_radius: f32,
    pub margin_top: f32,
    /// used when `rtl` is false
    pub margin_left: f32,
    /// used when `rtl` is true
    pub margin_right: f32,
    pub rtl: bool,
}

impl RowStyle {
    /// Left edge of item `i`.
    fn item_x(&self, i: usize, image_width: f32) -> f32 {
        let step = i as f32 * (self.item_size + self.item_margin);
        if self.rtl {
            image_width - step - self.margin_right - self.item_size
        } else {
            step + self.margin_left
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StatusIndicatorConfig {
    pub width: u32,
    pub height: u32,
    pub rows: Vec<RowStyle>,
}

#[derive(Debug, Clone, Default)]
pub struct StatusIndicator {
    pub config: StatusIndicatorConfig,
}

impl StatusIndicator {
    pub fn with_config(config: StatusIndicatorConfig) -> Self {
        Self { config }
    }

    /// Check that every supplied row has a style with enough colours.
    pub fn check<R: AsRef<[bool]>>(&self, flags: &[R]) -> Result<(), RenderError> {
        let rows = &self.config.rows;
        if flags.len() > rows.len() {
            return Err(RenderError::MissingRowStyle { needed: flags.len(), available: rows.len() });
        }
        for (row, (row_flags, style)) in flags.iter().zip(rows).enumerate() {
            let needed = row_flags.as_ref().len();
            if needed > style.colors_true.len() {
                return Err(RenderError::StyleMismatch {
                    row,
                    list: ColorList::True,
                    needed,
                    available: style.colors_true.len(),
                });
            }
            if needed > style.colors_false.len() {
                return Err(RenderError::StyleMismatch {
                    row,
                    list: ColorList::False,
                    needed,
                    available: style.colors_false.len(),
                });
            }
        }
        Ok(())
    }

    /// Draw each row of flags top to bottom. Rows stack: the cursor moves
    /// down by a row's `margin_top` before it and its `item_size` after it.
    pub fn render<R: AsRef<[bool]>>(&self, flags: &[R]) -> Result<Pixmap, RenderError> {
        self.check(flags)?;
        let mut pixmap = new_surface(self.config.width, self.config.height)?;
        let width = self.config.width as f32;

        let mut y = 0.0_f32;
        for (row_flags, style) in flags.iter().zip(&self.config.rows) {
            y += style.margin_top;
            for (i, &flag) in row_flags.as_ref().iter().enumerate() {
                let color = if flag { style.colors_true[i] } else { style.colors_false[i] };
                let x = style.item_x(i, width);
                let path = match style.shape {
                    Shape::Circle => {
                        let r = style.item_size / 2.0;
                        circle_path(x + r, y + r, r)
                    }
                    Shape::Square => rounded_rect_path(
                        x,
                        y,
                        style.item_size,
                        style.item_size,
                        style.item_corner_radius,
                    ),
                };
                if let Some(path) = path {
                    fill_path(&mut pixmap, &path, color, None);
                }
            }
            y += style.item_size;
        }

        Ok(pixmap)
    }
}
