/*
 *  graphics/mod.rs
 *
 *  stripdeck - mixer strips at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Raster renderers for the key and dial displays
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

// Core types
pub mod color;
pub mod error;
pub mod canvas;

// Renderers
pub mod level_meter;
pub mod gain_fader;
pub mod status_indicator;
pub mod icon;

pub use color::Rgba;
pub use error::{ColorList, GeometryFault, RenderError};
pub use gain_fader::{GainFader, GainFaderConfig};
pub use icon::IconStyle;
pub use level_meter::{LevelMeter, LevelMeterConfig, MeterGeometry, PeakHold};
pub use status_indicator::{RowStyle, Shape, StatusIndicator, StatusIndicatorConfig};
