/*
 *  gain.rs
 *
 *  stripdeck - mixer strips at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Dial gain stepping and formatting
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

use log::warn;

pub const GAIN_MIN_DB: f64 = -60.0;
pub const GAIN_MAX_DB: f64 = 12.0;
pub const DEFAULT_GAIN_DELTA_DB: f64 = 3.0;

/// Parse a per-tick gain step from user settings. Anything unparsable
/// falls back to the default step.
pub fn parse_gain_delta(text: &str) -> f64 {
    match text.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => {
            warn!("invalid gain delta '{}', using {}", text, DEFAULT_GAIN_DELTA_DB);
            DEFAULT_GAIN_DELTA_DB
        }
    }
}

/// Apply `ticks` dial steps of `delta_db` and clamp to the mixer's range.
pub fn adjust_gain(current_db: f64, delta_db: f64, ticks: i32) -> f64 {
    (current_db + delta_db * ticks as f64).clamp(GAIN_MIN_DB, GAIN_MAX_DB)
}

pub fn format_gain(gain_db: f64) -> String {
    format!("{:.1} dB", gain_db)
}
