/*
 *  graphics/color.rs
 *
 *  stripdeck - mixer strips at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  RGBA colour values shared by every renderer
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

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Straight (non-premultiplied) 8-bit RGBA colour.
///
/// Colours are written in config files as `#rgb`, `#rrggbb` or `#rrggbbaa`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid colour '{0}': expected #rgb, #rrggbb or #rrggbbaa")]
pub struct ParseColorError(String);

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    pub const BLACK: Rgba = Rgba::opaque(0, 0, 0);
    pub const WHITE: Rgba = Rgba::opaque(0xff, 0xff, 0xff);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Convert into the raster backend colour.
    pub fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }

    /// Paint that fills with this colour; `anti_alias` is off for cell grids.
    pub fn paint(self, anti_alias: bool) -> tiny_skia::Paint<'static> {
        let mut paint = tiny_skia::Paint::default();
        paint.set_color(self.to_skia());
        paint.anti_alias = anti_alias;
        paint
    }
}

impl From<tiny_skia::ColorU8> for Rgba {
    fn from(c: tiny_skia::ColorU8) -> Self {
        Rgba::new(c.red(), c.green(), c.blue(), c.alpha())
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

impl FromStr for Rgba {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ParseColorError(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(bad)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(bad());
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| bad());
        let nibble = |i: usize| {
            u8::from_str_radix(&hex[i..i + 1], 16)
                .map(|n| n * 0x11)
                .map_err(|_| bad())
        };
        match hex.len() {
            3 => Ok(Rgba::opaque(nibble(0)?, nibble(1)?, nibble(2)?)),
            6 => Ok(Rgba::opaque(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Rgba::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => Err(bad()),
        }
    }
}

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Palette shared by the fader defaults and the status presets.
pub mod palette {
    use super::Rgba;

    pub const INACTIVE: Rgba = Rgba::opaque(0x2c, 0x3d, 0x4d);
    pub const BUS: Rgba = Rgba::opaque(0x70, 0xc3, 0x99);
    pub const MUTE: Rgba = Rgba::opaque(0xf6, 0x60, 0x51);
    pub const SOLO: Rgba = Rgba::opaque(0xe8, 0xb1, 0x5f);
    pub const MONO: Rgba = Rgba::opaque(0x68, 0xe6, 0xf8);
    pub const EQ: Rgba = Rgba::opaque(0x29, 0x6f, 0xfd);
    pub const OVERAMPLIFIED: Rgba = Rgba::opaque(0xf8, 0x63, 0x4d);
    pub const SHADE: Rgba = Rgba::new(0, 0, 0, 159);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!("#fff".parse::<Rgba>().unwrap(), Rgba::WHITE);
        assert_eq!("#2c3d4d".parse::<Rgba>().unwrap(), palette::INACTIVE);
        assert_eq!("#0000009f".parse::<Rgba>().unwrap(), palette::SHADE);
        assert!("2c3d4d".parse::<Rgba>().is_err());
        assert!("#2c3d4".parse::<Rgba>().is_err());
        assert!("#zzzzzz".parse::<Rgba>().is_err());
    }

    #[test]
    fn test_display_is_parseable() {
        let c = Rgba::new(1, 2, 3, 4);
        assert_eq!(c.to_string(), "#01020304");
        assert_eq!(c.to_string().parse::<Rgba>().unwrap(), c);
    }

    #[test]
    fn test_yaml_roundtrip_field() {
        #[derive(Serialize, Deserialize)]
        struct Holder {
            c: Rgba,
        }
        let h: Holder = serde_yaml::from_str("c: '#f8634d'").unwrap();
        assert_eq!(h.c, palette::OVERAMPLIFIED);
        let s = serde_yaml::to_string(&h).unwrap();
        assert!(s.contains("#f8634dff"));
    }
}
