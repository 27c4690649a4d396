/*
 *  stripbus.rs
 *
 *  stripdeck - mixer strips at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Strip/bus status snapshots and their indicator presets
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

//! Which markers a strip or bus shows depends on the mixer edition and on
//! whether a strip is a physical input or a virtual one. The snapshot types
//! here carry the switch states; the preset table picks the row layout and
//! arranges the flags to match it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tiny_skia::Pixmap;

use crate::graphics::color::palette;
use crate::graphics::{RenderError, RowStyle, Shape, StatusIndicator, StatusIndicatorConfig};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StripBusError {
    #[error("unknown mixer kind '{0}'")]
    UnknownKind(String),
    #[error("unknown strip/bus kind '{0}'")]
    UnknownStripOrBus(String),
    #[error("{what} index {index} is out of range (0..{count})")]
    IndexOutOfRange { what: StripOrBusKind, index: usize, count: usize },
}

/// Mixer edition; decides channel counts and indicator layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MixerKind {
    Basic,
    Banana,
    Potato,
}

impl MixerKind {
    pub fn name(&self) -> &'static str {
        match self {
            MixerKind::Basic => "basic",
            MixerKind::Banana => "banana",
            MixerKind::Potato => "potato",
        }
    }

    /// (physical, virtual) input strips
    pub fn inputs(&self) -> (usize, usize) {
        match self {
            MixerKind::Basic => (2, 1),
            MixerKind::Banana => (3, 2),
            MixerKind::Potato => (5, 3),
        }
    }

    /// (physical, virtual) output buses
    pub fn outputs(&self) -> (usize, usize) {
        match self {
            MixerKind::Basic => (1, 1),
            MixerKind::Banana => (3, 2),
            MixerKind::Potato => (5, 3),
        }
    }

    pub fn strip_count(&self) -> usize {
        let (p, v) = self.inputs();
        p + v
    }

    pub fn bus_count(&self) -> usize {
        let (p, v) = self.outputs();
        p + v
    }
}

impl fmt::Display for MixerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MixerKind {
    type Err = StripBusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(MixerKind::Basic),
            "banana" => Ok(MixerKind::Banana),
            "potato" => Ok(MixerKind::Potato),
            other => Err(StripBusError::UnknownKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum StripOrBusKind {
    #[default]
    Strip,
    Bus,
}

impl fmt::Display for StripOrBusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StripOrBusKind::Strip => f.write_str("Strip"),
            StripOrBusKind::Bus => f.write_str("Bus"),
        }
    }
}

impl FromStr for StripOrBusKind {
    type Err = StripBusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            // an unset kind means a strip
            "Strip" | "" => Ok(StripOrBusKind::Strip),
            "Bus" => Ok(StripOrBusKind::Bus),
            other => Err(StripBusError::UnknownStripOrBus(other.to_string())),
        }
    }
}

impl StripOrBusKind {
    /// Display title when the mixer has no label for the channel.
    pub fn default_title(&self, index: usize) -> String {
        format!("{} {}", self, index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StripStatus {
    pub kind: MixerKind,
    pub is_physical: bool,
    pub out_phys_bus: Vec<bool>,
    pub out_virt_bus: Vec<bool>,
    pub mute: bool,
    pub solo: bool,
    pub mono: bool,
    pub eq: bool,
    pub mc: bool,
}

impl StripStatus {
    /// All switches off, bus routing sized for `kind`.
    pub fn new(kind: MixerKind, is_physical: bool) -> Self {
        let (phys_out, virt_out) = kind.outputs();
        Self {
            kind,
            is_physical,
            out_phys_bus: vec![false; phys_out],
            out_virt_bus: vec![false; virt_out],
            mute: false,
            solo: false,
            mono: false,
            eq: false,
            mc: false,
        }
    }

    /// Blank status for strip `index`; the physical inputs come first.
    pub fn for_index(kind: MixerKind, index: usize) -> Result<Self, StripBusError> {
        let count = kind.strip_count();
        if index >= count {
            return Err(StripBusError::IndexOutOfRange { what: StripOrBusKind::Strip, index, count });
        }
        Ok(Self::new(kind, index < kind.inputs().0))
    }

    pub fn indicator(&self) -> StatusIndicator {
        match (self.kind, self.is_physical) {
            (MixerKind::Potato, true) => potato_phys_strip(),
            (MixerKind::Potato, false) => potato_virt_strip(),
            (MixerKind::Banana | MixerKind::Basic, true) => two_row(potato_phys_strip()),
            (MixerKind::Banana | MixerKind::Basic, false) => two_row(potato_virt_strip()),
        }
    }

    /// Flags arranged to match [`StripStatus::indicator`].
    pub fn flags(&self) -> Vec<Vec<bool>> {
        let switches = match (self.kind, self.is_physical) {
            (MixerKind::Potato, true) => vec![self.mute, self.solo, self.mono, self.eq],
            (_, true) => vec![self.mute, self.solo, self.mono],
            (MixerKind::Basic, false) => vec![self.mute, self.solo],
            (_, false) => vec![self.mute, self.solo, self.mc],
        };
        match self.kind {
            MixerKind::Potato => vec![self.out_phys_bus.clone(), self.out_virt_bus.clone(), switches],
            MixerKind::Banana | MixerKind::Basic => {
                let buses = self.out_phys_bus.iter().chain(&self.out_virt_bus).copied().collect();
                vec![buses, switches]
            }
        }
    }

    pub fn render_indicator(&self) -> Result<Pixmap, RenderError> {
        self.indicator().render(&self.flags())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusStatus {
    pub kind: MixerKind,
    pub mute: bool,
    pub eq: bool,
    pub mono: bool,
}

impl BusStatus {
    pub fn new(kind: MixerKind) -> Self {
        Self { kind, mute: false, eq: false, mono: false }
    }

    pub fn for_index(kind: MixerKind, index: usize) -> Result<Self, StripBusError> {
        let count = kind.bus_count();
        if index >= count {
            return Err(StripBusError::IndexOutOfRange { what: StripOrBusKind::Bus, index, count });
        }
        Ok(Self::new(kind))
    }

    pub fn indicator(&self) -> StatusIndicator {
        bus_indicator()
    }

    pub fn flags(&self) -> Vec<Vec<bool>> {
        match self.kind {
            MixerKind::Basic => vec![vec![self.mute]],
            MixerKind::Banana | MixerKind::Potato => vec![vec![self.mute, self.eq, self.mono]],
        }
    }

    pub fn render_indicator(&self) -> Result<Pixmap, RenderError> {
        self.indicator().render(&self.flags())
    }
}

/// Either snapshot, as handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StripOrBus {
    Strip(StripStatus),
    Bus(BusStatus),
}

impl StripOrBus {
    /// Blank status for channel `index` of the given kind.
    pub fn for_index(kind: MixerKind, which: StripOrBusKind, index: usize) -> Result<Self, StripBusError> {
        match which {
            StripOrBusKind::Strip => StripStatus::for_index(kind, index).map(StripOrBus::Strip),
            StripOrBusKind::Bus => BusStatus::for_index(kind, index).map(StripOrBus::Bus),
        }
    }

    pub fn render_indicator(&self) -> Result<Pixmap, RenderError> {
        match self {
            StripOrBus::Strip(s) => s.render_indicator(),
            StripOrBus::Bus(b) => b.render_indicator(),
        }
    }
}

//
// Preset table
//

const INDICATOR_WIDTH: u32 = 36;
const INDICATOR_HEIGHT: u32 = 24;

fn circles(count: usize, margin_top: f32) -> RowStyle {
    RowStyle {
        colors_true: vec![palette::BUS; count],
        colors_false: vec![palette::INACTIVE; count],
        shape: Shape::Circle,
        item_margin: 2.0,
        item_size: 5.0,
        item_corner_radius: 0.0,
        margin_top,
        margin_left: 2.0,
        margin_right: 0.0,
        rtl: false,
    }
}

fn squares(colors: Vec<crate::graphics::Rgba>, margin_top: f32) -> RowStyle {
    RowStyle {
        colors_false: vec![palette::INACTIVE; colors.len()],
        colors_true: colors,
        shape: Shape::Square,
        item_margin: 2.0,
        item_size: 7.0,
        item_corner_radius: 1.5,
        margin_top,
        margin_left: 2.0,
        margin_right: 0.0,
        rtl: false,
    }
}

fn potato_phys_strip() -> StatusIndicator {
    StatusIndicator::with_config(StatusIndicatorConfig {
        width: INDICATOR_WIDTH,
        height: INDICATOR_HEIGHT,
        rows: vec![
            circles(5, 0.0),
            circles(3, 2.0),
            squares(vec![palette::MUTE, palette::SOLO, palette::MONO, palette::EQ], 3.0),
        ],
    })
}

fn potato_virt_strip() -> StatusIndicator {
    let mut s = potato_phys_strip();
    // mc shares the mute colour
    s.config.rows[2] = squares(vec![palette::MUTE, palette::SOLO, palette::MUTE], 3.0);
    s
}

/// Drop the virtual-bus row, keeping the switch row where it was.
fn two_row(mut s: StatusIndicator) -> StatusIndicator {
    let rows = std::mem::take(&mut s.config.rows);
    let mut buses = rows[0].clone();
    buses.margin_top += rows[1].item_size + rows[1].margin_top;
    s.config.rows = vec![buses, rows[2].clone()];
    s
}

fn bus_indicator() -> StatusIndicator {
    StatusIndicator::with_config(StatusIndicatorConfig {
        width: INDICATOR_WIDTH,
        height: INDICATOR_HEIGHT,
        rows: vec![squares(vec![palette::MUTE, palette::EQ, palette::MONO], 15.0)],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::canvas::pixel_at;
    use crate::graphics::Rgba;

    const KINDS: [MixerKind; 3] = [MixerKind::Basic, MixerKind::Banana, MixerKind::Potato];

    #[test]
    fn test_kind_parsing() {
        assert_eq!("potato".parse::<MixerKind>().unwrap(), MixerKind::Potato);
        assert!("tomato".parse::<MixerKind>().is_err());
        assert_eq!("".parse::<StripOrBusKind>().unwrap(), StripOrBusKind::Strip);
        assert_eq!("Bus".parse::<StripOrBusKind>().unwrap(), StripOrBusKind::Bus);
        assert_eq!(StripOrBusKind::Bus.default_title(3), "Bus 3");
    }

    #[test]
    fn test_for_index_splits_physical_and_virtual() {
        assert!(StripStatus::for_index(MixerKind::Banana, 2).unwrap().is_physical);
        assert!(!StripStatus::for_index(MixerKind::Banana, 3).unwrap().is_physical);
        assert_eq!(
            StripStatus::for_index(MixerKind::Basic, 3).unwrap_err(),
            StripBusError::IndexOutOfRange { what: StripOrBusKind::Strip, index: 3, count: 3 }
        );
        assert!(BusStatus::for_index(MixerKind::Potato, 8).is_err());
    }

    #[test]
    fn test_potato_flag_rows() {
        let mut s = StripStatus::new(MixerKind::Potato, true);
        s.out_phys_bus[1] = true;
        s.eq = true;
        let flags = s.flags();
        assert_eq!(flags.len(), 3);
        assert_eq!(flags[0], vec![false, true, false, false, false]);
        assert_eq!(flags[1].len(), 3);
        assert_eq!(flags[2], vec![false, false, false, true]);
    }

    #[test]
    fn test_banana_merges_buses() {
        let mut s = StripStatus::new(MixerKind::Banana, false);
        s.out_virt_bus[0] = true;
        s.mc = true;
        let flags = s.flags();
        assert_eq!(flags, vec![vec![false, false, false, true, false], vec![false, false, true]]);
    }

    #[test]
    fn test_two_row_keeps_switch_row_position() {
        let s = StripStatus::new(MixerKind::Banana, true).indicator();
        assert_eq!(s.config.rows.len(), 2);
        assert_eq!(s.config.rows[0].margin_top, 7.0);
        assert_eq!(s.config.rows[1].shape, Shape::Square);
    }

    #[test]
    fn test_every_preset_renders() {
        for kind in KINDS {
            for phys in [true, false] {
                let pm = StripStatus::new(kind, phys).render_indicator().unwrap();
                assert_eq!((pm.width(), pm.height()), (36, 24));
            }
            assert!(BusStatus::new(kind).render_indicator().is_ok());
        }
    }

    #[test]
    fn test_mute_square_position() {
        // switch row sits at y 15..22 in every strip and bus layout
        for kind in KINDS {
            let mut s = StripStatus::new(kind, true);
            s.mute = true;
            let pm = StripOrBus::Strip(s).render_indicator().unwrap();
            assert_eq!(pixel_at(&pm, 5, 18), Some(palette::MUTE), "{kind}");

            let mut b = BusStatus::new(kind);
            b.mute = true;
            let pm = StripOrBus::Bus(b).render_indicator().unwrap();
            assert_eq!(pixel_at(&pm, 5, 18), Some(palette::MUTE), "{kind}");
            assert_eq!(pixel_at(&pm, 5, 2), Some(Rgba::TRANSPARENT));
        }
    }
}
