/*
 *  graphics/error.rs
 *
 *  stripdeck - mixer strips at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Unified error type for the renderers
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
use thiserror::Error;

/// Which colour list of a status row ran out of entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorList {
    True,
    False,
}

impl fmt::Display for ColorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorList::True => write!(f, "active"),
            ColorList::False => write!(f, "inactive"),
        }
    }
}

/// Derived meter geometry that collapsed to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryFault {
    CellHeight,
    CellCount,
}

impl fmt::Display for GeometryFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryFault::CellHeight => write!(f, "cellHeight is 0"),
            GeometryFault::CellCount => write!(f, "cellCount is 0"),
        }
    }
}

/// Every failure a render call can report. None of them are fatal; the
/// caller logs and skips the frame.
#[derive(Debug, Error, PartialEq)]
pub enum RenderError {
    /// Static configuration is out of range
    #[error("invalid configuration: {field} {reason}")]
    Configuration { field: &'static str, reason: String },

    /// Cell geometry derived from a valid configuration is empty
    #[error("geometry error: {0}")]
    Geometry(GeometryFault),

    /// A status row has more flags than colours
    #[error("not enough {list} colours for row {row}: need {needed}, have {available}")]
    StyleMismatch {
        row: usize,
        list: ColorList,
        needed: usize,
        available: usize,
    },

    /// More status rows than configured styles
    #[error("not enough styles for rows: need {needed}, have {available}")]
    MissingRowStyle { needed: usize, available: usize },

    /// Fewer level readings than meter channels
    #[error("level count {actual} is less than channel count {expected}")]
    LevelCount { expected: usize, actual: usize },

    /// The backing pixmap could not be allocated
    #[error("surface error: {0}")]
    Surface(String),

    /// SVG input could not be parsed
    #[error("SVG error: {0}")]
    Svg(String),

    /// PNG encoding failed
    #[error("encode error: {0}")]
    Encode(String),
}

impl RenderError {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        RenderError::Configuration { field, reason: reason.into() }
    }

    /// `true` for the static-configuration family, which will fail again
    /// on every frame until the config changes.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            RenderError::Configuration { .. }
                | RenderError::Geometry(_)
                | RenderError::StyleMismatch { .. }
                | RenderError::MissingRowStyle { .. }
        )
    }
}
