/*
 *  feedback.rs
 *
 *  stripdeck - mixer strips at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Encode rendered surfaces for the host's feedback channel
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

//! The host accepts images as data URIs inside a JSON feedback object.
//! Raster surfaces go out as base64 PNG; SVG icons can be sent as-is.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use tiny_skia::Pixmap;

use crate::graphics::RenderError;

pub const PNG_URI_PREFIX: &str = "data:image/png;base64,";
pub const SVG_URI_PREFIX: &str = "data:image/svg+xml;charset=utf8,";

pub fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>, RenderError> {
    pixmap.encode_png().map_err(|e| RenderError::Encode(e.to_string()))
}

pub fn png_data_uri(pixmap: &Pixmap) -> Result<String, RenderError> {
    let png = encode_png(pixmap)?;
    Ok(format!("{}{}", PNG_URI_PREFIX, STANDARD.encode(png)))
}

pub fn svg_data_uri(svg: &str) -> String {
    format!("{}{}", SVG_URI_PREFIX, svg)
}

/// One key/dial update. Absent fields leave the host's current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_meter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gain_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gain_slider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl FeedbackPayload {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
