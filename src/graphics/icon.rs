//! Icon rendering: wrap a glyph outline in an SVG document and rasterise
//! SVG data into an RGBA surface.
//!
//! This module uses `usvg` for SVG parsing and `resvg` for rendering.

use log::debug;
use serde::{Deserialize, Serialize};
use tiny_skia::{Pixmap, Transform};

use super::canvas::new_surface;
use super::color::Rgba;
use super::error::RenderError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IconStyle {
    /// edge length of the glyph's own coordinate box
    pub glyph_size: u32,
    /// edge length of the square output image
    pub image_size: u32,
    pub offset_x: i32,
    pub offset_y: i32,
    pub icon_color: Rgba,
    pub border_color: Rgba,
    pub background: Rgba,
    /// outline drawn around the glyph; 0 disables it
    pub border_width: u32,
}

impl Default for IconStyle {
    fn default() -> Self {
        Self {
            glyph_size: 48,
            image_size: 48,
            offset_x: 0,
            offset_y: 0,
            icon_color: Rgba::WHITE,
            border_color: Rgba::new(0, 0, 0, 180),
            background: Rgba::TRANSPARENT,
            border_width: 1,
        }
    }
}

/// `fill="..." fill-opacity="..."` style attribute pair.
fn paint_attr(kind: &str, c: Rgba) -> String {
    format!(
        "{kind}=\"rgb({},{},{})\" {kind}-opacity=\"{:.3}\"",
        c.r,
        c.g,
        c.b,
        c.a as f32 / 255.0
    )
}

/// Escape text for use inside a double-quoted XML attribute.
fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Build an SVG document for a glyph outline given as SVG path data in a
/// `glyph_size` square box. The glyph is stroked with the border colour at
/// twice the border width, then filled over it so only the outer half of
/// the stroke shows.
pub fn compose_svg(path_data: &str, style: &IconStyle) -> String {
    let size = style.image_size;
    let scale = size as f32 / style.glyph_size.max(1) as f32;
    let escaped = xml_escape(path_data);
    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{size}\" height=\"{size}\" viewBox=\"0 0 {size} {size}\">"
    );
    svg.push_str(&format!(
        "<rect x=\"0\" y=\"0\" width=\"{size}\" height=\"{size}\" {}/>",
        paint_attr("fill", style.background)
    ));
    svg.push_str(&format!(
        "<g transform=\"translate({} {}) scale({scale})\">",
        style.offset_x, style.offset_y
    ));
    if style.border_width > 0 {
        svg.push_str(&format!(
            "<path d=\"{escaped}\" fill=\"none\" {} stroke-width=\"{}\" stroke-linejoin=\"round\"/>",
            paint_attr("stroke", style.border_color),
            style.border_width * 2
        ));
    }
    svg.push_str(&format!("<path d=\"{escaped}\" {}/>", paint_attr("fill", style.icon_color)));
    svg.push_str("</g></svg>");
    svg
}

/// Rasterise SVG data, scaled to fill `width` x `height`.
pub fn render_svg(svg_data: &str, width: u32, height: u32) -> Result<Pixmap, RenderError> {
    let options = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg_data, &options)
        .map_err(|e| RenderError::Svg(format!("failed to parse SVG: {:?}", e)))?;

    let mut pixmap = new_surface(width, height)?;
    let svg_size = tree.size();
    let transform = Transform::from_scale(
        width as f32 / svg_size.width(),
        height as f32 / svg_size.height(),
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    debug!("SVG rendered to {}x{} surface", width, height);
    Ok(pixmap)
}

/// Compose and rasterise in one step.
pub fn render_icon(path_data: &str, style: &IconStyle) -> Result<Pixmap, RenderError> {
    let svg = compose_svg(path_data, style);
    render_svg(&svg, style.image_size, style.image_size)
}
