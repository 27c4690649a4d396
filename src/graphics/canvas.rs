/*
 *  graphics/canvas.rs
 *
 *  stripdeck - mixer strips at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Thin drawing helpers over tiny-skia pixmaps
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

use tiny_skia::{FillRule, Mask, Path, PathBuilder, Pixmap, Rect, Transform};

use super::color::Rgba;
use super::error::RenderError;

// cubic control-point distance for a quarter circle
const KAPPA: f32 = 0.552_284_8;

/// Allocate a fully transparent RGBA surface.
pub fn new_surface(width: u32, height: u32) -> Result<Pixmap, RenderError> {
    Pixmap::new(width, height).ok_or_else(|| {
        RenderError::Surface(format!("cannot allocate {}x{} pixmap", width, height))
    })
}

/// Fill an integer-aligned rectangle without anti-aliasing, so every pixel
/// inside gets exactly `color`. Empty rectangles are ignored.
pub fn fill_cell(pixmap: &mut Pixmap, x: i32, y: i32, w: i32, h: i32, color: Rgba) {
    if w <= 0 || h <= 0 {
        return;
    }
    if let Some(rect) = Rect::from_xywh(x as f32, y as f32, w as f32, h as f32) {
        pixmap.fill_rect(rect, &color.paint(false), Transform::identity(), None);
    }
}

/// Build a rectangle path with circular corners. The radius is clamped to
/// half the shorter side; a zero radius gives a plain rectangle.
pub fn rounded_rect_path(x: f32, y: f32, w: f32, h: f32, r: f32) -> Option<Path> {
    if !(w > 0.0 && h > 0.0) {
        return None;
    }
    let r = r.max(0.0).min(w.min(h) / 2.0);
    if r == 0.0 {
        return Rect::from_xywh(x, y, w, h).map(PathBuilder::from_rect);
    }

    let k = r * KAPPA;
    let (right, bottom) = (x + w, y + h);
    let mut pb = PathBuilder::new();
    pb.move_to(x + r, y);
    pb.line_to(right - r, y);
    pb.cubic_to(right - r + k, y, right, y + r - k, right, y + r);
    pb.line_to(right, bottom - r);
    pb.cubic_to(right, bottom - r + k, right - r + k, bottom, right - r, bottom);
    pb.line_to(x + r, bottom);
    pb.cubic_to(x + r - k, bottom, x, bottom - r + k, x, bottom - r);
    pb.line_to(x, y + r);
    pb.cubic_to(x, y + r - k, x + r - k, y, x + r, y);
    pb.close();
    pb.finish()
}

pub fn circle_path(cx: f32, cy: f32, radius: f32) -> Option<Path> {
    PathBuilder::from_circle(cx, cy, radius)
}

/// Anti-aliased path fill, optionally clipped.
pub fn fill_path(pixmap: &mut Pixmap, path: &Path, color: Rgba, clip: Option<&Mask>) {
    pixmap.fill_path(path, &color.paint(true), FillRule::Winding, Transform::identity(), clip);
}

/// Clip mask covering `path`, sized to `pixmap`.
pub fn clip_mask(pixmap: &Pixmap, path: &Path) -> Option<Mask> {
    let mut mask = Mask::new(pixmap.width(), pixmap.height())?;
    mask.fill_path(path, FillRule::Winding, true, Transform::identity());
    Some(mask)
}

/// Quarter turn counter-clockwise: the source's left edge ends up at the
/// bottom, its top row becomes the left column.
pub fn rotate90_ccw(src: &Pixmap) -> Result<Pixmap, RenderError> {
    let (sw, sh) = (src.width() as usize, src.height() as usize);
    let mut dst = new_surface(src.height(), src.width())?;
    let dw = sh;
    let from = src.pixels();
    let to = dst.pixels_mut();
    for sy in 0..sh {
        for sx in 0..sw {
            let (dx, dy) = (sy, sw - 1 - sx);
            to[dy * dw + dx] = from[sy * sw + sx];
        }
    }
    Ok(dst)
}

/// De-multiplied colour at (x, y), or `None` outside the surface.
pub fn pixel_at(pixmap: &Pixmap, x: u32, y: u32) -> Option<Rgba> {
    pixmap.pixel(x, y).map(|p| Rgba::from(p.demultiply()))
}
