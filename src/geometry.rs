//! Geometric transforms: orthogonal rotation, arbitrary-angle rotation,
//! flip/flop, crop/extract, extend (pad), and trim (§4.4).

use crate::buffer::{Color, CreateOptions, PixelBuffer};
use crate::error::{ImageError, Result};

/// Orthogonal rotation amounts. `Rotate0` is included so a caller can
/// route a normalized-to-multiple-of-90 angle through one dispatcher and
/// still hit the "clone, no-op" fast path the spec documents for 0deg.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rotation90 {
    Rotate0,
    Rotate90,
    Rotate180,
    Rotate270,
}

/// Exact transpose-plus-mirror in integer coordinates; output dimensions
/// are `(h, w)` for +-90 degrees, `(w, h)` for 180 degrees and the 0deg
/// identity.
pub fn rotate_orthogonal(src: &PixelBuffer, amount: Rotation90) -> Result<PixelBuffer> {
    match amount {
        Rotation90::Rotate0 => Ok(src.clone_buffer()),
        Rotation90::Rotate180 => {
            let mut out = src.clone_buffer();
            let (w, h) = (src.width() as i64, src.height() as i64);
            for y in 0..h {
                for x in 0..w {
                    out.set(x, y, src.get(w - 1 - x, h - 1 - y));
                }
            }
            Ok(out)
        }
        Rotation90::Rotate90 => {
            let (w, h) = (src.width(), src.height());
            let mut out = out_like(src, h, w)?;
            for y in 0..h as i64 {
                for x in 0..w as i64 {
                    // destination (col, row) = (h-1-y, x)
                    out.set(h as i64 - 1 - y, x, src.get(x, y));
                }
            }
            Ok(out)
        }
        Rotation90::Rotate270 => {
            let (w, h) = (src.width(), src.height());
            let mut out = out_like(src, h, w)?;
            for y in 0..h as i64 {
                for x in 0..w as i64 {
                    out.set(y, w as i64 - 1 - x, src.get(x, y));
                }
            }
            Ok(out)
        }
    }
}

fn out_like(src: &PixelBuffer, w: u32, h: u32) -> Result<PixelBuffer> {
    PixelBuffer::create(
        w,
        h,
        CreateOptions {
            color_space: Some(src.color_space()),
            alpha: Some(src.alpha_present()),
            ..Default::default()
        },
    )
}

/// Arbitrary-angle rotation (§4.4). `degrees` is normalized to `[0,360)`
/// and fast-pathed at exact multiples of 90. Otherwise the destination is
/// filled with `background` and every destination pixel is inverse-mapped
/// to source space and bilinear-sampled.
pub fn rotate(src: &PixelBuffer, degrees: f64, background: Option<Color>, expand: bool) -> Result<PixelBuffer> {
    let normalized = degrees.rem_euclid(360.0);

    if normalized == 0.0 {
        return Ok(src.clone_buffer());
    }
    if normalized == 90.0 {
        return rotate_orthogonal(src, Rotation90::Rotate90);
    }
    if normalized == 180.0 {
        return rotate_orthogonal(src, Rotation90::Rotate180);
    }
    if normalized == 270.0 {
        return rotate_orthogonal(src, Rotation90::Rotate270);
    }

    let radians = normalized.to_radians();
    let (cos, sin) = (radians.cos(), radians.sin());
    let (w, h) = (src.width() as f64, src.height() as f64);

    let (new_w, new_h) = if expand {
        (
            (w * cos.abs() + h * sin.abs()).ceil() as u32,
            (w * sin.abs() + h * cos.abs()).ceil() as u32,
        )
    } else {
        (src.width(), src.height())
    };

    let bg = background.unwrap_or(Color::TRANSPARENT);
    let mut out = PixelBuffer::filled_like(src, new_w.max(1), new_h.max(1), bg)?;

    let src_cx = w / 2.0;
    let src_cy = h / 2.0;
    let dst_cx = new_w as f64 / 2.0;
    let dst_cy = new_h as f64 / 2.0;

    for dy in 0..new_h as i64 {
        for dx in 0..new_w as i64 {
            let rel_x = dx as f64 - dst_cx;
            let rel_y = dy as f64 - dst_cy;
            let sx = rel_x * cos + rel_y * sin + src_cx;
            let sy = -rel_x * sin + rel_y * cos + src_cy;

            if sx >= 0.0 && sy >= 0.0 && sx < w && sy < h {
                out.set(dx, dy, src.sample_bilinear(sx, sy));
            }
        }
    }

    Ok(out)
}

/// Vertical mirror: copy rows in reverse order.
pub fn flip(src: &PixelBuffer) -> Result<PixelBuffer> {
    let mut out = src.clone_buffer();
    let h = src.height() as i64;
    for y in 0..h {
        for x in 0..src.width() as i64 {
            out.set(x, y, src.get(x, h - 1 - y));
        }
    }
    Ok(out)
}

/// Horizontal mirror: copy columns in reverse order.
pub fn flop(src: &PixelBuffer) -> Result<PixelBuffer> {
    let mut out = src.clone_buffer();
    let w = src.width() as i64;
    for y in 0..src.height() as i64 {
        for x in 0..w {
            out.set(x, y, src.get(w - 1 - x, y));
        }
    }
    Ok(out)
}

/// Crop/extract a rectangle (§4.4). `left`/`top` clamp into the source
/// extent; `width`/`height` clamp to what remains.
pub fn crop(src: &PixelBuffer, left: i64, top: i64, width: u32, height: u32) -> Result<PixelBuffer> {
    let left = left.clamp(0, src.width() as i64);
    let top = top.clamp(0, src.height() as i64);
    let max_w = (src.width() as i64 - left).max(0) as u32;
    let max_h = (src.height() as i64 - top).max(0) as u32;
    let width = width.min(max_w).max(1);
    let height = height.min(max_h).max(1);

    let mut out = out_like(src, width, height)?;
    for y in 0..height as i64 {
        for x in 0..width as i64 {
            out.set(x, y, src.get(left + x, top + y));
        }
    }
    Ok(out)
}

/// Pad the source into a larger canvas filled with `background`, pasting
/// the source at `(left, top)` (§4.4).
pub fn extend(
    src: &PixelBuffer,
    top: u32,
    bottom: u32,
    left: u32,
    right: u32,
    background: Color,
) -> Result<PixelBuffer> {
    let new_w = src
        .width()
        .checked_add(left)
        .and_then(|w| w.checked_add(right))
        .ok_or_else(|| ImageError::out_of_bounds("extend width overflow"))?;
    let new_h = src
        .height()
        .checked_add(top)
        .and_then(|h| h.checked_add(bottom))
        .ok_or_else(|| ImageError::out_of_bounds("extend height overflow"))?;

    let mut out = PixelBuffer::filled_like(src, new_w, new_h, background)?;
    for y in 0..src.height() as i64 {
        for x in 0..src.width() as i64 {
            out.set(left as i64 + x, top as i64 + y, src.get(x, y));
        }
    }
    Ok(out)
}

/// Compute the tight bounding box against `background` with per-channel
/// absolute-difference threshold, then crop to it (§4.4). If `background`
/// is not given, adopts pixel `(0,0)`. If no pixel exceeds the threshold,
/// returns a 1x1 buffer.
pub fn trim(src: &PixelBuffer, threshold: u32, background: Option<Color>) -> Result<PixelBuffer> {
    let bg = background.unwrap_or_else(|| src.get(0, 0));
    let (w, h) = (src.width() as i64, src.height() as i64);

    let mut min_x = w;
    let mut min_y = h;
    let mut max_x = -1i64;
    let mut max_y = -1i64;

    for y in 0..h {
        for x in 0..w {
            let p = src.get(x, y);
            let diff = (p.r as i32 - bg.r as i32).unsigned_abs()
                + (p.g as i32 - bg.g as i32).unsigned_abs()
                + (p.b as i32 - bg.b as i32).unsigned_abs()
                + (p.a as i32 - bg.a as i32).unsigned_abs();
            if diff > threshold {
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);
            }
        }
    }

    if max_x < min_x || max_y < min_y {
        return PixelBuffer::create(
            1,
            1,
            CreateOptions {
                color_space: Some(src.color_space()),
                alpha: Some(src.alpha_present()),
                ..Default::default()
            },
        );
    }

    crop(src, min_x, min_y, (max_x - min_x + 1) as u32, (max_y - min_y + 1) as u32)
}
