//! Defines the pixel buffer: the sole data type exchanged between operators.
//!
//! The contract is intentionally small and immutable once built: width,
//! height, 8-bit RGBA storage in row-major order with top-left origin, a
//! color-space tag, an alpha-present flag and a bit-depth tag. Every
//! operator in this crate consumes buffers by reference and returns a
//! freshly owned one; nothing here ever aliases its input.

use crate::error::{ImageError, Result};
use log::debug;
use serde::{Deserialize, Serialize};

/// Which color space the channel values of a [`PixelBuffer`] are encoded in.
///
/// This names the model by which the numbers in the channels relate to a
/// physical quantity. Operators that are sensitive to this (gamma,
/// grayscale's BT.709 weights, the `sRGB<->linear` conversions) document
/// which space they expect; most color and geometric operators are
/// space-agnostic and simply carry the tag through untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ColorSpace {
    /// Non-linear, gamma-encoded sRGB. The default for decoded photographs.
    Srgb,
    /// Linear-light sRGB primaries, post `srgbToLinear`.
    LinearSrgb,
    /// Display-P3 primaries (gamma-encoded).
    DisplayP3,
}

impl Default for ColorSpace {
    fn default() -> Self {
        ColorSpace::Srgb
    }
}

/// The declared bit depth of a buffer's channels.
///
/// Only `Eight` is implemented by any operator in this crate; the tag
/// exists so that a request for `Sixteen` surfaces as
/// [`ImageError::Unsupported`] rather than silently truncating.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum BitDepth {
    Eight,
    Sixteen,
}

impl Default for BitDepth {
    fn default() -> Self {
        BitDepth::Eight
    }
}

/// A 4-channel 8-bit color, in the buffer's declared color space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    /// Convenience constructor for fully opaque colors, the common case for
    /// gradient stops and dominant-color results.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }

    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn as_tuple3(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    pub const fn as_tuple4(self) -> (u8, u8, u8, u8) {
        (self.r, self.g, self.b, self.a)
    }
}

impl From<(u8, u8, u8, u8)> for Color {
    fn from((r, g, b, a): (u8, u8, u8, u8)) -> Self {
        Color { r, g, b, a }
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Color::rgb(r, g, b)
    }
}

/// Options accepted by [`PixelBuffer::create`].
#[derive(Clone, Copy, Debug, Default)]
pub struct CreateOptions {
    pub color_space: Option<ColorSpace>,
    pub alpha: Option<bool>,
    pub bit_depth: Option<BitDepth>,
    pub fill: Option<Color>,
}

/// The number of channels a codec hands to or expects from
/// [`PixelBuffer::from_codec_data`] / [`PixelBuffer::to_codec_data`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Channels {
    Rgb = 3,
    Rgba = 4,
}

/// The in-memory raster image: the one type every operator in this crate
/// accepts and returns.
///
/// Invariants upheld by every public constructor and every operator:
/// - `data.len() == 4 * width * height`.
/// - every byte of `data` is a valid `u8` (trivially true) and, after any
///   operator runs, channels remain in `[0, 255]` — clamping is the
///   operator's responsibility, this type does not re-validate on read.
/// - when `alpha_present` is `false`, the alpha channel reads as `255` for
///   every pixel. We do not enforce this by storage compaction (the buffer
///   is always 4 bytes/pixel); instead constructors that accept `alpha:
///   false` force the alpha byte to 255 on write.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
    color_space: ColorSpace,
    alpha_present: bool,
    bit_depth: BitDepth,
}

impl PixelBuffer {
    /// Allocate a new buffer, zero-filled unless `options.fill` is given.
    ///
    /// Fails with [`ImageError::InvalidArgument`] if `width` or `height` is
    /// zero. There is no signed-dimension case in Rust's `u32`; callers
    /// converting from a signed descriptor are expected to have already
    /// rejected `<= 0` before reaching here (the pipeline facade does this
    /// at the boundary, see [`crate::pipeline`]).
    pub fn create(width: u32, height: u32, options: CreateOptions) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ImageError::invalid(format!(
                "buffer dimensions must be positive, got {}x{}",
                width, height
            )));
        }

        let bit_depth = options.bit_depth.unwrap_or_default();
        if !matches!(bit_depth, BitDepth::Eight) {
            return Err(ImageError::unsupported(
                "only 8-bit-per-channel buffers are implemented",
            ));
        }

        let color_space = options.color_space.unwrap_or_default();
        let alpha_present = options.alpha.unwrap_or(true);

        let len = checked_storage_len(width, height)?;
        let mut data = vec![0u8; len];

        match options.fill {
            Some(color) => {
                let (r, g, b, mut a) = color.as_tuple4();
                if !alpha_present {
                    a = 255;
                }
                for px in data.chunks_exact_mut(4) {
                    px[0] = r;
                    px[1] = g;
                    px[2] = b;
                    px[3] = a;
                }
            }
            None => {
                if !alpha_present {
                    for px in data.chunks_exact_mut(4) {
                        px[3] = 255;
                    }
                }
            }
        }

        debug!("created {}x{} pixel buffer ({} bytes)", width, height, len);

        Ok(PixelBuffer {
            width,
            height,
            data,
            color_space,
            alpha_present,
            bit_depth,
        })
    }

    /// Allocate an uninitialized-to-transparent buffer of the given size,
    /// `sRGB`, alpha-present, 8-bit. The common case used internally by
    /// operators that always produce a fresh destination.
    pub fn blank(width: u32, height: u32) -> Result<Self> {
        Self::create(width, height, CreateOptions::default())
    }

    /// Allocate a buffer filled with `color`, matching the tags of `like`.
    pub(crate) fn filled_like(like: &PixelBuffer, width: u32, height: u32, color: Color) -> Result<Self> {
        Self::create(
            width,
            height,
            CreateOptions {
                color_space: Some(like.color_space),
                alpha: Some(like.alpha_present),
                bit_depth: Some(like.bit_depth),
                fill: Some(color),
            },
        )
    }

    /// Deep-copy this buffer; all tags preserved. Every operator's output
    /// is one of these (or built the same way), so pointer identity never
    /// matches the input.
    pub fn clone_buffer(&self) -> Self {
        self.clone()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn color_space(&self) -> ColorSpace {
        self.color_space
    }

    pub fn alpha_present(&self) -> bool {
        self.alpha_present
    }

    pub fn bit_depth(&self) -> BitDepth {
        self.bit_depth
    }

    /// Raw row-major RGBA storage, 4 bytes per pixel.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Direct mutable access to raw storage for operator hot loops. Bypasses
    /// bounds checking; callers index directly and must preserve the
    /// `len == 4*w*h` invariant (they always do, since this never resizes
    /// the vector).
    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub(crate) fn with_color_space(mut self, color_space: ColorSpace) -> Self {
        self.color_space = color_space;
        self
    }

    fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    #[inline]
    pub(crate) fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Returns the RGBA tuple at `(x, y)`, or `(0,0,0,0)` when outside the
    /// buffer rectangle.
    pub fn get(&self, x: i64, y: i64) -> Color {
        if !self.in_bounds(x, y) {
            return Color::TRANSPARENT;
        }
        let i = self.index(x as u32, y as u32);
        Color::rgba(self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3])
    }

    /// Writes `color` at `(x, y)`, clamping channels that are already `u8`
    /// (a no-op clamp, kept for parity with the spec's wording) and
    /// silently doing nothing when `(x, y)` is outside the buffer.
    pub fn set(&mut self, x: i64, y: i64, color: Color) {
        if !self.in_bounds(x, y) {
            return;
        }
        let i = self.index(x as u32, y as u32);
        self.data[i] = color.r;
        self.data[i + 1] = color.g;
        self.data[i + 2] = color.b;
        self.data[i + 3] = if self.alpha_present { color.a } else { 255 };
    }

    /// Samples the 2x2 bilinear interpolation of the pixel quad enclosing
    /// the fractional buffer coordinate `(x, y)`. The bottom/right
    /// neighbor index clamps to `(w-1, h-1)`; this is the same edge-clamp
    /// policy every resampler and filter in this crate uses.
    pub fn sample_bilinear(&self, x: f64, y: f64) -> Color {
        let x0f = x.floor();
        let y0f = y.floor();
        let fx = (x - x0f) as f32;
        let fy = (y - y0f) as f32;

        let x0 = clamp_index(x0f as i64, self.width);
        let y0 = clamp_index(y0f as i64, self.height);
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);

        let p00 = self.get(x0 as i64, y0 as i64);
        let p10 = self.get(x1 as i64, y0 as i64);
        let p01 = self.get(x0 as i64, y1 as i64);
        let p11 = self.get(x1 as i64, y1 as i64);

        let lerp_channel = |c00: u8, c10: u8, c01: u8, c11: u8| -> u8 {
            let top = c00 as f32 + (c10 as f32 - c00 as f32) * fx;
            let bottom = c01 as f32 + (c11 as f32 - c01 as f32) * fx;
            clamp_u8(top + (bottom - top) * fy)
        };

        Color::rgba(
            lerp_channel(p00.r, p10.r, p01.r, p11.r),
            lerp_channel(p00.g, p10.g, p01.g, p11.g),
            lerp_channel(p00.b, p10.b, p01.b, p11.b),
            lerp_channel(p00.a, p10.a, p01.a, p11.a),
        )
    }

    /// Builds a buffer from codec output. `channels = Rgb` expands every
    /// triple to RGBA with alpha 255; `channels = Rgba` copies as-is.
    pub fn from_codec_data(bytes: &[u8], width: u32, height: u32, channels: Channels) -> Result<Self> {
        let pixels = width as usize * height as usize;
        let expected = pixels * channels as usize;
        if bytes.len() != expected {
            return Err(ImageError::invalid(format!(
                "codec byte length {} does not match {}x{}x{}",
                bytes.len(),
                width,
                height,
                channels as usize
            )));
        }

        let mut buf = PixelBuffer::create(width, height, CreateOptions::default())?;
        match channels {
            Channels::Rgba => buf.data.copy_from_slice(bytes),
            Channels::Rgb => {
                for (dst, src) in buf.data.chunks_exact_mut(4).zip(bytes.chunks_exact(3)) {
                    dst[0] = src[0];
                    dst[1] = src[1];
                    dst[2] = src[2];
                    dst[3] = 255;
                }
            }
        }
        Ok(buf)
    }

    /// Exports this buffer for a codec. `channels = Rgb` drops alpha;
    /// `channels = Rgba` returns the raw storage.
    pub fn to_codec_data(&self, channels: Channels) -> Vec<u8> {
        match channels {
            Channels::Rgba => self.data.clone(),
            Channels::Rgb => {
                let mut out = Vec::with_capacity(self.width as usize * self.height as usize * 3);
                for px in self.data.chunks_exact(4) {
                    out.extend_from_slice(&px[0..3]);
                }
                out
            }
        }
    }

    /// Bridges to the `image` crate's buffer type, the common hand-off
    /// point to format codecs that this crate does not implement itself.
    pub fn from_image(img: &image::RgbaImage) -> Self {
        PixelBuffer {
            width: img.width(),
            height: img.height(),
            data: img.as_raw().clone(),
            color_space: ColorSpace::Srgb,
            alpha_present: true,
            bit_depth: BitDepth::Eight,
        }
    }

    pub fn into_image(&self) -> image::RgbaImage {
        image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .expect("pixel buffer invariant: data.len() == 4*w*h")
    }
}

#[inline]
fn clamp_index(i: i64, extent: u32) -> u32 {
    i.clamp(0, extent as i64 - 1) as u32
}

/// Round-half-to-even, matching the spec's deterministic-rounding note
/// (§9): `f32::round` rounds half away from zero, which is not what we
/// want for run-to-run-stable, architecture-independent output.
#[inline]
pub(crate) fn round_half_even(x: f32) -> f32 {
    let floor = x.floor();
    let diff = x - floor;
    if diff < 0.5 {
        floor
    } else if diff > 0.5 {
        floor + 1.0
    } else if (floor as i64) % 2 == 0 {
        floor
    } else {
        floor + 1.0
    }
}

#[inline]
pub(crate) fn clamp_u8(x: f32) -> u8 {
    round_half_even(x).clamp(0.0, 255.0) as u8
}

fn checked_storage_len(width: u32, height: u32) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|px| px.checked_mul(4))
        .ok_or_else(|| ImageError::ResourceExhausted("buffer dimensions overflow usize".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_zero_dimension_fails() {
        assert!(PixelBuffer::create(0, 4, CreateOptions::default()).is_err());
        assert!(PixelBuffer::create(4, 0, CreateOptions::default()).is_err());
    }

    #[test]
    fn create_fill_defaults_alpha() {
        let buf = PixelBuffer::create(
            2,
            2,
            CreateOptions {
                fill: Some(Color::rgb(10, 20, 30)),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(buf.get(0, 0), Color::rgba(10, 20, 30, 255));
        assert_eq!(buf.data().len(), 16);
    }

    #[test]
    fn get_out_of_bounds_is_transparent() {
        let buf = PixelBuffer::blank(2, 2).unwrap();
        assert_eq!(buf.get(-1, 0), Color::TRANSPARENT);
        assert_eq!(buf.get(2, 0), Color::TRANSPARENT);
    }

    #[test]
    fn set_out_of_bounds_is_noop() {
        let mut buf = PixelBuffer::blank(2, 2).unwrap();
        buf.set(5, 5, Color::WHITE);
        assert_eq!(buf.data(), &[0u8; 16]);
    }

    #[test]
    fn no_alpha_forces_opaque() {
        let buf = PixelBuffer::create(
            1,
            1,
            CreateOptions {
                alpha: Some(false),
                fill: Some(Color::rgba(1, 2, 3, 0)),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(buf.get(0, 0).a, 255);
    }

    #[test]
    fn codec_roundtrip_rgb() {
        let bytes = [255u8, 0, 0, 0, 255, 0];
        let buf = PixelBuffer::from_codec_data(&bytes, 2, 1, Channels::Rgb).unwrap();
        assert_eq!(buf.get(0, 0), Color::rgba(255, 0, 0, 255));
        assert_eq!(buf.to_codec_data(Channels::Rgb), bytes);
    }

    #[test]
    fn clone_is_independently_owned() {
        let buf = PixelBuffer::blank(4, 4).unwrap();
        let mut cloned = buf.clone_buffer();
        cloned.set(0, 0, Color::WHITE);
        assert_ne!(buf.get(0, 0), cloned.get(0, 0));
    }
}
