//! The pipeline facade (§4.7): an ordered sequence of tagged operator
//! invocations applied to an input buffer, each observing only the
//! previous invocation's output.
//!
//! This generalizes the teacher crate's `CommandBuffer` (`command.rs`): a
//! linear sequence of typed operations pushed by builder methods. The
//! teacher's version is an SSA register machine because its operations
//! can fan out and recombine registers (`inscribe`, `inject`) across a
//! GPU/CPU split this crate does not have. Per §4.7 the pipeline here
//! only ever has one live value — "the previous invocation's output" — so
//! we keep the tagged-enum-of-operations shape and drop the register
//! indirection: a plain `Vec<Operation>` replayed in order is the whole
//! machine. No implicit reordering, fusion, or parallelization (§4.7).

use crate::buffer::{Color, ColorSpace, PixelBuffer};
use crate::color::{self, ModulateOptions};
use crate::compositor::{self, CompositeDescriptor};
use crate::error::Result;
use crate::filters::{self, Kernel};
use crate::geometry::{self, Rotation90};
use crate::resample::{self, ResizeDescriptor};

/// One tagged operator invocation and its option record, matching §9's
/// Design Notes enumeration.
pub enum Operation {
    Resize(ResizeDescriptor),
    RotateOrthogonal(Rotation90),
    Rotate { degrees: f64, background: Option<Color>, expand: bool },
    Flip,
    Flop,
    Crop { left: i64, top: i64, width: u32, height: u32 },
    Extend { top: u32, bottom: u32, left: u32, right: u32, background: Color },
    Trim { threshold: u32, background: Option<Color> },
    GaussianBlur { sigma: f64 },
    BoxBlur { radius: i64 },
    UnsharpMask { sigma: f64, amount: f32, threshold: f32 },
    SharpenDirect { strength: f32 },
    Convolve(Kernel),
    Sobel,
    Emboss { strength: f32 },
    Grayscale,
    Threshold { level: u16, grayscale: bool },
    Modulate(ModulateOptions),
    Invert,
    Sepia { amount: f32 },
    Contrast { factor: f32 },
    Gamma { gamma: f32 },
    Normalize,
    Tint { color: Color, amount: f32 },
    ToColorSpace(ColorSpace),
    Composite { overlay: PixelBuffer, desc: CompositeDescriptor },
}

/// An ordered list of operator invocations, pure and I/O-free: it accepts
/// a decoded buffer and returns a new buffer (§4.7).
#[derive(Default)]
pub struct Pipeline {
    ops: Vec<Operation>,
}

impl Pipeline {
    pub fn new() -> Self {
        Pipeline::default()
    }

    pub fn push(mut self, op: Operation) -> Self {
        self.ops.push(op);
        self
    }

    pub fn resize(self, desc: ResizeDescriptor) -> Self {
        self.push(Operation::Resize(desc))
    }

    pub fn rotate_orthogonal(self, amount: Rotation90) -> Self {
        self.push(Operation::RotateOrthogonal(amount))
    }

    pub fn rotate(self, degrees: f64, background: Option<Color>, expand: bool) -> Self {
        self.push(Operation::Rotate { degrees, background, expand })
    }

    pub fn flip(self) -> Self {
        self.push(Operation::Flip)
    }

    pub fn flop(self) -> Self {
        self.push(Operation::Flop)
    }

    pub fn crop(self, left: i64, top: i64, width: u32, height: u32) -> Self {
        self.push(Operation::Crop { left, top, width, height })
    }

    pub fn extend(self, top: u32, bottom: u32, left: u32, right: u32, background: Color) -> Self {
        self.push(Operation::Extend { top, bottom, left, right, background })
    }

    pub fn trim(self, threshold: u32, background: Option<Color>) -> Self {
        self.push(Operation::Trim { threshold, background })
    }

    pub fn gaussian_blur(self, sigma: f64) -> Self {
        self.push(Operation::GaussianBlur { sigma })
    }

    pub fn box_blur(self, radius: i64) -> Self {
        self.push(Operation::BoxBlur { radius })
    }

    pub fn unsharp_mask(self, sigma: f64, amount: f32, threshold: f32) -> Self {
        self.push(Operation::UnsharpMask { sigma, amount, threshold })
    }

    pub fn sharpen_direct(self, strength: f32) -> Self {
        self.push(Operation::SharpenDirect { strength })
    }

    pub fn convolve(self, kernel: Kernel) -> Self {
        self.push(Operation::Convolve(kernel))
    }

    pub fn sobel(self) -> Self {
        self.push(Operation::Sobel)
    }

    pub fn emboss(self, strength: f32) -> Self {
        self.push(Operation::Emboss { strength })
    }

    pub fn grayscale(self) -> Self {
        self.push(Operation::Grayscale)
    }

    pub fn threshold(self, level: u16, grayscale: bool) -> Self {
        self.push(Operation::Threshold { level, grayscale })
    }

    pub fn modulate(self, opts: ModulateOptions) -> Self {
        self.push(Operation::Modulate(opts))
    }

    pub fn invert(self) -> Self {
        self.push(Operation::Invert)
    }

    pub fn sepia(self, amount: f32) -> Self {
        self.push(Operation::Sepia { amount })
    }

    pub fn contrast(self, factor: f32) -> Self {
        self.push(Operation::Contrast { factor })
    }

    pub fn gamma(self, gamma: f32) -> Self {
        self.push(Operation::Gamma { gamma })
    }

    pub fn normalize(self) -> Self {
        self.push(Operation::Normalize)
    }

    pub fn tint(self, color: Color, amount: f32) -> Self {
        self.push(Operation::Tint { color, amount })
    }

    pub fn to_color_space(self, target: ColorSpace) -> Self {
        self.push(Operation::ToColorSpace(target))
    }

    pub fn composite(self, overlay: PixelBuffer, desc: CompositeDescriptor) -> Self {
        self.push(Operation::Composite { overlay, desc })
    }

    /// Apply every operation strictly in order to `input`, returning a new
    /// buffer. Fails atomically: no partial buffer is ever observable
    /// (§4.8) — the first operator to error stops the fold.
    pub fn execute(&self, input: &PixelBuffer) -> Result<PixelBuffer> {
        let mut current = input.clone_buffer();
        for op in &self.ops {
            current = apply(&current, op)?;
        }
        Ok(current)
    }
}

fn apply(buf: &PixelBuffer, op: &Operation) -> Result<PixelBuffer> {
    match op {
        Operation::Resize(desc) => resample::resize(buf, desc),
        Operation::RotateOrthogonal(amount) => geometry::rotate_orthogonal(buf, *amount),
        Operation::Rotate { degrees, background, expand } => {
            geometry::rotate(buf, *degrees, *background, *expand)
        }
        Operation::Flip => geometry::flip(buf),
        Operation::Flop => geometry::flop(buf),
        Operation::Crop { left, top, width, height } => geometry::crop(buf, *left, *top, *width, *height),
        Operation::Extend { top, bottom, left, right, background } => {
            geometry::extend(buf, *top, *bottom, *left, *right, *background)
        }
        Operation::Trim { threshold, background } => geometry::trim(buf, *threshold, *background),
        Operation::GaussianBlur { sigma } => filters::gaussian_blur(buf, *sigma),
        Operation::BoxBlur { radius } => filters::box_blur(buf, *radius),
        Operation::UnsharpMask { sigma, amount, threshold } => {
            filters::unsharp_mask(buf, *sigma, *amount, *threshold)
        }
        Operation::SharpenDirect { strength } => filters::sharpen_direct(buf, *strength),
        Operation::Convolve(kernel) => filters::convolve(buf, kernel),
        Operation::Sobel => filters::sobel(buf),
        Operation::Emboss { strength } => filters::emboss(buf, *strength),
        Operation::Grayscale => color::grayscale(buf),
        Operation::Threshold { level, grayscale } => color::threshold(buf, *level, *grayscale),
        Operation::Modulate(opts) => color::modulate(buf, *opts),
        Operation::Invert => color::invert(buf),
        Operation::Sepia { amount } => color::sepia(buf, *amount),
        Operation::Contrast { factor } => color::contrast(buf, *factor),
        Operation::Gamma { gamma } => color::gamma(buf, *gamma),
        Operation::Normalize => color::normalize(buf),
        Operation::Tint { color: c, amount } => color::tint(buf, *c, *amount),
        Operation::ToColorSpace(target) => color::to_color_space(buf, *target),
        Operation::Composite { overlay, desc } => compositor::composite(buf, overlay, desc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resample::{FitMode, ResampleKernel};

    #[test]
    fn empty_pipeline_is_identity() {
        let src = PixelBuffer::blank(3, 3).unwrap();
        let out = Pipeline::new().execute(&src).unwrap();
        assert_eq!(out.data(), src.data());
    }

    #[test]
    fn operations_apply_strictly_in_order() {
        let src = PixelBuffer::blank(4, 4).unwrap();
        let pipeline = Pipeline::new()
            .resize(ResizeDescriptor {
                width: Some(2),
                height: Some(2),
                kernel: ResampleKernel::Nearest,
                fit: FitMode::Fill,
                background: None,
                anchor: None,
            })
            .grayscale()
            .invert();
        let out = pipeline.execute(&src).unwrap();
        assert_eq!((out.width(), out.height()), (2, 2));
    }

    #[test]
    fn each_operator_returns_freshly_owned_buffer() {
        let src = PixelBuffer::blank(2, 2).unwrap();
        let out = Pipeline::new().invert().execute(&src).unwrap();
        assert_ne!(out.data().as_ptr(), src.data().as_ptr());
    }
}
