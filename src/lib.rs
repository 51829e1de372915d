//! A pure in-memory raster image-processing core.
//!
//! This crate decodes nothing and encodes nothing: it consumes a decoded
//! [`PixelBuffer`] (built from whatever a codec handed back) and applies
//! resampling, filtering, geometric, color, and compositing operators
//! that each return a freshly owned buffer. Format codecs, SVG
//! optimization, vector tracing, and all outer-shell orchestration (CLI,
//! HTTP, file I/O, packaging) are explicitly out of scope — see
//! `SPEC_FULL.md` §1.
//!
//! The crate is synchronous and scheduler-agnostic (no I/O, no interior
//! locking, no cancellation points). Every operator is a pure function of
//! its input buffer(s) and a descriptor; none retain a reference to their
//! input. This makes operators safe to call from multiple threads in
//! parallel against disjoint, or even the same, input buffers.
//!
//! Module map:
//! - [`buffer`] — the `PixelBuffer` contract every operator shares.
//! - [`resample`] — nearest/bilinear/bicubic/Lanczos kernels and the
//!   fit-mode dispatcher.
//! - [`filters`] — Gaussian/box blur, sharpening, convolution, Sobel,
//!   emboss.
//! - [`geometry`] — rotation, flip/flop, crop, extend, trim.
//! - [`color`] — grayscale, threshold, HSL modulation, sepia, gamma, and
//!   friends.
//! - [`compositor`] — Porter-Duff / blend-mode compositing and gradient
//!   synthesis.
//! - [`pipeline`] — the ordered-operator facade.
//! - [`error`] — the failure taxonomy shared by every operator.

pub mod buffer;
pub mod color;
pub mod compositor;
pub mod error;
pub mod filters;
pub mod geometry;
pub mod pipeline;
pub mod resample;

pub use buffer::{BitDepth, Channels, Color, ColorSpace, CreateOptions, PixelBuffer};
pub use error::{ImageError, Result};
pub use pipeline::{Operation, Pipeline};
