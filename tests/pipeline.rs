//! Integration coverage for the pipeline facade (§8): strictly sequential
//! application, error propagation, and a realistic multi-operator chain.

use raster_core::buffer::{Color, PixelBuffer};
use raster_core::color::ModulateOptions;
use raster_core::compositor::{BlendMode, CompositeDescriptor};
use raster_core::geometry::Rotation90;
use raster_core::resample::{FitMode, ResampleKernel, ResizeDescriptor};
use raster_core::{Operation, Pipeline};

#[test]
fn a_realistic_chain_resizes_rotates_and_recolors() {
    let src = PixelBuffer::blank(40, 20).unwrap();
    let pipeline = Pipeline::new()
        .resize(ResizeDescriptor {
            width: Some(20),
            height: Some(10),
            kernel: ResampleKernel::Bilinear,
            fit: FitMode::Fill,
            background: None,
            anchor: None,
        })
        .rotate_orthogonal(Rotation90::Rotate90)
        .grayscale()
        .contrast(1.2);

    let out = pipeline.execute(&src).unwrap();
    assert_eq!((out.width(), out.height()), (10, 20));
}

#[test]
fn an_error_in_the_middle_stops_the_whole_pipeline() {
    let src = PixelBuffer::blank(4, 4).unwrap();
    // width=0 is rejected by the resize resampler, so the pipeline must
    // fail rather than silently skip the bad step.
    let pipeline = Pipeline::new().resize(ResizeDescriptor {
        width: Some(0),
        height: Some(4),
        kernel: ResampleKernel::Nearest,
        fit: FitMode::Fill,
        background: None,
        anchor: None,
    });
    assert!(pipeline.execute(&src).is_err());
}

#[test]
fn composite_operation_accepts_an_owned_overlay_buffer() {
    let base = PixelBuffer::blank(2, 2).unwrap();
    let overlay = PixelBuffer::blank(2, 2).unwrap();
    let pipeline = Pipeline::new().composite(
        overlay,
        CompositeDescriptor { blend: BlendMode::Multiply, ..Default::default() },
    );
    let out = pipeline.execute(&base).unwrap();
    assert_eq!((out.width(), out.height()), (2, 2));
}

#[test]
fn modulate_operation_round_trips_through_the_pipeline() {
    let mut src = PixelBuffer::blank(1, 1).unwrap();
    src.set(0, 0, Color::rgba(200, 30, 30, 255));
    let pipeline = Pipeline::new().modulate(ModulateOptions::default());
    let out = pipeline.execute(&src).unwrap();
    assert_eq!(out.data(), src.data());
}

#[test]
fn pipeline_push_and_builder_methods_produce_equivalent_results() {
    let src = PixelBuffer::blank(3, 3).unwrap();
    let via_builder = Pipeline::new().invert().grayscale();
    let via_push = Pipeline::new().push(Operation::Invert).push(Operation::Grayscale);
    assert_eq!(
        via_builder.execute(&src).unwrap().data(),
        via_push.execute(&src).unwrap().data()
    );
}
