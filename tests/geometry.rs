//! Integration coverage for rotation, flip/flop, crop, extend and trim
//! (§8), focused on the idempotence laws and boundary cases.

use raster_core::buffer::{Color, PixelBuffer};
use raster_core::geometry::{crop, extend, flip, flop, rotate, rotate_orthogonal, trim, Rotation90};

#[test]
fn rotate_180_is_point_reflection() {
    let mut src = PixelBuffer::blank(3, 2).unwrap();
    src.set(0, 0, Color::rgba(1, 0, 0, 255));
    src.set(2, 1, Color::rgba(2, 0, 0, 255));
    let out = rotate_orthogonal(&src, Rotation90::Rotate180).unwrap();
    assert_eq!(out.get(2, 1), Color::rgba(1, 0, 0, 255));
    assert_eq!(out.get(0, 0), Color::rgba(2, 0, 0, 255));
}

#[test]
fn rotate270_is_inverse_of_rotate90() {
    let mut src = PixelBuffer::blank(4, 3).unwrap();
    src.set(1, 2, Color::rgba(9, 9, 9, 255));
    let forward = rotate_orthogonal(&src, Rotation90::Rotate90).unwrap();
    let back = rotate_orthogonal(&forward, Rotation90::Rotate270).unwrap();
    assert_eq!(back.data(), src.data());
}

#[test]
fn arbitrary_rotate_90_matches_orthogonal() {
    let mut src = PixelBuffer::blank(3, 2).unwrap();
    src.set(0, 0, Color::rgba(5, 6, 7, 255));
    let via_degrees = rotate(&src, 90.0, None, false).unwrap();
    let via_orthogonal = rotate_orthogonal(&src, Rotation90::Rotate90).unwrap();
    assert_eq!(via_degrees.data(), via_orthogonal.data());
}

#[test]
fn rotate_45_with_expand_grows_the_canvas() {
    let src = PixelBuffer::blank(10, 10).unwrap();
    let out = rotate(&src, 45.0, Some(Color::BLACK), true).unwrap();
    assert!(out.width() > src.width());
    assert!(out.height() > src.height());
}

#[test]
fn flip_then_flop_reorders_both_axes() {
    let mut src = PixelBuffer::blank(2, 2).unwrap();
    src.set(0, 0, Color::rgba(1, 1, 1, 255));
    let out = flop(&flip(&src).unwrap()).unwrap();
    assert_eq!(out.get(1, 1), Color::rgba(1, 1, 1, 255));
}

#[test]
fn crop_clamps_an_out_of_range_rectangle() {
    let src = PixelBuffer::blank(4, 4).unwrap();
    let out = crop(&src, 2, 2, 100, 100).unwrap();
    assert_eq!((out.width(), out.height()), (2, 2));
}

#[test]
fn crop_offset_beyond_extent_yields_minimum_size() {
    let src = PixelBuffer::blank(4, 4).unwrap();
    let out = crop(&src, 10, 10, 5, 5).unwrap();
    assert_eq!((out.width(), out.height()), (1, 1));
}

#[test]
fn extend_overflow_is_an_error() {
    let src = PixelBuffer::blank(4, 4).unwrap();
    let err = extend(&src, 0, 0, u32::MAX, 0, Color::BLACK);
    assert!(err.is_err());
}

#[test]
fn trim_crops_to_a_non_background_region() {
    let mut src = PixelBuffer::blank(6, 6).unwrap();
    for y in 1..=2i64 {
        for x in 1..=3i64 {
            src.set(x, y, Color::rgba(9, 9, 9, 255));
        }
    }
    let out = trim(&src, 10, Some(Color::BLACK)).unwrap();
    assert_eq!((out.width(), out.height()), (3, 2));
    assert_eq!(out.get(0, 0), Color::rgba(9, 9, 9, 255));
}

#[test]
fn trim_defaults_background_to_top_left_pixel() {
    let mut src = PixelBuffer::blank(3, 3).unwrap();
    for y in 0..3i64 {
        for x in 0..3i64 {
            src.set(x, y, Color::rgba(40, 40, 40, 255));
        }
    }
    src.set(1, 1, Color::rgba(255, 0, 0, 255));
    let out = trim(&src, 5, None).unwrap();
    assert_eq!((out.width(), out.height()), (1, 1));
    assert_eq!(out.get(0, 0), Color::rgba(255, 0, 0, 255));
}
