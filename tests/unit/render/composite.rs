use super::*;
use crate::foundation::core::{Canvas, Rgba8Premul};

#[test]
fn over_src_alpha_0_is_noop() {
    let dst = [10, 20, 30, 40];
    assert_eq!(over(dst, [255, 255, 255, 0]), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    assert_eq!(over([0, 0, 0, 255], [255, 0, 0, 255]), [255, 0, 0, 255]);
}

#[test]
fn over_half_alpha_blends() {
    // 50% white over opaque black
    let out = over([0, 0, 0, 255], [128, 128, 128, 128]);
    assert_eq!(out, [128, 128, 128, 255]);
}

#[test]
fn blit_lands_at_the_overlay_offset() {
    let canvas = Canvas {
        width: 4,
        height: 3,
    };
    let mut frame = FrameRGBA::filled(canvas, Rgba8Premul::from_straight_rgba(0, 0, 255, 255));
    let overlay = Overlay {
        x: 1,
        y: 1,
        width: 2,
        height: 1,
        rgba8_premul: vec![255, 0, 0, 255, 0, 0, 0, 0],
    };
    blit_overlay(&mut frame, &overlay).unwrap();
    assert_eq!(frame.pixel(1, 1), Some([255, 0, 0, 255]));
    assert_eq!(frame.pixel(2, 1), Some([0, 0, 255, 255]));
    assert_eq!(frame.pixel(0, 0), Some([0, 0, 255, 255]));
}

#[test]
fn blit_outside_the_frame_is_rejected() {
    let mut frame = FrameRGBA::filled(
        Canvas {
            width: 2,
            height: 2,
        },
        Rgba8Premul::transparent(),
    );
    let overlay = Overlay {
        x: 1,
        y: 0,
        width: 2,
        height: 1,
        rgba8_premul: vec![0; 8],
    };
    assert!(blit_overlay(&mut frame, &overlay).is_err());
}
