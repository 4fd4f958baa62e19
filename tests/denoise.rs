mod common;

use burst_align::denoise::{denoise_frame, DenoisingParams, FrameBuffer};
use burst_align::fuse::temporal_average;
use common::synthetic::translated_frame;

#[test]
fn fusing_identical_aligned_frames_returns_the_frame() {
    let frame = translated_frame(32, 32, 0.0, 0.0);
    let out = temporal_average(&[&frame, &frame, &frame, &frame]).unwrap();
    for (o, f) in out.data.iter().zip(&frame.data) {
        assert!((o - f).abs() < 1e-6);
    }
}

#[test]
fn denoise_recovers_static_scene_interior() {
    let _ = env_logger::builder().is_test(true).try_init();

    let params = DenoisingParams {
        temporal_radius: 1,
        block_size: 16,
        search_radius: 4,
        ..DenoisingParams::default()
    };
    let mut buffer = FrameBuffer::new(params.window()).unwrap();
    for _ in 0..params.window() {
        buffer.push(translated_frame(48, 48, 0.0, 0.0));
    }

    let fused = denoise_frame(&buffer, &params).unwrap();
    let center = translated_frame(48, 48, 0.0, 0.0);

    // Warped neighbors drop their last row/column (outside the bilinear
    // range), so only the interior is expected to match the scene exactly.
    for y in 0..47 {
        for x in 0..47 {
            let got = fused.get(x, y, 0);
            let want = center.get(x, y, 0);
            assert!(
                (got - want).abs() < 1e-4,
                "pixel ({x},{y}): got {got}, want {want}"
            );
        }
    }
}

#[test]
fn denoise_averages_a_translating_scene() {
    let _ = env_logger::builder().is_test(true).try_init();

    // Camera pans one pixel per frame; each neighbor must be pulled back
    // onto the center frame before fusion.
    let params = DenoisingParams {
        temporal_radius: 1,
        block_size: 16,
        search_radius: 4,
        ..DenoisingParams::default()
    };
    let mut buffer = FrameBuffer::new(params.window()).unwrap();
    for i in 0..params.window() {
        buffer.push(translated_frame(48, 48, i as f32, 0.0));
    }

    let fused = denoise_frame(&buffer, &params).unwrap();
    let center = translated_frame(48, 48, 1.0, 0.0);

    // Check a central patch: block matching can recover the ±1 px motion
    // everywhere except the frame borders.
    for y in 8..40 {
        for x in 8..40 {
            let got = fused.get(x, y, 0);
            let want = center.get(x, y, 0);
            assert!(
                (got - want).abs() < 5e-2,
                "pixel ({x},{y}): got {got}, want {want}"
            );
        }
    }
}
