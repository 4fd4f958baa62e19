use burst_align::image::Image;

/// Smooth non-periodic luminance field. Wavelengths are long enough that a
/// shifted copy has a unique best match inside small search windows.
pub fn texture_at(x: f32, y: f32) -> f32 {
    0.5 + 0.2 * (0.23 * x + 0.31 * y).sin() + 0.15 * (0.11 * x - 0.19 * y).sin()
}

/// Sample the texture on a `w × h` grid, with the content translated by
/// `(shift_x, shift_y)` pixels. The field is analytic, so translated frames
/// have no border artifacts.
pub fn translated_frame(w: usize, h: usize, shift_x: f32, shift_y: f32) -> Image {
    let mut img = Image::new(w, h, 1);
    for y in 0..h {
        for x in 0..w {
            img.set(x, y, 0, texture_at(x as f32 - shift_x, y as f32 - shift_y));
        }
    }
    img
}
