//! Image gradients with optional separable Gaussian pre-smoothing.
//!
//! The two boundary policies here differ on purpose and both must hold:
//! the blur renormalizes its kernel over in-range taps (so a constant image
//! stays constant up to the border), while the centered-difference gradient
//! simply omits out-of-range taps without renormalizing (border gradients
//! of a ramp come out at half magnitude).

use crate::error::{AlignError, Result};
use crate::image::Image;

/// Horizontal/vertical derivative planes, aligned 1:1 with the source image.
#[derive(Clone, Debug)]
pub struct ImageGradients {
    pub w: usize,
    pub h: usize,
    pub gx: Vec<f32>,
    pub gy: Vec<f32>,
}

/// Compute centered-difference gradients of a single-channel image,
/// optionally Gaussian-smoothed first (`sigma_blur > 0`).
pub fn compute_gradients(img: &Image, sigma_blur: f32) -> Result<ImageGradients> {
    if img.channels != 1 {
        return Err(AlignError::InvalidParameter(format!(
            "gradient computation expects a single-channel image, got {} channels",
            img.channels
        )));
    }
    if !(sigma_blur >= 0.0) {
        return Err(AlignError::InvalidParameter(format!(
            "blur sigma must be non-negative, got {sigma_blur}"
        )));
    }

    let blurred;
    let plane: &[f32] = if sigma_blur > 0.0 {
        blurred = gaussian_blur(&img.data, img.w, img.h, sigma_blur);
        &blurred
    } else {
        &img.data
    };

    Ok(centered_differences(plane, img.w, img.h))
}

/// 3-tap centered difference per axis; out-of-range taps are dropped from
/// the sum.
fn centered_differences(plane: &[f32], w: usize, h: usize) -> ImageGradients {
    let mut gx = vec![0.0f32; w * h];
    let mut gy = vec![0.0f32; w * h];

    for y in 0..h {
        for x in 0..w {
            let i = y * w + x;
            let mut sum = 0.0;
            if x >= 1 {
                sum -= plane[i - 1];
            }
            if x + 1 < w {
                sum += plane[i + 1];
            }
            gx[i] = sum;
        }
    }

    for y in 0..h {
        for x in 0..w {
            let i = y * w + x;
            let mut sum = 0.0;
            if y >= 1 {
                sum -= plane[i - w];
            }
            if y + 1 < h {
                sum += plane[i + w];
            }
            gy[i] = sum;
        }
    }

    ImageGradients { w, h, gx, gy }
}

/// Separable Gaussian blur of a single-channel plane. Rows first, then
/// columns through disjoint scratch buffers.
fn gaussian_blur(plane: &[f32], w: usize, h: usize, sigma: f32) -> Vec<f32> {
    let kernel = gaussian_kernel(sigma);
    let mut out = vec![0.0f32; w * h];

    for y in 0..h {
        blur_1d(&plane[y * w..(y + 1) * w], &mut out[y * w..(y + 1) * w], &kernel);
    }

    let mut column = vec![0.0f32; h];
    let mut filtered = vec![0.0f32; h];
    for x in 0..w {
        for y in 0..h {
            column[y] = out[y * w + x];
        }
        blur_1d(&column, &mut filtered, &kernel);
        for y in 0..h {
            out[y * w + x] = filtered[y];
        }
    }
    out
}

/// Normalized Gaussian taps with radius `trunc(4σ + 0.5)`.
fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    let radius = (4.0 * sigma + 0.5) as usize;
    let size = 2 * radius + 1;
    let mut kernel = Vec::with_capacity(size);
    let mut sum = 0.0f32;
    for i in 0..size {
        let x = i as f32 - radius as f32;
        let v = (-(x * x) / (2.0 * sigma * sigma)).exp();
        kernel.push(v);
        sum += v;
    }
    for v in &mut kernel {
        *v /= sum;
    }
    kernel
}

/// 1D convolution with per-position renormalization over in-range taps, so
/// the output stays unbiased near the boundary.
fn blur_1d(input: &[f32], output: &mut [f32], kernel: &[f32]) {
    let n = input.len() as isize;
    let radius = (kernel.len() / 2) as isize;
    for (i, out) in output.iter_mut().enumerate() {
        let mut sum = 0.0f32;
        let mut weight_sum = 0.0f32;
        for (k, &weight) in kernel.iter().enumerate() {
            let idx = i as isize + k as isize - radius;
            if idx >= 0 && idx < n {
                sum += input[idx as usize] * weight;
                weight_sum += weight;
            }
        }
        *out = sum / weight_sum;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn horizontal_ramp(w: usize, h: usize) -> Image {
        let mut img = Image::new(w, h, 1);
        for y in 0..h {
            for x in 0..w {
                img.set(x, y, 0, x as f32);
            }
        }
        img
    }

    #[test]
    fn ramp_gradient_is_two_inside_one_at_border() {
        let img = horizontal_ramp(6, 3);
        let grads = compute_gradients(&img, 0.0).unwrap();
        // interior: f(x+1) - f(x-1) = 2
        assert_eq!(grads.gx[1 * 6 + 3], 2.0);
        // borders keep only the surviving tap
        assert_eq!(grads.gx[1 * 6 + 0], 1.0);
        assert_eq!(grads.gx[1 * 6 + 5], -4.0);
        // vertical differences cancel on interior rows; border rows keep
        // the single remaining tap, which reads the ramp value itself
        for x in 0..6 {
            assert_eq!(grads.gy[1 * 6 + x], 0.0);
            assert_eq!(grads.gy[0 * 6 + x], x as f32);
            assert_eq!(grads.gy[2 * 6 + x], -(x as f32));
        }
    }

    #[test]
    fn blur_keeps_constant_image_constant() {
        let img = Image::from_raw(9, 7, 1, vec![0.37; 63]);
        let grads = compute_gradients(&img, 1.5).unwrap();
        // interior gradients vanish only if the renormalized blur left the
        // plane constant all the way to the border
        for y in 1..6 {
            for x in 1..8 {
                assert!(grads.gx[y * 9 + x].abs() < 1e-5);
                assert!(grads.gy[y * 9 + x].abs() < 1e-5);
            }
        }
        // the border gradient keeps one full-valued tap, confirming the
        // boundary samples were not attenuated
        assert!((grads.gx[3 * 9 + 0] - 0.37).abs() < 1e-5);
        assert!((grads.gx[3 * 9 + 8] + 0.37).abs() < 1e-5);
    }

    #[test]
    fn kernel_radius_tracks_sigma() {
        assert_eq!(gaussian_kernel(1.0).len(), 2 * 4 + 1);
        assert_eq!(gaussian_kernel(0.5).len(), 2 * 2 + 1);
        let k = gaussian_kernel(1.0);
        let sum: f32 = k.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
    }

    #[test]
    fn multi_channel_input_is_rejected() {
        let img = Image::new(4, 4, 3);
        assert!(compute_gradients(&img, 0.0).is_err());
    }
}
