//! Gauss-Newton refinement of a displacement map.

use super::gradients::ImageGradients;
use super::hessian::HessianGrid;
use super::IcaParams;
use crate::error::{AlignError, Result};
use crate::image::Image;
use crate::types::AlignmentMap;
use nalgebra::{Matrix2, Vector2};

/// Determinants below this are treated as numerically singular; the affected
/// tile keeps its displacement for the iteration instead of erroring.
const SINGULARITY_THRESHOLD: f32 = 1e-10;

/// Iteratively refine `initial` to sub-pixel precision.
///
/// Per iteration and tile: skip when the patch Hessian is singular;
/// otherwise accumulate `b = -Σ gradient · residual` over the tile's pixels
/// (the residual is the bilinear sample of `alt_img` at `pixel + current
/// displacement`, minus the reference pixel; positions outside the valid
/// interpolation range contribute nothing), solve `H·Δ = b` and add `Δ` to
/// the tile's displacement. Termination is purely iteration-count-bounded.
pub fn refine_alignment(
    ref_img: &Image,
    alt_img: &Image,
    grads: &ImageGradients,
    hessian: &HessianGrid,
    initial: &AlignmentMap,
    params: &IcaParams,
) -> Result<AlignmentMap> {
    if params.tile_size == 0 {
        return Err(AlignError::InvalidParameter(
            "ica tile size must be positive".into(),
        ));
    }
    if ref_img.channels != 1 || alt_img.channels != 1 {
        return Err(AlignError::InvalidParameter(
            "ica refinement expects single-channel images".into(),
        ));
    }
    if grads.w != ref_img.w || grads.h != ref_img.h {
        return Err(AlignError::DimensionMismatch {
            expected_w: ref_img.w,
            expected_h: ref_img.h,
            expected_c: 1,
            got_w: grads.w,
            got_h: grads.h,
            got_c: 1,
        });
    }
    if hessian.w < initial.w || hessian.h < initial.h {
        return Err(AlignError::InvalidParameter(format!(
            "hessian grid {}x{} cannot cover a {}x{} displacement map",
            hessian.w, hessian.h, initial.w, initial.h
        )));
    }

    let tile = params.tile_size;
    let mut map = initial.clone();

    for _ in 0..params.iterations {
        for ty in 0..map.h {
            for tx in 0..map.w {
                let h = hessian.at(tx, ty);
                if h.determinant().abs() < SINGULARITY_THRESHOLD {
                    continue;
                }

                let current = map.get(tx, ty);
                let mut b = Vector2::zeros();

                let y_end = (ty * tile + tile).min(ref_img.h);
                let x_end = (tx * tile + tile).min(ref_img.w);
                for ref_y in ty * tile..y_end {
                    for ref_x in tx * tile..x_end {
                        let warped_x = ref_x as f32 + current.x;
                        let warped_y = ref_y as f32 + current.y;
                        if warped_x < 0.0
                            || warped_x >= alt_img.w as f32 - 1.0
                            || warped_y < 0.0
                            || warped_y >= alt_img.h as f32 - 1.0
                        {
                            continue;
                        }

                        let warped_val = bilinear_sample(alt_img, warped_x, warped_y);
                        let residual = warped_val - ref_img.get(ref_x, ref_y, 0);

                        let gi = ref_y * grads.w + ref_x;
                        b.x -= grads.gx[gi] * residual;
                        b.y -= grads.gy[gi] * residual;
                    }
                }

                if let Some(delta) = solve_2x2(&h, &b) {
                    let i = map.idx(tx, ty);
                    map.data[i].x += delta.x;
                    map.data[i].y += delta.y;
                }
            }
        }
    }

    Ok(map)
}

/// Closed-form Cramer solve of `A·x = b`; `None` when `A` is numerically
/// singular.
pub fn solve_2x2(a: &Matrix2<f32>, b: &Vector2<f32>) -> Option<Vector2<f32>> {
    let det = a.determinant();
    if det.abs() < SINGULARITY_THRESHOLD {
        return None;
    }
    let inv_det = 1.0 / det;
    Some(Vector2::new(
        (a[(1, 1)] * b.x - a[(0, 1)] * b.y) * inv_det,
        (-a[(1, 0)] * b.x + a[(0, 0)] * b.y) * inv_det,
    ))
}

/// Bilinear sample of a single-channel image. The caller guarantees
/// `0 <= x < w-1` and `0 <= y < h-1`.
#[inline]
fn bilinear_sample(img: &Image, x: f32, y: f32) -> f32 {
    let x0 = x as usize;
    let y0 = y as usize;
    let dx = x - x0 as f32;
    let dy = y - y0 as f32;

    let i = y0 * img.w + x0;
    let v00 = img.data[i];
    let v10 = img.data[i + 1];
    let v01 = img.data[i + img.w];
    let v11 = img.data[i + img.w + 1];

    (1.0 - dx) * (1.0 - dy) * v00 + dx * (1.0 - dy) * v10 + (1.0 - dx) * dy * v01 + dx * dy * v11
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ica::{compute_gradients, compute_hessian};
    use crate::types::Alignment;

    #[test]
    fn solve_2x2_inverts_known_system() {
        let a = Matrix2::new(2.0, 1.0, 1.0, 3.0);
        let b = Vector2::new(5.0, 10.0);
        let x = solve_2x2(&a, &b).unwrap();
        // det = 5, x = (A^-1 b) = ((15 - 10)/5, (-5 + 20)/5)
        assert!((x.x - 1.0).abs() < 1e-6);
        assert!((x.y - 3.0).abs() < 1e-6);
    }

    #[test]
    fn solve_2x2_rejects_singular_matrix() {
        let a = Matrix2::new(1.0, 2.0, 2.0, 4.0);
        assert!(solve_2x2(&a, &Vector2::new(1.0, 1.0)).is_none());
    }

    #[test]
    fn bilinear_sample_interpolates() {
        let img = Image::from_raw(2, 2, 1, vec![0.0, 1.0, 2.0, 3.0]);
        assert!((bilinear_sample(&img, 0.5, 0.5) - 1.5).abs() < 1e-6);
        assert!((bilinear_sample(&img, 0.0, 0.0) - 0.0).abs() < 1e-6);
    }

    #[test]
    fn flat_patch_keeps_initial_displacement() {
        let flat = Image::from_raw(32, 32, 1, vec![0.5; 32 * 32]);
        let grads = compute_gradients(&flat, 0.0).unwrap();
        let hessian = compute_hessian(&grads, 16).unwrap();

        let mut initial = AlignmentMap::new(2, 2);
        initial.set(1, 0, Alignment::new(1.25, -0.75));

        let params = IcaParams {
            sigma_blur: 0.0,
            iterations: 4,
            tile_size: 16,
        };
        let refined = refine_alignment(&flat, &flat, &grads, &hessian, &initial, &params).unwrap();
        assert_eq!(refined.get(1, 0), Alignment::new(1.25, -0.75));
        assert_eq!(refined.get(0, 0), Alignment::new(0.0, 0.0));
    }

    #[test]
    fn multi_channel_images_are_rejected() {
        let rgb = Image::new(16, 16, 3);
        let gray = Image::new(16, 16, 1);
        let grads = compute_gradients(&gray, 0.0).unwrap();
        let hessian = compute_hessian(&grads, 16).unwrap();
        let map = AlignmentMap::new(1, 1);
        let params = IcaParams::default();
        assert!(refine_alignment(&rgb, &gray, &grads, &hessian, &map, &params).is_err());
    }
}
