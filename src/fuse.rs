//! Temporal fusion of aligned frame stacks.

use crate::error::{AlignError, Result};
use crate::image::Image;

/// Per-sample arithmetic mean over all frames whose value at that location
/// is not NaN; locations where every frame is NaN come out zero.
///
/// All frames must share the first frame's geometry.
pub fn temporal_average(frames: &[&Image]) -> Result<Image> {
    let first = frames.first().ok_or_else(|| {
        AlignError::InvalidParameter("temporal fusion requires at least one frame".into())
    })?;
    for frame in &frames[1..] {
        if !first.same_geometry(frame) {
            return Err(AlignError::DimensionMismatch {
                expected_w: first.w,
                expected_h: first.h,
                expected_c: first.channels,
                got_w: frame.w,
                got_h: frame.h,
                got_c: frame.channels,
            });
        }
    }

    let mut out = Image::new(first.w, first.h, first.channels);
    for (i, dst) in out.data.iter_mut().enumerate() {
        let mut sum = 0.0f32;
        let mut valid = 0u32;
        for frame in frames {
            let v = frame.data[i];
            if !v.is_nan() {
                sum += v;
                valid += 1;
            }
        }
        *dst = if valid > 0 { sum / valid as f32 } else { 0.0 };
    }
    Ok(out)
}
