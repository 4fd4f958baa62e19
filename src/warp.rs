//! Image resampling along a tile-resolution displacement field.

use crate::error::{AlignError, Result};
use crate::image::Image;
use crate::types::AlignmentMap;

/// Resample `src` according to `flow`, producing an image of the same size.
///
/// The flow map is tile-resolution; each output pixel adopts its nearest
/// tile by proportional index mapping per axis (`tile_x = x·map_w / src_w`,
/// `tile_y = y·map_h / src_h`, integer arithmetic), adds that displacement
/// to its own coordinate and bilinear-samples the source there. Pixels whose
/// sampling position leaves the valid interpolation range
/// `[0, w-2] × [0, h-2]` stay zero in the output.
pub fn warp_image(src: &Image, flow: &AlignmentMap) -> Result<Image> {
    if flow.w == 0 || flow.h == 0 {
        return Err(AlignError::InvalidParameter(
            "displacement map must contain at least one tile".into(),
        ));
    }

    let mut out = Image::new(src.w, src.h, src.channels);
    let max_x = src.w as f32 - 1.0;
    let max_y = src.h as f32 - 1.0;

    for y in 0..src.h {
        let ty = y * flow.h / src.h;
        for x in 0..src.w {
            let tx = x * flow.w / src.w;
            let a = flow.get(tx, ty);

            let fx = x as f32 + a.x;
            let fy = y as f32 + a.y;
            if fx < 0.0 || fx >= max_x || fy < 0.0 || fy >= max_y {
                continue;
            }

            let x0 = fx as usize;
            let y0 = fy as usize;
            let wx = fx - x0 as f32;
            let wy = fy - y0 as f32;

            for c in 0..src.channels {
                let v00 = src.get(x0, y0, c);
                let v10 = src.get(x0 + 1, y0, c);
                let v01 = src.get(x0, y0 + 1, c);
                let v11 = src.get(x0 + 1, y0 + 1, c);
                let v = (1.0 - wx) * (1.0 - wy) * v00
                    + wx * (1.0 - wy) * v10
                    + (1.0 - wx) * wy * v01
                    + wx * wy * v11;
                out.set(x, y, c, v);
            }
        }
    }

    Ok(out)
}
