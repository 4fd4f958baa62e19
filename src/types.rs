//! Tile-resolution displacement types shared by the whole pipeline.

use serde::Serialize;

/// A 2D displacement in pixels, expressed at the pixel scale of the pyramid
/// level it was estimated on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Alignment {
    /// Horizontal displacement.
    pub x: f32,
    /// Vertical displacement.
    pub y: f32,
}

impl Alignment {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A grid of per-tile displacements. Dimensions are measured in tiles, not
/// pixels: `w = level_width / tile_size`, `h = level_height / tile_size`
/// (truncating division).
#[derive(Clone, Debug, Serialize)]
pub struct AlignmentMap {
    /// Grid width in tiles.
    pub w: usize,
    /// Grid height in tiles.
    pub h: usize,
    /// Row-major tile displacements.
    pub data: Vec<Alignment>,
}

impl AlignmentMap {
    /// Construct a zero-initialized map of `w × h` tiles.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![Alignment::default(); w * h],
        }
    }

    #[inline]
    pub fn idx(&self, tx: usize, ty: usize) -> usize {
        ty * self.w + tx
    }

    #[inline]
    pub fn get(&self, tx: usize, ty: usize) -> Alignment {
        self.data[self.idx(tx, ty)]
    }

    #[inline]
    pub fn set(&mut self, tx: usize, ty: usize, a: Alignment) {
        let i = self.idx(tx, ty);
        self.data[i] = a;
    }

    /// Mean displacement over all tiles, `[0.0, 0.0]` for an empty map.
    pub fn mean_displacement(&self) -> [f32; 2] {
        if self.data.is_empty() {
            return [0.0, 0.0];
        }
        let mut sum = [0.0f64, 0.0f64];
        for a in &self.data {
            sum[0] += a.x as f64;
            sum[1] += a.y as f64;
        }
        let n = self.data.len() as f64;
        [(sum[0] / n) as f32, (sum[1] / n) as f32]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_map_is_zeroed() {
        let map = AlignmentMap::new(3, 2);
        assert_eq!(map.data.len(), 6);
        assert!(map.data.iter().all(|a| a.x == 0.0 && a.y == 0.0));
    }

    #[test]
    fn mean_displacement_averages_tiles() {
        let mut map = AlignmentMap::new(2, 1);
        map.set(0, 0, Alignment::new(1.0, -2.0));
        map.set(1, 0, Alignment::new(3.0, 2.0));
        assert_eq!(map.mean_displacement(), [2.0, 0.0]);
    }
}
