//! Owned multi-channel f32 image in row-major, channel-interleaved layout.
//!
//! Sample index = `(y * w + x) * channels + c`. Values are conventionally
//! normalized to [0, 1] by the I/O layer; the processing core imposes no
//! range constraint.
#[derive(Clone, Debug)]
pub struct Image {
    /// Image width in pixels
    pub w: usize,
    /// Image height in pixels
    pub h: usize,
    /// Samples per pixel (1 = grayscale, 3 = RGB)
    pub channels: usize,
    /// Backing storage, row-major, channel-interleaved
    pub data: Vec<f32>,
}

impl Image {
    /// Construct a zero-initialized buffer of size `w × h × channels`.
    pub fn new(w: usize, h: usize, channels: usize) -> Self {
        Self {
            w,
            h,
            channels,
            data: vec![0.0; w * h * channels],
        }
    }

    /// Wrap an existing sample buffer; `data.len()` must equal
    /// `w * h * channels`.
    pub fn from_raw(w: usize, h: usize, channels: usize, data: Vec<f32>) -> Self {
        assert_eq!(
            data.len(),
            w * h * channels,
            "sample buffer does not match image geometry"
        );
        Self {
            w,
            h,
            channels,
            data,
        }
    }

    #[inline]
    /// Convert (x, y, c) to a linear index into `data`.
    pub fn idx(&self, x: usize, y: usize, c: usize) -> usize {
        (y * self.w + x) * self.channels + c
    }

    #[inline]
    /// Get the sample value at (x, y, c).
    pub fn get(&self, x: usize, y: usize, c: usize) -> f32 {
        self.data[self.idx(x, y, c)]
    }

    #[inline]
    /// Set the sample value at (x, y, c).
    pub fn set(&mut self, x: usize, y: usize, c: usize, v: f32) {
        let i = self.idx(x, y, c);
        self.data[i] = v;
    }

    #[inline]
    /// Borrow row `y` as a contiguous slice of `w * channels` samples.
    pub fn row(&self, y: usize) -> &[f32] {
        let start = y * self.w * self.channels;
        &self.data[start..start + self.w * self.channels]
    }

    #[inline]
    /// Mutably borrow row `y`.
    pub fn row_mut(&mut self, y: usize) -> &mut [f32] {
        let stride = self.w * self.channels;
        let start = y * stride;
        &mut self.data[start..start + stride]
    }

    /// True when `other` shares this image's geometry.
    pub fn same_geometry(&self, other: &Image) -> bool {
        self.w == other.w && self.h == other.h && self.channels == other.channels
    }

    /// Collapse to a single channel by averaging across channels. A
    /// single-channel image is returned as a plain copy.
    pub fn luma(&self) -> Image {
        if self.channels == 1 {
            return self.clone();
        }
        let mut out = Image::new(self.w, self.h, 1);
        let inv = 1.0 / self.channels as f32;
        for (dst, px) in out.data.iter_mut().zip(self.data.chunks(self.channels)) {
            *dst = px.iter().sum::<f32>() * inv;
        }
        out
    }
}
