//! Owned single-channel f32 image in row-major layout (stride == width).
//!
//! Ion images, reference images, representative images and warped outputs
//! all use this type. Provides row access through [`ImageView`](super::ImageView).
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageF32 {
    /// Image width in pixels
    pub w: usize,
    /// Image height in pixels
    pub h: usize,
    /// Number of f32 elements between consecutive rows (equals `w`)
    pub stride: usize,
    /// Backing storage in row-major order
    pub data: Vec<f32>,
}

impl ImageF32 {
    /// Construct a zero-initialized buffer of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            stride: w,
            data: vec![0.0; w * h],
        }
    }

    /// Wrap an existing row-major buffer. Returns `None` when the length does
    /// not match `w * h`.
    pub fn from_vec(w: usize, h: usize, data: Vec<f32>) -> Option<Self> {
        (data.len() == w * h).then_some(Self {
            w,
            h,
            stride: w,
            data,
        })
    }

    /// Image filled with a constant value.
    pub fn filled(w: usize, h: usize, value: f32) -> Self {
        Self {
            w,
            h,
            stride: w,
            data: vec![value; w * h],
        }
    }

    #[inline]
    /// Convert (x, y) to a linear index into `data`.
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.stride + x
    }
    #[inline]
    /// Get the pixel value at (x, y).
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[self.idx(x, y)]
    }
    #[inline]
    /// Set the pixel value at (x, y).
    pub fn set(&mut self, x: usize, y: usize, v: f32) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }

    pub fn len(&self) -> usize {
        self.w * self.h
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    pub fn same_shape(&self, other: &ImageF32) -> bool {
        self.w == other.w && self.h == other.h
    }

    /// Smallest and largest finite pixel values, `None` for empty or all-NaN images.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        let mut lo = f32::INFINITY;
        let mut hi = f32::NEG_INFINITY;
        for &v in self.data.iter().filter(|v| v.is_finite()) {
            lo = lo.min(v);
            hi = hi.max(v);
        }
        (lo <= hi).then_some((lo, hi))
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().map(|&v| v as f64).sum()
    }

    pub fn mean(&self) -> f32 {
        if self.data.is_empty() {
            0.0
        } else {
            (self.sum() / self.data.len() as f64) as f32
        }
    }

    /// Min–max rescale into `[0, 1]`. A constant image maps to zeros.
    pub fn normalized(&self) -> ImageF32 {
        let mut out = self.clone();
        out.normalize_in_place();
        out
    }

    pub fn normalize_in_place(&mut self) {
        let Some((lo, hi)) = self.min_max() else {
            return;
        };
        let range = hi - lo;
        for v in &mut self.data {
            *v = if range > f32::EPSILON && v.is_finite() {
                (*v - lo) / range
            } else {
                0.0
            };
        }
    }
}

impl crate::image::traits::ImageView for ImageF32 {
    type Pixel = f32;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn stride(&self) -> usize {
        self.stride
    }
    #[inline]
    fn row(&self, y: usize) -> &[f32] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }
}

impl crate::image::traits::ImageViewMut for ImageF32 {
    #[inline]
    fn row_mut(&mut self, y: usize) -> &mut [f32] {
        let start = y * self.stride;
        let end = start + self.w;
        &mut self.data[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_maps_range_to_unit_interval() {
        let img = ImageF32::from_vec(2, 2, vec![2.0, 4.0, 6.0, 10.0]).unwrap();
        let n = img.normalized();
        assert_eq!(n.data, vec![0.0, 0.25, 0.5, 1.0]);
    }

    #[test]
    fn constant_image_normalizes_to_zero() {
        let n = ImageF32::filled(3, 2, 7.0).normalized();
        assert!(n.data.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn from_vec_rejects_wrong_length() {
        assert!(ImageF32::from_vec(3, 3, vec![0.0; 8]).is_none());
    }
}
