//! Integer label maps and binary masks sharing the `ImageF32` geometry.
use serde::{Deserialize, Serialize};

/// Owned `u32` label map in row-major order. Label 0 is background.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelImage {
    pub w: usize,
    pub h: usize,
    pub data: Vec<u32>,
}

impl LabelImage {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![0; w * h],
        }
    }

    pub fn from_vec(w: usize, h: usize, data: Vec<u32>) -> Option<Self> {
        (data.len() == w * h).then_some(Self { w, h, data })
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u32 {
        self.data[y * self.w + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, label: u32) {
        self.data[y * self.w + x] = label;
    }

    pub fn max_label(&self) -> u32 {
        self.data.iter().copied().max().unwrap_or(0)
    }
}

/// Number of set pixels in a mask.
pub fn mask_area(mask: &[bool]) -> usize {
    mask.iter().filter(|&&m| m).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_area_counts_set_pixels() {
        assert_eq!(mask_area(&[true, false, false, true]), 2);
        assert_eq!(mask_area(&[]), 0);
    }

    #[test]
    fn shape_checked_construction() {
        let labels = LabelImage::from_vec(2, 2, vec![0, 3, 1, 0]).unwrap();
        assert_eq!(labels.max_label(), 3);
        assert_eq!(labels.get(1, 0), 3);
        assert!(LabelImage::from_vec(3, 2, vec![0; 4]).is_none());
    }
}
