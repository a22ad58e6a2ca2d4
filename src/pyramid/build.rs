use super::filters::blur;
use super::options::PyramidOptions;
use crate::image::{ImageF32, ImageView, ImageViewMut};
use log::debug;

#[derive(Clone, Debug, Default)]
pub struct Pyramid {
    pub levels: Vec<ImageF32>,
}

impl Pyramid {
    /// Build a pyramid from a float image. The depth is clamped by
    /// `options.min_size`, so coarse levels never collapse to a few pixels.
    pub fn build_f32(image: ImageF32, options: PyramidOptions) -> Self {
        let depth = options.effective_levels(image.w, image.h);
        Self::build_to_depth(image, depth, &options)
    }

    /// Pyramids of a fixed/moving pair with the same number of levels, limited
    /// by the smaller of the two images.
    pub fn build_pair(fixed: ImageF32, moving: ImageF32, options: PyramidOptions) -> (Self, Self) {
        let depth = options
            .effective_levels(fixed.w, fixed.h)
            .min(options.effective_levels(moving.w, moving.h));
        debug!(
            "pyramid pair: {depth} levels for fixed {}x{} / moving {}x{}",
            fixed.w, fixed.h, moving.w, moving.h
        );
        (
            Self::build_to_depth(fixed, depth, &options),
            Self::build_to_depth(moving, depth, &options),
        )
    }

    fn build_to_depth(image: ImageF32, depth: usize, options: &PyramidOptions) -> Self {
        let mut levels = Vec::with_capacity(depth.max(1));
        levels.push(image);
        for lvl in 1..depth {
            let prev = &levels[lvl - 1];
            let next = if lvl <= options.blur_levels {
                decimate(&blur(prev, &options.filter))
            } else {
                decimate(prev)
            };
            levels.push(next);
        }
        Self { levels }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Scale factor mapping level-0 coordinates to `index` coordinates.
    pub fn scale_for_index(&self, index: usize) -> f64 {
        1.0 / (1u64 << index.min(63)) as f64
    }
}

/// Keep every second sample in both directions; odd sizes round up.
fn decimate(src: &ImageF32) -> ImageF32 {
    let mut dst = ImageF32::new(src.w.div_ceil(2), src.h.div_ceil(2));
    for y in 0..dst.h {
        let src_row = src.row(2 * y);
        for (x, px) in dst.row_mut(y).iter_mut().enumerate() {
            *px = src_row[2 * x];
        }
    }
    dst
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_halve_dimensions_rounding_up() {
        let img = ImageF32::filled(33, 20, 1.0);
        let pyr = Pyramid::build_f32(img, PyramidOptions::new(3).with_min_size(4));
        let dims: Vec<_> = pyr.levels.iter().map(|l| (l.w, l.h)).collect();
        assert_eq!(dims, vec![(33, 20), (17, 10), (9, 5)]);
        assert!(pyr.levels[2].data.iter().all(|&v| (v - 1.0).abs() < 1e-5));
    }

    #[test]
    fn min_size_limits_depth() {
        let img = ImageF32::new(20, 20);
        let pyr = Pyramid::build_f32(img, PyramidOptions::new(6).with_min_size(8));
        assert_eq!(pyr.len(), 2, "20 -> 10 allowed, 10 -> 5 rejected");
        assert_eq!(pyr.scale_for_index(1), 0.5);
    }

    #[test]
    fn pair_depth_follows_smaller_image() {
        let fixed = ImageF32::new(64, 64);
        let moving = ImageF32::new(20, 20);
        let (f, m) = Pyramid::build_pair(fixed, moving, PyramidOptions::new(4));
        assert_eq!(f.len(), 2);
        assert_eq!(m.len(), 2);
        assert_eq!((f.levels[1].w, m.levels[1].w), (32, 10));
    }
}
