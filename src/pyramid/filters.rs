use crate::image::{ImageF32, ImageView, ImageViewMut};

/// Trait implemented by separable 1D filters used for pyramid construction
/// and full-resolution smoothing.
pub trait SeparableFilter {
    /// Return the 1D taps (in left-to-right order). The kernel is assumed to be
    /// symmetric around its centre, but the implementation does not rely on it.
    fn taps(&self) -> &[f32];
}

/// Simple wrapper around a static filter kernel.
#[derive(Clone, Copy, Debug)]
pub struct StaticSeparableFilter {
    taps: &'static [f32],
}

impl Default for StaticSeparableFilter {
    fn default() -> Self {
        GAUSSIAN_5TAP
    }
}

impl StaticSeparableFilter {
    pub const fn new(taps: &'static [f32]) -> Self {
        Self { taps }
    }
}

impl SeparableFilter for StaticSeparableFilter {
    #[inline]
    fn taps(&self) -> &[f32] {
        self.taps
    }
}

/// Normalised 5-tap Gaussian filter `[1, 4, 6, 4, 1] / 16`.
pub const GAUSSIAN_5TAP: StaticSeparableFilter =
    StaticSeparableFilter::new(&[0.0625, 0.25, 0.375, 0.25, 0.0625]);

/// Full-resolution separable convolution with clamped borders.
pub fn blur(image: &ImageF32, filter: &impl SeparableFilter) -> ImageF32 {
    let taps = filter.taps();
    if image.is_empty() || taps.is_empty() {
        return image.clone();
    }
    let radius = taps.len() / 2;
    let mut horiz = ImageF32::new(image.w, image.h);
    for y in 0..image.h {
        let src = image.row(y);
        let dst = horiz.row_mut(y);
        for (x, out) in dst.iter_mut().enumerate() {
            let mut acc = 0.0f32;
            for (k, &tap) in taps.iter().enumerate() {
                let sx = clamp_index(x as isize + k as isize - radius as isize, image.w);
                acc += tap * src[sx];
            }
            *out = acc;
        }
    }
    let mut out = ImageF32::new(image.w, image.h);
    for y in 0..image.h {
        for x in 0..image.w {
            let mut acc = 0.0f32;
            for (k, &tap) in taps.iter().enumerate() {
                let sy = clamp_index(y as isize + k as isize - radius as isize, image.h);
                acc += tap * horiz.get(x, sy);
            }
            out.set(x, y, acc);
        }
    }
    out
}

fn clamp_index(idx: isize, upper: usize) -> usize {
    if upper == 0 {
        return 0;
    }
    if idx < 0 {
        0
    } else if (idx as usize) >= upper {
        upper - 1
    } else {
        idx as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blur_preserves_constant_image() {
        let img = ImageF32::filled(7, 5, 0.4);
        let out = blur(&img, &GAUSSIAN_5TAP);
        assert!(out.data.iter().all(|&v| (v - 0.4).abs() < 1e-6));
    }

    #[test]
    fn blur_spreads_impulse_symmetrically() {
        let mut img = ImageF32::new(9, 9);
        img.set(4, 4, 1.0);
        let out = blur(&img, &GAUSSIAN_5TAP);
        assert!((out.get(3, 4) - out.get(5, 4)).abs() < 1e-6);
        assert!((out.get(4, 3) - out.get(4, 5)).abs() < 1e-6);
        assert!(out.get(4, 4) < 1.0 && out.get(4, 4) > out.get(3, 4));
        assert!((out.sum() - 1.0).abs() < 1e-5);
    }
}
