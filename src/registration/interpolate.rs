//! Bilinear sampling and resampling under a rigid transform.

use super::transform::RigidTransform;
use crate::image::ImageF32;
use nalgebra::Vector2;

/// Bilinear sample at `(x, y)` with pixel centres on integer coordinates.
/// Returns `None` outside `[0, w−1] × [0, h−1]`.
#[inline]
pub fn sample_bilinear(image: &ImageF32, x: f64, y: f64) -> Option<f32> {
    if image.w == 0 || image.h == 0 || !x.is_finite() || !y.is_finite() {
        return None;
    }
    let max_x = (image.w - 1) as f64;
    let max_y = (image.h - 1) as f64;
    if x < 0.0 || y < 0.0 || x > max_x || y > max_y {
        return None;
    }
    let x0 = (x.floor() as usize).min(image.w - 1);
    let y0 = (y.floor() as usize).min(image.h - 1);
    let x1 = (x0 + 1).min(image.w - 1);
    let y1 = (y0 + 1).min(image.h - 1);
    let fx = (x - x0 as f64) as f32;
    let fy = (y - y0 as f64) as f32;
    let top = image.get(x0, y0) * (1.0 - fx) + image.get(x1, y0) * fx;
    let bottom = image.get(x0, y1) * (1.0 - fx) + image.get(x1, y1) * fx;
    Some(top * (1.0 - fy) + bottom * fy)
}

/// Render `moving` on a `width × height` fixed grid: every fixed pixel `p`
/// takes the moving value at `transform.apply(p)`, or `default` outside.
pub fn resample(
    moving: &ImageF32,
    transform: &RigidTransform,
    width: usize,
    height: usize,
    default: f32,
) -> ImageF32 {
    resample_with(moving, width, height, default, |p| transform.apply(p))
}

pub(crate) fn resample_with(
    moving: &ImageF32,
    width: usize,
    height: usize,
    default: f32,
    map: impl Fn(Vector2<f64>) -> Vector2<f64>,
) -> ImageF32 {
    let mut out = ImageF32::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let q = map(Vector2::new(x as f64, y as f64));
            let v = sample_bilinear(moving, q.x, q.y).unwrap_or(default);
            out.set(x, y, v);
        }
    }
    out
}

/// Coordinate in a `src`-sized image of the pixel `dst_coord` of a
/// `dst`-sized resize (pixel-centre aligned).
#[inline]
pub(crate) fn resize_source_coord(dst_coord: f64, src: usize, dst: usize) -> f64 {
    let scale = src as f64 / dst.max(1) as f64;
    ((dst_coord + 0.5) * scale - 0.5).clamp(0.0, src.saturating_sub(1) as f64)
}

/// Bilinear resize to `width × height` with pixel-centre alignment.
pub fn resize_bilinear(image: &ImageF32, width: usize, height: usize) -> ImageF32 {
    if image.w == width && image.h == height {
        return image.clone();
    }
    let mut out = ImageF32::new(width, height);
    if image.is_empty() {
        return out;
    }
    for y in 0..height {
        let sy = resize_source_coord(y as f64, image.h, height);
        for x in 0..width {
            let sx = resize_source_coord(x as f64, image.w, width);
            out.set(x, y, sample_bilinear(image, sx, sy).unwrap_or(0.0));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(w: usize, h: usize) -> ImageF32 {
        let mut img = ImageF32::new(w, h);
        for y in 0..h {
            for x in 0..w {
                img.set(x, y, x as f32 + 10.0 * y as f32);
            }
        }
        img
    }

    #[test]
    fn bilinear_is_exact_on_linear_ramp() {
        let img = ramp(5, 4);
        let v = sample_bilinear(&img, 1.25, 2.5).unwrap();
        assert!((v - 26.25).abs() < 1e-5, "{v}");
        assert!(sample_bilinear(&img, 4.0, 3.0).is_some());
        assert!(sample_bilinear(&img, -0.01, 1.0).is_none());
        assert!(sample_bilinear(&img, 1.0, 3.01).is_none());
    }

    #[test]
    fn translation_shifts_content() {
        let img = ramp(8, 8);
        let t = RigidTransform::new(0.0, Vector2::new(2.0, 1.0), Vector2::new(3.5, 3.5));
        let out = resample(&img, &t, 8, 8, -1.0);
        assert!((out.get(0, 0) - img.get(2, 1)).abs() < 1e-5);
        assert_eq!(out.get(7, 7), -1.0);
    }

    #[test]
    fn resize_keeps_constant_images_constant() {
        let img = ImageF32::filled(7, 5, 0.4);
        let out = resize_bilinear(&img, 14, 3);
        assert_eq!((out.w, out.h), (14, 3));
        assert!(out.data.iter().all(|&v| (v - 0.4).abs() < 1e-6));
    }
}
