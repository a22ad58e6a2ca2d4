//! Mass-spectrometry imaging datacube.
//!
//! The cube stores `width × height × n_mz` intensities pixel-major: the
//! spectrum of pixel `(x, y)` is the contiguous slice starting at
//! `(y · width + x) · n_mz`. An ion image is the slice of the cube at one
//! m/z index.

pub mod annotation;
pub mod io;
mod stats;

pub use stats::PeakStatistics;

use crate::error::FusionError;
use crate::image::ImageF32;
use crate::spectra::{AlignedSpectra, MzTolerance};

#[derive(Clone, Debug, PartialEq)]
pub struct MsiCube {
    width: usize,
    height: usize,
    mzs: Vec<f64>,
    data: Vec<f32>,
}

impl MsiCube {
    pub fn new(
        width: usize,
        height: usize,
        mzs: Vec<f64>,
        data: Vec<f32>,
    ) -> Result<Self, FusionError> {
        if width == 0 || height == 0 || mzs.is_empty() {
            return Err(FusionError::EmptyInput { what: "datacube" });
        }
        let expected = width * height * mzs.len();
        if data.len() != expected {
            return Err(FusionError::ShapeMismatch {
                what: "datacube intensities",
                expected,
                found: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            mzs,
            data,
        })
    }

    /// Scatter aligned pixel spectra into a zero-initialised cube. Pixels
    /// without a spectrum stay zero.
    pub fn from_spectra(
        width: usize,
        height: usize,
        aligned: &AlignedSpectra,
    ) -> Result<Self, FusionError> {
        let n = aligned.mzs.len();
        let mut cube = Self::new(width, height, aligned.mzs.clone(), vec![0.0; width * height * n])?;
        for pixel in &aligned.pixels {
            if pixel.x >= width || pixel.y >= height {
                return Err(FusionError::PixelOutOfBounds {
                    x: pixel.x,
                    y: pixel.y,
                    width,
                    height,
                });
            }
            if pixel.intensities.len() != n {
                return Err(FusionError::ShapeMismatch {
                    what: "aligned pixel spectrum",
                    expected: n,
                    found: pixel.intensities.len(),
                });
            }
            let start = (pixel.y * width + pixel.x) * n;
            for (dst, &v) in cube.data[start..start + n].iter_mut().zip(&pixel.intensities) {
                *dst = v as f32;
            }
        }
        Ok(cube)
    }

    /// Stack equally sized ion images, one per m/z.
    pub fn from_ion_images(mzs: Vec<f64>, images: &[ImageF32]) -> Result<Self, FusionError> {
        let first = images
            .first()
            .ok_or(FusionError::EmptyInput { what: "ion images" })?;
        if images.len() != mzs.len() {
            return Err(FusionError::ShapeMismatch {
                what: "m/z axis",
                expected: images.len(),
                found: mzs.len(),
            });
        }
        let (w, h, n) = (first.w, first.h, images.len());
        let mut data = vec![0.0; w * h * n];
        for (k, img) in images.iter().enumerate() {
            if !img.same_shape(first) {
                return Err(FusionError::ShapeMismatch {
                    what: "ion image pixels",
                    expected: w * h,
                    found: img.len(),
                });
            }
            for y in 0..h {
                for x in 0..w {
                    data[(y * w + x) * n + k] = img.get(x, y);
                }
            }
        }
        Self::new(w, h, mzs, data)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn n_mz(&self) -> usize {
        self.mzs.len()
    }

    pub fn mzs(&self) -> &[f64] {
        &self.mzs
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    pub fn spectrum_at(&self, x: usize, y: usize) -> &[f32] {
        let n = self.n_mz();
        let start = (y * self.width + x) * n;
        &self.data[start..start + n]
    }

    pub fn ion_image(&self, k: usize) -> ImageF32 {
        let n = self.n_mz();
        let mut img = ImageF32::new(self.width, self.height);
        for (dst, spectrum) in img.data.iter_mut().zip(self.data.chunks_exact(n)) {
            *dst = spectrum[k];
        }
        img
    }

    /// Ion image summed over every m/z within tolerance of `mz`.
    pub fn ion_image_at(&self, mz: f64, tolerance: MzTolerance) -> Option<ImageF32> {
        let ks: Vec<usize> = (0..self.n_mz())
            .filter(|&k| tolerance.contains(mz, self.mzs[k]))
            .collect();
        if ks.is_empty() {
            return None;
        }
        let n = self.n_mz();
        let mut img = ImageF32::new(self.width, self.height);
        for (dst, spectrum) in img.data.iter_mut().zip(self.data.chunks_exact(n)) {
            *dst = ks.iter().map(|&k| spectrum[k]).sum();
        }
        Some(img)
    }

    pub fn ion_images(&self) -> Vec<ImageF32> {
        (0..self.n_mz()).map(|k| self.ion_image(k)).collect()
    }

    pub fn mean_spectrum(&self) -> Vec<f64> {
        let n = self.n_mz();
        let mut acc = vec![0.0f64; n];
        for spectrum in self.data.chunks_exact(n) {
            for (a, &v) in acc.iter_mut().zip(spectrum) {
                *a += v as f64;
            }
        }
        let count = self.pixel_count() as f64;
        acc.iter_mut().for_each(|a| *a /= count);
        acc
    }

    pub fn total_ion_image(&self) -> ImageF32 {
        let mut img = ImageF32::new(self.width, self.height);
        for (dst, spectrum) in img.data.iter_mut().zip(self.data.chunks_exact(self.n_mz())) {
            *dst = spectrum.iter().sum();
        }
        img
    }

    /// Divide every pixel spectrum by its total ion count.
    pub fn normalize_tic(&mut self) {
        let n = self.n_mz();
        for spectrum in self.data.chunks_exact_mut(n) {
            let tic: f32 = spectrum.iter().sum();
            if tic > 0.0 {
                spectrum.iter_mut().for_each(|v| *v /= tic);
            }
        }
    }

    pub fn peak_statistics(&self) -> Vec<PeakStatistics> {
        stats::peak_statistics(self)
    }
}
