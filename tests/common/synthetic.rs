//! Synthetic MSI acquisitions of an elliptical tissue phantom.
//!
//! The phantom lives in reference-image coordinates. The MSI grid is coarser
//! than the reference (`scale` reference pixels per MSI pixel) and sees the
//! phantom through a known rigid transform, so that
//! `msi(truth(p)) == phantom(p)` in resized MSI coordinates.

use msi_fusion::cube::MsiCube;
use msi_fusion::image::ImageF32;
use msi_fusion::registration::RigidTransform;
use msi_fusion::spectra::{PixelSpectrum, Spectrum};
use nalgebra::Vector2;

pub const MZS: [f64; 5] = [100.0, 200.0, 300.0, 400.0, 500.0];
/// Index of the ion whose distribution matches the reference contrast.
pub const MATCHING_ION: usize = 1;
pub const NOISE_ION: usize = 3;

#[derive(Clone, Copy, Debug)]
pub struct Phantom {
    pub center: (f64, f64),
    pub axes: (f64, f64),
    /// Region A: tissue left of this x.
    pub split_x: f64,
    /// Region B: disc inside the tissue.
    pub disc: (f64, f64, f64),
}

impl Phantom {
    pub fn for_size(size: usize) -> Self {
        let s = size as f64 / 80.0;
        Self {
            center: (40.0 * s, 40.0 * s),
            axes: (26.0 * s, 17.0 * s),
            split_x: 33.0 * s,
            disc: (50.0 * s, 43.0 * s, 7.0 * s),
        }
    }

    pub fn tissue(&self, x: f64, y: f64) -> bool {
        let dx = (x - self.center.0) / self.axes.0;
        let dy = (y - self.center.1) / self.axes.1;
        dx * dx + dy * dy <= 1.0
    }

    pub fn region_a(&self, x: f64, y: f64) -> bool {
        self.tissue(x, y) && x < self.split_x
    }

    pub fn region_b(&self, x: f64, y: f64) -> bool {
        let (cx, cy, r) = self.disc;
        self.tissue(x, y) && (x - cx).powi(2) + (y - cy).powi(2) <= r * r
    }

    /// Ion intensities at a phantom point plus a per-pixel noise value.
    fn ions(&self, x: f64, y: f64, noise: f32) -> [f32; 5] {
        let t = f32::from(u8::from(self.tissue(x, y)));
        let a = f32::from(u8::from(self.region_a(x, y)));
        let b = f32::from(u8::from(self.region_b(x, y)));
        [t, 0.2 * t + a, b, noise, 0.5 * t + b]
    }

    /// Reference contrast: dim tissue with bright region A.
    pub fn reference(&self, width: usize, height: usize) -> ImageF32 {
        let mut img = ImageF32::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let (fx, fy) = (x as f64, y as f64);
                let v = 0.3 * f32::from(u8::from(self.tissue(fx, fy)))
                    + 0.7 * f32::from(u8::from(self.region_a(fx, fy)));
                img.set(x, y, v);
            }
        }
        img
    }
}

/// Deterministic uniform noise in `[0, 1)`.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next_f32(&mut self) -> f32 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.0 >> 40) as f32) / (1u64 << 24) as f32
    }
}

pub struct Acquisition {
    pub cube: MsiCube,
    pub reference: ImageF32,
    pub truth: RigidTransform,
    pub phantom: Phantom,
    /// Tissue membership of every MSI pixel, row-major.
    pub tissue_msi: Vec<bool>,
}

/// Datacube on a `msi_size²` grid seen through `truth`, and the reference
/// image on a `ref_size²` grid.
pub fn acquisition(
    ref_size: usize,
    msi_size: usize,
    angle_deg: f64,
    shift: (f64, f64),
) -> Acquisition {
    let phantom = Phantom::for_size(ref_size);
    let center = Vector2::new((ref_size - 1) as f64 / 2.0, (ref_size - 1) as f64 / 2.0);
    let truth = RigidTransform::new(
        angle_deg.to_radians(),
        Vector2::new(shift.0, shift.1),
        center,
    );
    let inverse = truth.inverse();
    let scale = ref_size as f64 / msi_size as f64;
    let mut noise = Lcg::new(17);

    let mut images = vec![ImageF32::new(msi_size, msi_size); MZS.len()];
    let mut tissue_msi = Vec::with_capacity(msi_size * msi_size);
    for v in 0..msi_size {
        for u in 0..msi_size {
            // MSI pixel centre in resized (reference-sized) coordinates
            let q = Vector2::new((u as f64 + 0.5) * scale - 0.5, (v as f64 + 0.5) * scale - 0.5);
            let p = inverse.apply(q);
            let ions = phantom.ions(p.x, p.y, 0.6 * noise.next_f32());
            tissue_msi.push(ions[0] > 0.0);
            for (img, value) in images.iter_mut().zip(ions) {
                img.set(u, v, value);
            }
        }
    }
    Acquisition {
        cube: MsiCube::from_ion_images(MZS.to_vec(), &images).expect("equal image sizes"),
        reference: phantom.reference(ref_size, ref_size),
        truth,
        phantom,
        tissue_msi,
    }
}

/// Pixel spectra on a regular m/z axis with a Gaussian peak per ion whose
/// apex equals the cube intensity.
pub fn spectra_from_cube(cube: &MsiCube, step: f64) -> Vec<PixelSpectrum> {
    let lo = cube.mzs()[0] - 10.0;
    let hi = cube.mzs()[cube.n_mz() - 1] + 10.0;
    let n = ((hi - lo) / step).round() as usize + 1;
    let axis: Vec<f64> = (0..n).map(|i| lo + i as f64 * step).collect();
    let sigma = 2.0 * step;

    let mut pixels = Vec::with_capacity(cube.pixel_count());
    for y in 0..cube.height() {
        for x in 0..cube.width() {
            let spectrum = cube.spectrum_at(x, y);
            let intensities: Vec<f64> = axis
                .iter()
                .map(|&mz| {
                    cube.mzs()
                        .iter()
                        .zip(spectrum)
                        .map(|(&center, &amp)| {
                            amp as f64 * (-(mz - center).powi(2) / (2.0 * sigma * sigma)).exp()
                        })
                        .sum::<f64>()
                })
                .collect();
            pixels.push(PixelSpectrum {
                x,
                y,
                spectrum: Spectrum::new(axis.clone(), intensities).expect("matching lengths"),
            });
        }
    }
    pixels
}
