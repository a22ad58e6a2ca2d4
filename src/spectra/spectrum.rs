use crate::error::FusionError;
use serde::{Deserialize, Serialize};

/// A centroid or profile spectrum with parallel m/z and intensity arrays.
///
/// Deserialization goes through [`Spectrum::new`], so both arrays always
/// have the same length.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SpectrumArrays")]
pub struct Spectrum {
    pub mz: Vec<f64>,
    pub intensities: Vec<f64>,
}

#[derive(Deserialize)]
struct SpectrumArrays {
    mz: Vec<f64>,
    intensities: Vec<f64>,
}

impl TryFrom<SpectrumArrays> for Spectrum {
    type Error = FusionError;

    fn try_from(raw: SpectrumArrays) -> Result<Self, Self::Error> {
        Spectrum::new(raw.mz, raw.intensities)
    }
}

impl Spectrum {
    pub fn new(mz: Vec<f64>, intensities: Vec<f64>) -> Result<Self, FusionError> {
        if mz.len() != intensities.len() {
            return Err(FusionError::ShapeMismatch {
                what: "spectrum intensities",
                expected: mz.len(),
                found: intensities.len(),
            });
        }
        Ok(Self { mz, intensities })
    }

    pub fn len(&self) -> usize {
        self.mz.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mz.is_empty()
    }

    /// Total ion count.
    pub fn tic(&self) -> f64 {
        self.intensities.iter().sum()
    }
}

/// Spectrum acquired at a pixel of the imaging grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PixelSpectrum {
    pub x: usize,
    pub y: usize,
    #[serde(flatten)]
    pub spectrum: Spectrum,
}

/// Mass tolerance used when grouping peaks across spectra.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "value", rename_all = "lowercase")]
pub enum MzTolerance {
    /// Absolute window in Daltons.
    Da(f64),
    /// Relative window in parts per million of the m/z.
    Ppm(f64),
}

impl Default for MzTolerance {
    fn default() -> Self {
        MzTolerance::Da(0.05)
    }
}

impl MzTolerance {
    /// Half-width of the tolerance window around `mz`. Never negative.
    pub fn window(&self, mz: f64) -> f64 {
        match *self {
            MzTolerance::Da(da) => da.max(0.0),
            MzTolerance::Ppm(ppm) => (mz.abs() * ppm * 1e-6).max(0.0),
        }
    }

    pub fn contains(&self, reference: f64, mz: f64) -> bool {
        (mz - reference).abs() <= self.window(reference)
    }
}

/// Mean spectrum of spectra sharing one m/z axis (the axis of the first one).
pub fn spectra_mean(spectra: &[Spectrum]) -> Result<Spectrum, FusionError> {
    let mut acc = reduce_spectra(spectra, |acc, v| *acc += v)?;
    let n = spectra.len() as f64;
    acc.intensities.iter_mut().for_each(|v| *v /= n);
    Ok(acc)
}

/// Per-m/z maximum over spectra sharing one m/z axis.
pub fn spectra_max(spectra: &[Spectrum]) -> Result<Spectrum, FusionError> {
    reduce_spectra(spectra, |acc, v| *acc = acc.max(v))
}

fn reduce_spectra(
    spectra: &[Spectrum],
    combine: impl Fn(&mut f64, f64),
) -> Result<Spectrum, FusionError> {
    let first = spectra
        .first()
        .ok_or(FusionError::EmptyInput { what: "spectra" })?;
    let mut out = first.clone();
    for s in &spectra[1..] {
        if s.len() != out.len() {
            return Err(FusionError::ShapeMismatch {
                what: "shared m/z axis",
                expected: out.len(),
                found: s.len(),
            });
        }
        for (acc, &v) in out.intensities.iter_mut().zip(&s.intensities) {
            combine(acc, v);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(values: &[f64]) -> Spectrum {
        let mz = (0..values.len()).map(|i| 100.0 + i as f64).collect();
        Spectrum::new(mz, values.to_vec()).unwrap()
    }

    #[test]
    fn deserialization_rejects_mismatched_arrays() {
        let bad = r#"{"x":0,"y":1,"mz":[100.0,101.0,102.0],"intensities":[1.0,2.0,3.0,4.0,5.0]}"#;
        let err = serde_json::from_str::<PixelSpectrum>(bad).unwrap_err();
        assert!(err.to_string().contains("spectrum intensities"), "{err}");

        let good = r#"{"x":2,"y":1,"mz":[100.0,101.0],"intensities":[1.0,2.0]}"#;
        let pixel: PixelSpectrum = serde_json::from_str(good).unwrap();
        assert_eq!((pixel.x, pixel.y), (2, 1));
        assert_eq!(pixel.spectrum.len(), 2);
    }

    #[test]
    fn mean_and_max_over_shared_axis() {
        let spectra = [spec(&[1.0, 4.0, 0.0]), spec(&[3.0, 2.0, 6.0])];
        assert_eq!(spectra_mean(&spectra).unwrap().intensities, vec![2.0, 3.0, 3.0]);
        assert_eq!(spectra_max(&spectra).unwrap().intensities, vec![3.0, 4.0, 6.0]);
    }

    #[test]
    fn mismatched_axis_is_rejected() {
        let spectra = [spec(&[1.0, 2.0]), spec(&[1.0])];
        assert!(matches!(
            spectra_mean(&spectra),
            Err(FusionError::ShapeMismatch { expected: 2, found: 1, .. })
        ));
        assert!(spectra_max(&[]).is_err());
    }

    #[test]
    fn ppm_window_scales_with_mass() {
        let tol = MzTolerance::Ppm(10.0);
        assert!((tol.window(1000.0) - 0.01).abs() < 1e-12);
        assert!(tol.contains(1000.0, 1000.009));
        assert!(!tol.contains(1000.0, 1000.02));
        assert_eq!(MzTolerance::Da(-1.0).window(500.0), 0.0);
    }
}
