use super::filters::{SeparableFilter, StaticSeparableFilter, GAUSSIAN_5TAP};

use serde::{Deserialize, Serialize};

/// Options controlling pyramid construction.
#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PyramidOptions {
    /// Number of pyramid levels (>= 1).
    pub levels: usize,
    /// Number of initial downscale steps that apply the separable filter
    /// (e.g. `k >= levels` → blur everywhere).
    pub blur_levels: usize,
    /// Levels are not generated once either dimension would drop below this size.
    pub min_size: usize,
    /// Filter used for the separable blur stage.
    #[serde(skip)]
    pub filter: StaticSeparableFilter,
}

impl Default for PyramidOptions {
    fn default() -> Self {
        Self::new(3)
    }
}

impl PyramidOptions {
    pub fn new(levels: usize) -> Self {
        Self {
            levels,
            blur_levels: usize::MAX,
            min_size: 8,
            filter: GAUSSIAN_5TAP,
        }
    }

    pub fn with_min_size(mut self, min_size: usize) -> Self {
        self.min_size = min_size;
        self
    }

    /// Number of levels that can actually be built for a `w × h` input.
    pub fn effective_levels(&self, w: usize, h: usize) -> usize {
        let mut levels = 1;
        let (mut cw, mut ch) = (w, h);
        while levels < self.levels.max(1) {
            let (nw, nh) = (cw.div_ceil(2), ch.div_ceil(2));
            if nw < self.min_size || nh < self.min_size {
                break;
            }
            cw = nw;
            ch = nh;
            levels += 1;
        }
        levels
    }
}

impl std::fmt::Debug for PyramidOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PyramidOptions")
            .field("levels", &self.levels)
            .field("blur_levels", &self.blur_levels)
            .field("min_size", &self.min_size)
            .field("filter_taps", &self.filter.taps().len())
            .finish()
    }
}
