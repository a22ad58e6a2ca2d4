/// Running statistics of a region grown pixel by pixel.
pub(crate) struct RegionAccumulator {
    pub indices: Vec<usize>,
    pub sum: f64,
    pub sum_sq: f64,
    pub sum_x: f64,
    pub sum_y: f64,
}

impl RegionAccumulator {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            indices: Vec::with_capacity(capacity),
            sum: 0.0,
            sum_sq: 0.0,
            sum_x: 0.0,
            sum_y: 0.0,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.indices.clear();
        self.sum = 0.0;
        self.sum_sq = 0.0;
        self.sum_x = 0.0;
        self.sum_y = 0.0;
    }

    pub(crate) fn push(&mut self, idx: usize, x: usize, y: usize, value: f32) {
        self.indices.push(idx);
        let v = value as f64;
        self.sum += v;
        self.sum_sq += v * v;
        self.sum_x += x as f64;
        self.sum_y += y as f64;
    }

    pub(crate) fn len(&self) -> usize {
        self.indices.len()
    }

    pub(crate) fn mean(&self) -> f64 {
        if self.indices.is_empty() {
            0.0
        } else {
            self.sum / self.indices.len() as f64
        }
    }

    /// Population standard deviation of the accumulated intensities.
    pub(crate) fn std(&self) -> f64 {
        if self.indices.is_empty() {
            return 0.0;
        }
        let n = self.indices.len() as f64;
        let mean = self.sum / n;
        (self.sum_sq / n - mean * mean).max(0.0).sqrt()
    }

    pub(crate) fn centroid(&self) -> [f64; 2] {
        if self.indices.is_empty() {
            [0.0, 0.0]
        } else {
            let n = self.indices.len() as f64;
            [self.sum_x / n, self.sum_y / n]
        }
    }

    /// Mark all pixels of the current region with the provided state.
    pub(crate) fn mark_as(&self, used: &mut [u8], state: u8) {
        for &idx in &self.indices {
            used[idx] = state;
        }
    }
}
