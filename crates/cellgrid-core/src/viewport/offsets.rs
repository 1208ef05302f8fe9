//! Lazily measured prefix sums over variable item sizes.
//!
//! Items are measured in index order the first time something at or past
//! them is asked for, so a 1000-row grid scrolled to the top measures only
//! the first screenful. `invalidate_from(i)` forgets item `i` and everything
//! after it; earlier measurements stay valid because offsets only depend on
//! the items before them.

use std::cmp::Ordering;

#[derive(Clone, Debug)]
pub struct OffsetCache {
    count: usize,
    estimated_size: f32,
    /// `offsets[i]` is where item `i` starts.
    offsets: Vec<f32>,
    sizes: Vec<f32>,
}

impl OffsetCache {
    pub fn new(count: usize, estimated_size: f32) -> Self {
        OffsetCache {
            count,
            estimated_size,
            offsets: Vec::new(),
            sizes: Vec::new(),
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Index of the last measured item.
    pub fn last_measured(&self) -> Option<usize> {
        self.sizes.len().checked_sub(1)
    }

    fn measured_end(&self) -> f32 {
        match (self.offsets.last(), self.sizes.last()) {
            (Some(offset), Some(size)) => offset + size,
            _ => 0.0,
        }
    }

    fn measure_next<F: FnMut(usize) -> f32>(&mut self, size_of: &mut F) {
        let index = self.sizes.len();
        let offset = self.measured_end();
        let size = size_of(index).max(0.0);
        self.offsets.push(offset);
        self.sizes.push(size);
    }

    fn measure_through<F: FnMut(usize) -> f32>(&mut self, index: usize, size_of: &mut F) {
        let last = index.min(self.count.saturating_sub(1));
        while self.sizes.len() <= last && self.sizes.len() < self.count {
            self.measure_next(size_of);
        }
    }

    /// Start of item `index`; `index == count` gives the end of the last item.
    pub fn offset_of<F: FnMut(usize) -> f32>(&mut self, index: usize, mut size_of: F) -> f32 {
        if self.count == 0 || index == 0 {
            return 0.0;
        }
        if index >= self.count {
            self.measure_through(self.count - 1, &mut size_of);
            return self.measured_end();
        }
        self.measure_through(index, &mut size_of);
        self.offsets[index]
    }

    pub fn size_of<F: FnMut(usize) -> f32>(&mut self, index: usize, mut size_of: F) -> f32 {
        if index >= self.count {
            return 0.0;
        }
        self.measure_through(index, &mut size_of);
        self.sizes[index]
    }

    /// Item containing `offset`, clamped to `[0, count - 1]`.
    pub fn index_at<F: FnMut(usize) -> f32>(&mut self, offset: f32, mut size_of: F) -> usize {
        if self.count == 0 || offset <= 0.0 {
            return 0;
        }
        while self.measured_end() <= offset && self.sizes.len() < self.count {
            self.measure_next(&mut size_of);
        }
        match self
            .offsets
            .binary_search_by(|pos| pos.partial_cmp(&offset).unwrap_or(Ordering::Equal))
        {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        }
        .min(self.count - 1)
    }

    /// Measured extent plus an estimate for items not measured yet.
    pub fn total_size(&self) -> f32 {
        let unmeasured = self.count - self.sizes.len();
        self.measured_end() + unmeasured as f32 * self.estimated_size
    }

    /// Forget measurements for `index` and everything after it.
    pub fn invalidate_from(&mut self, index: usize) {
        self.offsets.truncate(index);
        self.sizes.truncate(index);
    }
}
