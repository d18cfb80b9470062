//! Downsampled dot-density grid and histogram-equalized luminance
//! rendering.
//!
//! Grounded on `DotGrid.cpp`/`DotGrid.h`.

use crate::dotstore::DotStore;
use crate::error::{Error, Result};

/// A rectangular grid of match-density counts, one cell per downsampled
/// pixel. Grounded on `DotGrid`.
#[derive(Clone)]
pub struct DotGrid {
    width: usize,
    height: usize,
    data: Vec<i64>,
}

impl DotGrid {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn point(&self, x: usize, y: usize) -> i64 {
        self.data[y * self.width + x]
    }

    fn set_point(&mut self, x: usize, y: usize, value: i64) {
        self.data[y * self.width + x] = value;
    }

    pub fn max(&self) -> i64 {
        self.data.iter().copied().max().unwrap_or(0)
    }

    pub fn min(&self) -> i64 {
        self.data.iter().copied().min().unwrap_or(0)
    }

    /// Downsamples `source` over the window `[x1, y1) .. (x2, y2)`,
    /// dividing it into a `(x2-x1)/scale` by `(y2-y1)/scale` grid and
    /// filling each cell with `DotStore::count_area_matches`. Grounded on
    /// `DotGrid::CalculateGrid`.
    pub fn calculate(
        source: &DotStore,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        scale: f64,
        window: f64,
    ) -> Result<DotGrid> {
        if x2 <= x1 || y2 <= y1 {
            return Err(Error::InvalidParameter("grid window must have positive size"));
        }
        if scale <= 0.0 {
            return Err(Error::InvalidParameter("scale must be positive"));
        }
        let index = source.index().ok_or(Error::IndexRequired)?;

        let numx = ((x2 - x1) / scale) as usize;
        let numy = ((y2 - y1) / scale) as usize;

        let mut grid = DotGrid { width: numx, height: numy, data: vec![0; numx * numy] };

        for y in 0..numy {
            for x in 0..numx {
                let cx1 = x as f64 * scale + x1;
                let cy1 = y as f64 * scale + y1;
                let cx2 = (x + 1) as f64 * scale + x1;
                let cy2 = (y + 1) as f64 * scale + y1;
                grid.set_point(x, y, index.count_area_matches(cx1, cy1, cx2, cy2, window));
            }
        }

        Ok(grid)
    }

    /// Adds another grid of identical dimensions in place. Grounded on
    /// `DotGrid::AddInplace`, used to combine forward and reverse-complement
    /// plots.
    pub fn add_in_place(&mut self, other: &DotGrid) -> Result<()> {
        if self.width != other.width || self.height != other.height {
            return Err(Error::InvalidParameter("grid dimensions must match"));
        }
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a += b;
        }
        Ok(())
    }

    /// Flips the grid upside down in place. Grounded on
    /// `DotGrid::FlipInplace`.
    pub fn flip_in_place(&mut self) {
        for y in 0..self.height / 2 {
            for x in 0..self.width {
                self.data.swap(y * self.width + x, (self.height - 1 - y) * self.width + x);
            }
        }
    }

    /// Cumulative histogram of cell values, indexed `0..=max`. Grounded on
    /// `DotGrid::CalculateHistogram`.
    pub fn histogram(&self) -> Vec<i64> {
        let max = self.max();
        let mut histogram = vec![0i64; max as usize + 1];
        for &value in &self.data {
            histogram[value as usize] += 1;
        }
        for i in 1..histogram.len() {
            histogram[i] += histogram[i - 1];
        }
        histogram
    }

    /// Renders the grid to 8-bit luminance via histogram equalization.
    /// Grounded on `DotGrid::ToString`, formula preserved exactly:
    ///
    /// ```text
    /// out = 255 - 255 * numpixels * (hist[v] - hist[0]) / ((numpixels - hist[0]) * numpixels)
    /// ```
    pub fn to_luminance(&self) -> Vec<u8> {
        let histogram = self.histogram();
        let numpixels = (self.width * self.height) as f64;
        let hist0 = histogram[0] as f64;

        self.data
            .iter()
            .map(|&value| {
                let h = histogram[value as usize] as f64;
                let scaled = 255.0 - 255.0 * numpixels * (h - hist0) / ((numpixels - hist0) * numpixels);
                scaled.round().clamp(0.0, 255.0) as u8
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabet;
    use crate::compare::compare;

    #[test]
    fn calculate_requires_an_index() {
        let store = DotStore::new();
        let result = DotGrid::calculate(&store, 0.0, 0.0, 10.0, 10.0, 1.0, 0.0);
        assert!(matches!(result, Err(Error::IndexRequired)));
    }

    #[test]
    fn flip_in_place_reverses_rows() {
        let seq = b"ACGTACGTACGTACGTACGT";
        let alpha = Alphabet::dna();
        let mut store = compare(seq, seq, 2, 4, 0, 2, &alpha).unwrap();
        store.create_index();
        let mut grid = DotGrid::calculate(&store, 0.0, 0.0, seq.len() as f64, seq.len() as f64, 2.0, 0.0).unwrap();
        let before: Vec<i64> = grid.data.clone();
        grid.flip_in_place();
        grid.flip_in_place();
        assert_eq!(grid.data, before);
    }

    #[test]
    fn add_in_place_sums_matching_grids() {
        let seq = b"ACGTACGTACGTACGTACGT";
        let alpha = Alphabet::dna();
        let mut store = compare(seq, seq, 2, 4, 0, 2, &alpha).unwrap();
        store.create_index();
        let grid_a = DotGrid::calculate(&store, 0.0, 0.0, seq.len() as f64, seq.len() as f64, 2.0, 0.0).unwrap();
        let mut grid_b = DotGrid::calculate(&store, 0.0, 0.0, seq.len() as f64, seq.len() as f64, 2.0, 0.0).unwrap();

        let before_b: Vec<i64> = grid_b.data.clone();
        grid_b.add_in_place(&grid_a).unwrap();
        for ((&sum, &a), &b) in grid_b.data.iter().zip(grid_a.data.iter()).zip(before_b.iter()) {
            assert_eq!(sum, a + b);
        }
    }

    #[test]
    fn luminance_is_bounded_and_monotone_in_histogram_rank() {
        let seq = b"ACGTACGTACGTACGTACGTACGTACGT";
        let alpha = Alphabet::dna();
        let mut store = compare(seq, seq, 2, 4, 0, 2, &alpha).unwrap();
        store.create_index();
        let grid = DotGrid::calculate(&store, 0.0, 0.0, seq.len() as f64, seq.len() as f64, 4.0, 0.0).unwrap();
        let luminance = grid.to_luminance();
        assert_eq!(luminance.len(), grid.width() * grid.height());
        // cells with no matches at all (density 0) render pure white.
        for (value, lum) in grid.data.iter().zip(luminance.iter()) {
            if *value == 0 {
                assert_eq!(*lum, 255);
            }
        }
        // denser cells never render lighter than sparser ones.
        let max_value = grid.max();
        let lum_at_max = grid
            .data
            .iter()
            .zip(luminance.iter())
            .find(|(v, _)| **v == max_value)
            .map(|(_, l)| *l)
            .unwrap();
        for lum in &luminance {
            assert!(*lum >= lum_at_max);
        }
    }
}
