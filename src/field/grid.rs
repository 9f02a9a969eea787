use crate::domain::DistanceBands;

/// Row-major scalar grid; `None` marks a sample outside the boundary
#[derive(Debug, Clone, PartialEq)]
pub struct SampleGrid {
    width: usize,
    height: usize,
    cells: Vec<Option<f64>>,
}

impl SampleGrid {
    /// Wrap `cells` as a `width` x `height` grid.
    ///
    /// # Panics
    /// If `cells.len() != width * height`.
    pub fn new(width: usize, height: usize, cells: Vec<Option<f64>>) -> Self {
        assert_eq!(
            cells.len(),
            width * height,
            "grid cell count must equal width * height"
        );
        Self {
            width,
            height,
            cells,
        }
    }

    /// Build a grid from dense values, treating non-finite values as outside
    pub fn from_values(width: usize, height: usize, values: &[f64]) -> Self {
        let cells = values
            .iter()
            .map(|&v| if v.is_finite() { Some(v) } else { None })
            .collect();
        Self::new(width, height, cells)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Sample at column `x`, row `y`; `None` when outside the boundary or the grid
    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells[y * self.width + x]
    }

    /// Signed-index lookup used by the contour tracer, which walks one cell
    /// past every edge of the grid
    pub(crate) fn get_signed(&self, x: i64, y: i64) -> Option<f64> {
        if x < 0 || y < 0 {
            return None;
        }
        self.get(x as usize, y as usize)
    }

    pub fn cells(&self) -> &[Option<f64>] {
        &self.cells
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.cells.iter().flatten().copied()
    }

    pub fn valid_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Band index per cell, `None` where the cell is outside
    pub fn band_indices(&self, bands: &DistanceBands) -> Vec<Option<usize>> {
        self.cells
            .iter()
            .map(|cell| cell.map(|v| bands.classify(v)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_and_bounds() {
        let grid = SampleGrid::new(2, 2, vec![Some(1.0), None, Some(3.0), Some(4.0)]);
        assert_eq!(grid.get(0, 0), Some(1.0));
        assert_eq!(grid.get(1, 0), None);
        assert_eq!(grid.get(1, 1), Some(4.0));
        assert_eq!(grid.get(2, 0), None);
        assert_eq!(grid.get_signed(-1, 0), None);
        assert_eq!(grid.valid_count(), 3);
    }

    #[test]
    fn test_from_values_maps_non_finite_to_outside() {
        let grid = SampleGrid::from_values(3, 1, &[1.0, f64::NAN, f64::INFINITY]);
        assert_eq!(grid.cells(), &[Some(1.0), None, None]);
    }

    #[test]
    fn test_band_indices() {
        let bands = DistanceBands::from_bounds(&[10.0, 20.0]).unwrap();
        let grid = SampleGrid::new(3, 1, vec![Some(5.0), None, Some(25.0)]);
        assert_eq!(grid.band_indices(&bands), vec![Some(0), None, Some(1)]);
    }

    #[test]
    #[should_panic]
    fn test_size_mismatch_panics() {
        SampleGrid::new(2, 2, vec![None]);
    }
}
