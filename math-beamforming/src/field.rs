//! Reconstructed space-time field

use ndarray::{Array2, Array3, ArrayView1, Axis, s};
use serde::{Deserialize, Serialize};

/// Location of the strongest reconstructed source
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PeakLocation {
    /// Row (y) index
    pub row: usize,
    /// Column (x) index
    pub col: usize,
    /// x coordinate of the grid point
    pub x: f64,
    /// y coordinate of the grid point
    pub y: f64,
    /// Peak absolute amplitude over time at that point
    pub amplitude: f64,
}

/// Field indexed `[y][x][t]`, one reconstructed trace per grid point
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    x: Vec<f64>,
    y: Vec<f64>,
    data: Array3<f64>,
}

impl Field {
    pub(crate) fn new(x: Vec<f64>, y: Vec<f64>, data: Array3<f64>) -> Self {
        debug_assert_eq!(data.dim().0, y.len());
        debug_assert_eq!(data.dim().1, x.len());
        Self { x, y, data }
    }

    /// `(rows, cols, samples)`
    pub fn shape(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Grid x coordinates (columns)
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Grid y coordinates (rows)
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Raw data
    pub fn data(&self) -> &Array3<f64> {
        &self.data
    }

    /// Trace at grid point `[row][col]`
    pub fn trace(&self, row: usize, col: usize) -> ArrayView1<'_, f64> {
        self.data.slice(s![row, col, ..])
    }

    /// Maximum absolute value over time at each grid point
    pub fn peak_amplitude(&self) -> Array2<f64> {
        self.data
            .map_axis(Axis(2), |trace| trace.iter().fold(0.0_f64, |m, v| m.max(v.abs())))
    }

    /// Grid point with the largest peak amplitude; the first one in row-major
    /// order wins ties
    pub fn peak_location(&self) -> PeakLocation {
        let peaks = self.peak_amplitude();
        let mut best = PeakLocation {
            row: 0,
            col: 0,
            x: self.x[0],
            y: self.y[0],
            amplitude: f64::NEG_INFINITY,
        };
        for ((row, col), &amplitude) in peaks.indexed_iter() {
            if amplitude > best.amplitude {
                best = PeakLocation {
                    row,
                    col,
                    x: self.x[col],
                    y: self.y[row],
                    amplitude,
                };
            }
        }
        best
    }

    /// Take the underlying array
    pub fn into_inner(self) -> Array3<f64> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_field() -> Field {
        let mut data = Array3::zeros((2, 3, 4));
        data[[1, 2, 3]] = -5.0;
        data[[0, 1, 0]] = 2.0;
        data[[0, 0, 2]] = 5.0;
        Field::new(vec![-1.0, 0.0, 1.0], vec![10.0, 20.0], data)
    }

    #[test]
    fn test_shape_and_trace() {
        let field = sample_field();
        assert_eq!(field.shape(), (2, 3, 4));
        assert_eq!(field.trace(0, 1).to_vec(), vec![2.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_peak_amplitude_uses_magnitude() {
        let peaks = sample_field().peak_amplitude();
        assert_eq!(peaks.dim(), (2, 3));
        assert_eq!(peaks[[1, 2]], 5.0);
        assert_eq!(peaks[[0, 1]], 2.0);
        assert_eq!(peaks[[1, 0]], 0.0);
    }

    #[test]
    fn test_peak_location_first_wins() {
        let peak = sample_field().peak_location();
        assert_eq!((peak.row, peak.col), (0, 0));
        assert_eq!((peak.x, peak.y), (-1.0, 10.0));
        assert_eq!(peak.amplitude, 5.0);
    }
}
