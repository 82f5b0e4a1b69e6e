//! Delay-and-sum beamforming over a 2D sampling grid
//!
//! For each grid point every receiver trace is advanced by its own travel
//! time to that point, weighted by `d_r / N` and summed. The summed trace is
//! then re-referenced to the closest receiver so that a source located at the
//! grid point lines up at its emission time.
//!
//! Each receiver trace is read through an extended buffer of `n` leading zeros
//! followed by the `n` recorded samples; the zeros stand in for the time
//! before the axis starts so that a shift never indexes out of bounds.

use crate::error::{BeamformError, Result, check_speed_of_sound};
use crate::field::Field;
use crate::parallel::{is_parallel_available, parallel_map_indexed};
use crate::time_axis::{TimeAxis, constants::SPEED_OF_SOUND_WATER, lin_space};
use crate::transducer::{Point2D, Receiver};
use ndarray::{Array1, Array3, s};
use std::sync::Arc;
use std::time::Instant;

/// Coordinates at which the field is evaluated
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingGrid {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl SamplingGrid {
    /// Grid from explicit coordinate lists; spacing need not be uniform
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        if x.is_empty() {
            return Err(BeamformError::EmptyCollection { what: "grid x axis" });
        }
        if y.is_empty() {
            return Err(BeamformError::EmptyCollection { what: "grid y axis" });
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(BeamformError::InvalidGrid {
                reason: "coordinates must be finite".to_string(),
            });
        }
        Ok(Self { x, y })
    }

    /// Uniform grid with `nx` columns over `[x_min, x_max]` and `ny` rows over `[y_min, y_max]`
    pub fn linear(
        x_min: f64,
        x_max: f64,
        nx: usize,
        y_min: f64,
        y_max: f64,
        ny: usize,
    ) -> Result<Self> {
        if nx == 0 || ny == 0 {
            return Err(BeamformError::InvalidGrid {
                reason: format!("grid needs at least one point per axis, got {} x {}", nx, ny),
            });
        }
        Self::new(lin_space(x_min, x_max, nx), lin_space(y_min, y_max, ny))
    }

    /// Column coordinates
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Row coordinates
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// `(rows, cols)`
    pub fn dim(&self) -> (usize, usize) {
        (self.y.len(), self.x.len())
    }
}

/// Delay-and-sum reconstruction from a set of recorded receivers
#[derive(Debug)]
pub struct Beamformer<'a> {
    receivers: &'a [Receiver],
    grid: SamplingGrid,
    time_axis: Arc<TimeAxis>,
    speed_of_sound: f64,
}

impl<'a> Beamformer<'a> {
    /// Create a beamformer using the speed of sound in water
    pub fn new(receivers: &'a [Receiver], grid: SamplingGrid, time_axis: Arc<TimeAxis>) -> Self {
        Self {
            receivers,
            grid,
            time_axis,
            speed_of_sound: SPEED_OF_SOUND_WATER,
        }
    }

    /// Override the speed of sound (m/s)
    pub fn with_speed_of_sound(mut self, speed_of_sound: f64) -> Self {
        self.speed_of_sound = speed_of_sound;
        self
    }

    /// The sampling grid
    pub fn grid(&self) -> &SamplingGrid {
        &self.grid
    }

    fn validate(&self) -> Result<()> {
        if self.receivers.is_empty() {
            return Err(BeamformError::EmptyCollection { what: "receivers" });
        }
        check_speed_of_sound(self.speed_of_sound)?;
        let n = self.time_axis.len();
        for (r, receiver) in self.receivers.iter().enumerate() {
            receiver.transducer().check_position("receiver", r)?;
            receiver.transducer().check_len(n)?;
        }
        Ok(())
    }

    /// Reconstruct the field over the whole grid.
    ///
    /// Rows are evaluated in parallel; the receiver sum inside a grid point
    /// always runs in receiver order. A grid point that coincides with a
    /// receiver fails the run with [`BeamformError::DegenerateGridPoint`].
    pub fn generate_field(&self) -> Result<Field> {
        self.validate()?;

        let start = Instant::now();
        let n = self.time_axis.len();
        let (ny, nx) = self.grid.dim();

        log::info!(
            "[beamform] {} receivers on a {} x {} grid, {} samples per trace (parallel rows: {})",
            self.receivers.len(),
            ny,
            nx,
            n,
            is_parallel_available()
        );

        let extended: Vec<Array1<f64>> = self
            .receivers
            .iter()
            .map(|receiver| {
                let mut buffer = Array1::<f64>::zeros(2 * n);
                buffer.slice_mut(s![n..]).assign(&receiver.signal());
                buffer
            })
            .collect();

        let rows = parallel_map_indexed(ny, |row| -> Result<Vec<Array1<f64>>> {
            let y = self.grid.y[row];
            self.grid
                .x
                .iter()
                .enumerate()
                .map(|(col, &x)| self.trace_at(&extended, row, col, Point2D::new(x, y)))
                .collect()
        });

        let mut data = Array3::<f64>::zeros((ny, nx, n));
        for (row, traces) in rows.into_iter().enumerate() {
            for (col, trace) in traces?.into_iter().enumerate() {
                data.slice_mut(s![row, col, ..]).assign(&trace);
            }
        }

        log::info!("[beamform] done in {:.2?}", start.elapsed());
        Ok(Field::new(self.grid.x.clone(), self.grid.y.clone(), data))
    }

    /// Delay, weight and sum every receiver for one grid point
    fn trace_at(
        &self,
        extended: &[Array1<f64>],
        row: usize,
        col: usize,
        point: Point2D,
    ) -> Result<Array1<f64>> {
        let n = self.time_axis.len();
        let weight_count = self.receivers.len() as f64;

        let mut distances = Vec::with_capacity(self.receivers.len());
        for (r, receiver) in self.receivers.iter().enumerate() {
            let distance = receiver.position().distance_to(&point);
            if distance == 0.0 {
                return Err(BeamformError::DegenerateGridPoint {
                    row,
                    col,
                    x: point.x,
                    y: point.y,
                    receiver: r,
                });
            }
            distances.push(distance);
        }

        let min_distance = distances.iter().copied().fold(f64::INFINITY, f64::min);
        let min_delay = self.time_axis.delay_for(min_distance, self.speed_of_sound);

        let mut sum = Array1::<f64>::zeros(2 * n);
        for (buffer, &distance) in extended.iter().zip(&distances) {
            let delay = self.time_axis.delay_for(distance, self.speed_of_sound);
            let count = (2 * n).saturating_sub(delay);
            for k in 0..count {
                sum[k] += buffer[k + delay] * distance / weight_count;
            }
        }

        // window of n samples starting at n - min_delay; anything before the
        // start of the sum buffer reads as zero
        Ok(Array1::from_shape_fn(n, |t| {
            (n + t).checked_sub(min_delay).map_or(0.0, |j| sum[j])
        }))
    }
}
