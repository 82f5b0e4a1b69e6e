//! Point transducers carrying a time-sampled signal
//!
//! [`Emitter`] and [`Receiver`] both wrap a [`Transducer`]: a labelled 2D
//! position plus a buffer parallel to a shared [`TimeAxis`]. Emitters own the
//! waveform they radiate; receivers only ever accumulate into theirs.

use crate::error::{BeamformError, Result};
use crate::time_axis::TimeAxis;
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::sync::Arc;

/// Point in the propagation plane
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Point2D {
    /// x-coordinate
    pub x: f64,
    /// y-coordinate
    pub y: f64,
}

impl Point2D {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Labelled point with a signal buffer aligned to a shared time axis
#[derive(Debug, Clone)]
pub struct Transducer {
    name: String,
    position: Point2D,
    time_axis: Arc<TimeAxis>,
    signal: Array1<f64>,
}

impl Transducer {
    /// Create a transducer with an all-zero buffer
    pub fn new(position: Point2D, time_axis: Arc<TimeAxis>) -> Self {
        let signal = Array1::zeros(time_axis.len());
        Self {
            name: String::new(),
            position,
            time_axis,
            signal,
        }
    }

    /// Set the label
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Label (may be empty)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position in the plane
    pub fn position(&self) -> Point2D {
        self.position
    }

    /// The shared time axis
    pub fn time_axis(&self) -> &Arc<TimeAxis> {
        &self.time_axis
    }

    /// Signal buffer, one value per time sample
    pub fn signal(&self) -> ArrayView1<'_, f64> {
        self.signal.view()
    }

    /// Distance to another transducer
    pub fn distance_to(&self, other: &Transducer) -> f64 {
        self.position.distance_to(&other.position)
    }

    /// Error unless the buffer has exactly `expected` samples
    pub(crate) fn check_len(&self, expected: usize) -> Result<()> {
        if self.signal.len() == expected {
            Ok(())
        } else {
            Err(BeamformError::TimeAxisMismatch {
                name: self.name.clone(),
                expected,
                actual: self.signal.len(),
            })
        }
    }

    /// Error unless both coordinates are finite
    pub(crate) fn check_position(&self, role: &'static str, index: usize) -> Result<()> {
        if self.position.x.is_finite() && self.position.y.is_finite() {
            Ok(())
        } else {
            Err(BeamformError::InvalidPosition {
                role,
                index,
                name: self.name.clone(),
                x: self.position.x,
                y: self.position.y,
            })
        }
    }
}

/// Something that radiates a waveform
pub trait SignalSource {
    /// The radiated waveform
    fn emitted(&self) -> ArrayView1<'_, f64>;
}

/// Something that sums incoming, delayed waveforms
pub trait SignalSink {
    /// Add `samples[i] / distance` into sample `i + delay`.
    ///
    /// Samples that would land past the end of the buffer are dropped.
    fn accumulate_delayed(&mut self, samples: ArrayView1<'_, f64>, delay: usize, distance: f64);
}

/// Point source that synthesizes a windowed sinusoidal burst
#[derive(Debug, Clone)]
pub struct Emitter {
    inner: Transducer,
}

impl Emitter {
    /// Create a silent emitter
    pub fn new(x: f64, y: f64, time_axis: Arc<TimeAxis>) -> Self {
        Self {
            inner: Transducer::new(Point2D::new(x, y), time_axis),
        }
    }

    /// Set the label
    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self {
            inner: self.inner.with_name(name),
        }
    }

    /// Underlying transducer
    pub fn transducer(&self) -> &Transducer {
        &self.inner
    }

    /// Label
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Position in the plane
    pub fn position(&self) -> Point2D {
        self.inner.position
    }

    /// Current waveform
    pub fn signal(&self) -> ArrayView1<'_, f64> {
        self.inner.signal()
    }

    /// Fill the buffer with `n_cycles` periods of a sine at `center_frequency`.
    ///
    /// The burst lasts `n_cycles / center_frequency` seconds and covers
    /// `floor(duration / step)` samples (clamped to the axis length). Sample
    /// `i` is `amplitude * sin(2π f t[i])` using the absolute axis time, so the
    /// burst is phase-locked to `t[0]`. The buffer is zeroed first, so a
    /// shorter second burst does not leave a tail from the previous one.
    pub fn generate_signal(
        &mut self,
        center_frequency: f64,
        n_cycles: f64,
        amplitude: f64,
    ) -> Result<ArrayView1<'_, f64>> {
        if !(center_frequency.is_finite() && center_frequency > 0.0) {
            return Err(BeamformError::InvalidWaveform {
                parameter: "center_frequency",
                value: center_frequency,
                requirement: "finite and > 0",
            });
        }
        if !(n_cycles.is_finite() && n_cycles > 0.0) {
            return Err(BeamformError::InvalidWaveform {
                parameter: "n_cycles",
                value: n_cycles,
                requirement: "finite and > 0",
            });
        }
        if !amplitude.is_finite() {
            return Err(BeamformError::InvalidWaveform {
                parameter: "amplitude",
                value: amplitude,
                requirement: "finite",
            });
        }

        let axis = Arc::clone(&self.inner.time_axis);
        let duration = 1.0 / center_frequency * n_cycles;
        let num_points = ((duration / axis.step()) as usize).min(axis.len());

        let signal = &mut self.inner.signal;
        signal.fill(0.0);
        for (i, value) in signal.iter_mut().take(num_points).enumerate() {
            *value = amplitude * (2.0 * PI * center_frequency * axis.time(i)).sin();
        }

        log::debug!(
            "emitter '{}': {} cycles at {} Hz over {} samples",
            self.inner.name,
            n_cycles,
            center_frequency,
            num_points
        );

        Ok(self.inner.signal())
    }
}

impl SignalSource for Emitter {
    fn emitted(&self) -> ArrayView1<'_, f64> {
        self.inner.signal()
    }
}

/// Point sensor accumulating superposed arrivals
#[derive(Debug, Clone)]
pub struct Receiver {
    inner: Transducer,
}

impl Receiver {
    /// Create a receiver with an empty (all-zero) buffer
    pub fn new(x: f64, y: f64, time_axis: Arc<TimeAxis>) -> Self {
        Self {
            inner: Transducer::new(Point2D::new(x, y), time_axis),
        }
    }

    /// Set the label
    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self {
            inner: self.inner.with_name(name),
        }
    }

    /// Underlying transducer
    pub fn transducer(&self) -> &Transducer {
        &self.inner
    }

    /// Label
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Position in the plane
    pub fn position(&self) -> Point2D {
        self.inner.position
    }

    /// Accumulated signal
    pub fn signal(&self) -> ArrayView1<'_, f64> {
        self.inner.signal()
    }

    /// Zero the buffer so the receiver can take part in a new run
    pub fn reset(&mut self) {
        self.inner.signal.fill(0.0);
    }
}

impl SignalSink for Receiver {
    fn accumulate_delayed(&mut self, samples: ArrayView1<'_, f64>, delay: usize, distance: f64) {
        let len = self.inner.signal.len();
        let count = len.saturating_sub(delay).min(samples.len());
        for i in 0..count {
            self.inner.signal[i + delay] += samples[i] / distance;
        }
    }
}
