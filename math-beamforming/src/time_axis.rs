//! Shared time axis and sample-delay quantization
//!
//! Every signal buffer in the crate is indexed parallel to a [`TimeAxis`].
//! The step is always taken as `t[1] - t[0]`; an axis whose spacing drifts
//! from that value is accepted but the delay arithmetic is then undefined.

use crate::error::{BeamformError, Result};

/// Physical constants
pub mod constants {
    /// Speed of sound in water in m/s
    pub const SPEED_OF_SOUND_WATER: f64 = 1500.0;

    /// Relative spacing deviation above which an axis is reported as non-uniform
    pub const UNIFORMITY_TOLERANCE: f64 = 1e-6;
}

/// Convert a propagation distance into a whole number of samples.
///
/// Computes `(distance / speed_of_sound) / step` and truncates toward zero.
/// The division order is part of the contract: forward simulation and
/// beamforming must quantize identically.
#[inline]
pub fn delay_in_samples(distance: f64, speed_of_sound: f64, step: f64) -> usize {
    ((distance / speed_of_sound) / step) as usize
}

/// Generate `num` linearly spaced values from `start` to `end` inclusive
pub fn lin_space(start: f64, end: f64, num: usize) -> Vec<f64> {
    if num < 2 {
        return vec![start];
    }
    (0..num)
        .map(|i| start + (end - start) * i as f64 / (num - 1) as f64)
        .collect()
}

/// Ordered, strictly increasing sample times
#[derive(Debug, Clone, PartialEq)]
pub struct TimeAxis {
    samples: Vec<f64>,
}

impl TimeAxis {
    /// Build an axis from explicit sample times.
    ///
    /// Requires at least two finite, strictly increasing samples. Non-uniform
    /// spacing is logged but not rejected.
    pub fn new(samples: Vec<f64>) -> Result<Self> {
        if samples.len() < 2 {
            return Err(BeamformError::InvalidTimeAxis {
                reason: format!("need at least 2 samples, got {}", samples.len()),
            });
        }
        if let Some(i) = samples.iter().position(|t| !t.is_finite()) {
            return Err(BeamformError::InvalidTimeAxis {
                reason: format!("sample {} is not finite ({})", i, samples[i]),
            });
        }
        if let Some(i) = samples.windows(2).position(|w| w[1] <= w[0]) {
            return Err(BeamformError::InvalidTimeAxis {
                reason: format!(
                    "samples must be strictly increasing: t[{}] = {} >= t[{}] = {}",
                    i,
                    samples[i],
                    i + 1,
                    samples[i + 1]
                ),
            });
        }

        let axis = Self { samples };
        if !axis.is_uniform(constants::UNIFORMITY_TOLERANCE) {
            log::warn!(
                "time axis of {} samples is not uniformly spaced; delays assume step {}",
                axis.len(),
                axis.step()
            );
        }
        Ok(axis)
    }

    /// Build a uniform axis `start + i * step` for `i in 0..num_samples`
    pub fn uniform(start: f64, step: f64, num_samples: usize) -> Result<Self> {
        if !(step.is_finite() && step > 0.0) {
            return Err(BeamformError::InvalidTimeAxis {
                reason: format!("step must be finite and > 0, got {}", step),
            });
        }
        Self::new((0..num_samples).map(|i| start + i as f64 * step).collect())
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always `false`: construction guarantees at least two samples
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Sampling step `t[1] - t[0]`
    pub fn step(&self) -> f64 {
        self.samples[1] - self.samples[0]
    }

    /// Sample time at `index`
    pub fn time(&self, index: usize) -> f64 {
        self.samples[index]
    }

    /// First sample time
    pub fn start(&self) -> f64 {
        self.samples[0]
    }

    /// Last sample time
    pub fn end(&self) -> f64 {
        self.samples[self.samples.len() - 1]
    }

    /// All sample times
    pub fn as_slice(&self) -> &[f64] {
        &self.samples
    }

    /// Whether every interval matches `step()` within a relative tolerance
    pub fn is_uniform(&self, rel_tol: f64) -> bool {
        let step = self.step();
        self.samples
            .windows(2)
            .all(|w| ((w[1] - w[0]) - step).abs() <= rel_tol * step)
    }

    /// Delay in samples for a path of length `distance`
    pub fn delay_for(&self, distance: f64, speed_of_sound: f64) -> usize {
        delay_in_samples(distance, speed_of_sound, self.step())
    }
}
