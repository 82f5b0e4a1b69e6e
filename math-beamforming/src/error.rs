//! Error types for propagation and beamforming runs.
//!
//! Invalid inputs are rejected before any sample loop starts; degenerate
//! geometry is reported with the entities that triggered it.

use thiserror::Error;

/// Errors that can occur while building or running a simulation.
#[derive(Debug, Error)]
pub enum BeamformError {
    /// Time axis is too short, non-finite or not strictly increasing.
    #[error("invalid time axis: {reason}")]
    InvalidTimeAxis {
        /// What is wrong with the axis
        reason: String,
    },

    /// A required collection (emitters, receivers, grid axis) is empty.
    #[error("empty {what}: at least one entry is required")]
    EmptyCollection {
        /// Name of the empty collection
        what: &'static str,
    },

    /// Waveform parameter out of range.
    #[error("invalid waveform {parameter}: {value} (must be {requirement})")]
    InvalidWaveform {
        /// Parameter name (center_frequency, n_cycles, amplitude)
        parameter: &'static str,
        /// The rejected value
        value: f64,
        /// Accepted range
        requirement: &'static str,
    },

    /// Speed of sound must be finite and positive.
    #[error("invalid speed of sound: {value} (must be finite and > 0)")]
    InvalidSpeedOfSound {
        /// The rejected value
        value: f64,
    },

    /// Sampling grid specification is unusable.
    #[error("invalid sampling grid: {reason}")]
    InvalidGrid {
        /// What is wrong with the grid
        reason: String,
    },

    /// A transducer buffer does not line up with the run's time axis.
    #[error("transducer '{name}' has {actual} samples, time axis has {expected}")]
    TimeAxisMismatch {
        /// Transducer label
        name: String,
        /// Samples on the time axis
        expected: usize,
        /// Samples in the transducer buffer
        actual: usize,
    },

    /// A transducer sits at a non-finite position.
    #[error("{role} #{index} '{name}' has a non-finite position ({x}, {y})")]
    InvalidPosition {
        /// "emitter" or "receiver"
        role: &'static str,
        /// Index in its collection
        index: usize,
        /// Transducer label
        name: String,
        /// x-coordinate
        x: f64,
        /// y-coordinate
        y: f64,
    },

    /// Emitter and receiver share a position, so 1/d is undefined.
    #[error(
        "degenerate geometry: emitter #{emitter} '{emitter_name}' and receiver #{receiver} '{receiver_name}' are co-located"
    )]
    DegenerateEmitterReceiver {
        /// Emitter index
        emitter: usize,
        /// Emitter label
        emitter_name: String,
        /// Receiver index
        receiver: usize,
        /// Receiver label
        receiver_name: String,
    },

    /// A grid point coincides with a receiver.
    #[error(
        "degenerate geometry: grid point [{row}][{col}] at ({x}, {y}) coincides with receiver #{receiver}"
    )]
    DegenerateGridPoint {
        /// Row (y) index
        row: usize,
        /// Column (x) index
        col: usize,
        /// Grid x coordinate
        x: f64,
        /// Grid y coordinate
        y: f64,
        /// Receiver index
        receiver: usize,
    },

    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized `Result` type for beamforming operations.
pub type Result<T> = std::result::Result<T, BeamformError>;

impl BeamformError {
    /// Returns `true` for precondition violations detected before a run.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            BeamformError::InvalidTimeAxis { .. }
                | BeamformError::EmptyCollection { .. }
                | BeamformError::InvalidWaveform { .. }
                | BeamformError::InvalidSpeedOfSound { .. }
                | BeamformError::InvalidGrid { .. }
                | BeamformError::TimeAxisMismatch { .. }
                | BeamformError::InvalidPosition { .. }
        )
    }

    /// Returns `true` when a zero distance made the run impossible.
    pub fn is_degenerate_geometry(&self) -> bool {
        matches!(
            self,
            BeamformError::DegenerateEmitterReceiver { .. }
                | BeamformError::DegenerateGridPoint { .. }
        )
    }
}

/// Reject a non-finite or non-positive speed of sound.
pub(crate) fn check_speed_of_sound(value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(BeamformError::InvalidSpeedOfSound { value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BeamformError::InvalidWaveform {
            parameter: "center_frequency",
            value: -1.0,
            requirement: "finite and > 0",
        };
        assert_eq!(
            err.to_string(),
            "invalid waveform center_frequency: -1 (must be finite and > 0)"
        );
    }

    #[test]
    fn test_degenerate_display_names_pair() {
        let err = BeamformError::DegenerateEmitterReceiver {
            emitter: 0,
            emitter_name: "tx".to_string(),
            receiver: 3,
            receiver_name: "rx3".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'tx'"));
        assert!(msg.contains("#3"));
    }

    #[test]
    fn test_classification() {
        let empty = BeamformError::EmptyCollection { what: "receivers" };
        let grid = BeamformError::DegenerateGridPoint {
            row: 1,
            col: 2,
            x: 0.0,
            y: 0.0,
            receiver: 0,
        };

        assert!(empty.is_invalid_input());
        assert!(!empty.is_degenerate_geometry());
        assert!(grid.is_degenerate_geometry());
        assert!(
            BeamformError::InvalidPosition {
                role: "receiver",
                index: 0,
                name: String::new(),
                x: f64::NAN,
                y: 0.0,
            }
            .is_invalid_input()
        );
        assert!(!grid.is_invalid_input());
    }

    #[test]
    fn test_check_speed_of_sound() {
        assert!(check_speed_of_sound(1500.0).is_ok());
        assert!(check_speed_of_sound(0.0).is_err());
        assert!(check_speed_of_sound(f64::NAN).is_err());
    }
}
