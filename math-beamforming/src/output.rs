//! Output JSON formatting for beamforming runs

use crate::config::{MetadataConfig, Scenario};
use crate::field::{Field, PeakLocation};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Peak-amplitude image of a reconstructed field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeakImage {
    /// X coordinates (columns)
    pub x: Vec<f64>,
    /// Y coordinates (rows)
    pub y: Vec<f64>,
    /// Max |value| over time, shape `[y, x]`
    pub amplitude: Array2<f64>,
    /// Strongest grid point
    pub peak: PeakLocation,
}

impl PeakImage {
    /// Collapse the time axis of a field
    pub fn from_field(field: &Field) -> Self {
        Self {
            x: field.x().to_vec(),
            y: field.y().to_vec(),
            amplitude: field.peak_amplitude(),
            peak: field.peak_location(),
        }
    }
}

/// Create output JSON for a finished run
pub fn create_output_json(
    scenario: &Scenario,
    metadata: &MetadataConfig,
    field: &Field,
) -> serde_json::Value {
    let image = PeakImage::from_field(field);
    let (rows, cols, samples) = field.shape();

    serde_json::json!({
        "speed_of_sound": scenario.speed_of_sound,
        "time_axis": {
            "start": scenario.time_axis.start(),
            "step": scenario.time_axis.step(),
            "num_samples": scenario.time_axis.len(),
        },
        "emitters": scenario.emitters.iter().map(|e| {
            serde_json::json!({
                "name": e.name(),
                "position": [e.position().x, e.position().y],
            })
        }).collect::<Vec<_>>(),
        "receivers": scenario.receivers.iter().map(|r| {
            serde_json::json!({
                "name": r.name(),
                "position": [r.position().x, r.position().y],
            })
        }).collect::<Vec<_>>(),
        "field": {
            "shape": [rows, cols, samples],
            "x": image.x,
            "y": image.y,
            "peak_amplitude": image.amplitude.outer_iter().map(|row| row.to_vec()).collect::<Vec<_>>(),
            "peak": image.peak,
        },
        "metadata": {
            "description": metadata.description,
            "author": metadata.author,
            "date": metadata.date,
        },
        "generated_at": chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    })
}
