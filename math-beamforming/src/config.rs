//! JSON configuration for propagation and beamforming scenarios

use crate::beamformer::{Beamformer, SamplingGrid};
use crate::error::{BeamformError, Result, check_speed_of_sound};
use crate::field::Field;
use crate::simulator::ForwardSimulator;
use crate::time_axis::{TimeAxis, constants::SPEED_OF_SOUND_WATER};
use crate::transducer::{Emitter, Receiver};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Complete scenario loaded from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Speed of sound (m/s)
    #[serde(default = "default_speed_of_sound")]
    pub speed_of_sound: f64,
    /// Shared time axis
    pub time_axis: TimeAxisConfig,
    /// Sources
    pub emitters: Vec<EmitterConfig>,
    /// Sensors
    pub receivers: Vec<ReceiverConfig>,
    /// Reconstruction grid
    pub grid: GridConfig,
    /// Scenario metadata
    #[serde(default)]
    pub metadata: MetadataConfig,
}

fn default_speed_of_sound() -> f64 {
    SPEED_OF_SOUND_WATER
}

/// Uniform time axis `start + i * step`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimeAxisConfig {
    /// First sample time (s)
    #[serde(default)]
    pub start: f64,
    /// Sampling step (s)
    pub step: f64,
    /// Number of samples
    pub num_samples: usize,
}

/// Burst radiated by an emitter
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WaveformConfig {
    /// Center frequency (Hz)
    pub center_frequency: f64,
    /// Number of full periods
    pub n_cycles: f64,
    /// Peak amplitude
    #[serde(default = "default_amplitude")]
    pub amplitude: f64,
}

fn default_amplitude() -> f64 {
    1.0
}

/// Emitter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmitterConfig {
    /// Label
    #[serde(default)]
    pub name: String,
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
    /// Radiated burst
    pub waveform: WaveformConfig,
}

/// Receiver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiverConfig {
    /// Label
    #[serde(default)]
    pub name: String,
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

/// Uniform sampling grid
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GridConfig {
    /// Minimum x
    pub x_min: f64,
    /// Maximum x
    pub x_max: f64,
    /// Number of columns
    pub nx: usize,
    /// Minimum y
    pub y_min: f64,
    /// Maximum y
    pub y_max: f64,
    /// Number of rows
    pub ny: usize,
}

impl GridConfig {
    /// Convert to SamplingGrid
    pub fn to_grid(&self) -> Result<SamplingGrid> {
        SamplingGrid::linear(self.x_min, self.x_max, self.nx, self.y_min, self.y_max, self.ny)
    }
}

/// Metadata configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// Scenario description
    #[serde(default)]
    pub description: String,
    /// Author name
    #[serde(default)]
    pub author: String,
    /// Creation date
    #[serde(default)]
    pub date: String,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            description: String::new(),
            author: String::new(),
            date: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

impl Default for ScenarioConfig {
    /// A 500 kHz source under a line array of eight receivers in water
    fn default() -> Self {
        let receivers = (0..8)
            .map(|i| ReceiverConfig {
                name: format!("r{}", i),
                x: -0.035 + 0.01 * i as f64,
                y: 0.0,
            })
            .collect();

        Self {
            speed_of_sound: SPEED_OF_SOUND_WATER,
            time_axis: TimeAxisConfig {
                start: 0.0,
                step: 1e-7,
                num_samples: 1000,
            },
            emitters: vec![EmitterConfig {
                name: "source".to_string(),
                x: 0.0,
                y: 0.03,
                waveform: WaveformConfig {
                    center_frequency: 5e5,
                    n_cycles: 3.0,
                    amplitude: 1.0,
                },
            }],
            receivers,
            grid: GridConfig {
                x_min: -0.02,
                x_max: 0.02,
                nx: 41,
                y_min: 0.01,
                y_max: 0.05,
                ny: 41,
            },
            metadata: MetadataConfig {
                description: "Single source under a line array".to_string(),
                ..MetadataConfig::default()
            },
        }
    }
}

impl ScenarioConfig {
    /// Load configuration from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Save configuration to JSON file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Validate and build the runnable scenario, generating every waveform
    pub fn to_scenario(&self) -> Result<Scenario> {
        check_speed_of_sound(self.speed_of_sound)?;
        if self.emitters.is_empty() {
            return Err(BeamformError::EmptyCollection { what: "emitters" });
        }
        if self.receivers.is_empty() {
            return Err(BeamformError::EmptyCollection { what: "receivers" });
        }

        let time_axis = Arc::new(TimeAxis::uniform(
            self.time_axis.start,
            self.time_axis.step,
            self.time_axis.num_samples,
        )?);

        let emitters = self
            .emitters
            .iter()
            .map(|e| {
                let mut emitter =
                    Emitter::new(e.x, e.y, Arc::clone(&time_axis)).with_name(e.name.clone());
                emitter.generate_signal(
                    e.waveform.center_frequency,
                    e.waveform.n_cycles,
                    e.waveform.amplitude,
                )?;
                Ok(emitter)
            })
            .collect::<Result<Vec<_>>>()?;

        let receivers = self
            .receivers
            .iter()
            .map(|r| Receiver::new(r.x, r.y, Arc::clone(&time_axis)).with_name(r.name.clone()))
            .collect();

        Ok(Scenario {
            time_axis,
            emitters,
            receivers,
            grid: self.grid.to_grid()?,
            speed_of_sound: self.speed_of_sound,
        })
    }
}

/// Ready-to-run scenario: waveforms generated, receivers still silent
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Shared time axis
    pub time_axis: Arc<TimeAxis>,
    /// Emitters with generated waveforms
    pub emitters: Vec<Emitter>,
    /// Fresh receivers
    pub receivers: Vec<Receiver>,
    /// Reconstruction grid
    pub grid: SamplingGrid,
    /// Speed of sound (m/s)
    pub speed_of_sound: f64,
}

impl Scenario {
    /// Forward-simulate into a copy of the receivers
    pub fn simulate(&self) -> Result<Vec<Receiver>> {
        ForwardSimulator::new(&self.emitters, self.receivers.clone(), Arc::clone(&self.time_axis))
            .with_speed_of_sound(self.speed_of_sound)
            .run()
    }

    /// Beamform recorded receivers over the scenario grid
    pub fn reconstruct(&self, recorded: &[Receiver]) -> Result<Field> {
        Beamformer::new(recorded, self.grid.clone(), Arc::clone(&self.time_axis))
            .with_speed_of_sound(self.speed_of_sound)
            .generate_field()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "time_axis": { "step": 1e-6, "num_samples": 64 },
        "emitters": [ { "x": 0.0, "y": 0.0,
                        "waveform": { "center_frequency": 1e5, "n_cycles": 2 } } ],
        "receivers": [ { "name": "a", "x": 0.01, "y": 0.0 } ],
        "grid": { "x_min": -0.01, "x_max": 0.01, "nx": 3, "y_min": 0.005, "y_max": 0.005, "ny": 1 }
    }"#;

    #[test]
    fn test_defaults_are_filled() {
        let config: ScenarioConfig = serde_json::from_str(MINIMAL).unwrap();
        assert_eq!(config.speed_of_sound, 1500.0);
        assert_eq!(config.time_axis.start, 0.0);
        assert_eq!(config.emitters[0].waveform.amplitude, 1.0);
        assert_eq!(config.emitters[0].name, "");
        assert_eq!(config.receivers[0].name, "a");
    }

    #[test]
    fn test_to_scenario_generates_waveforms() {
        let config: ScenarioConfig = serde_json::from_str(MINIMAL).unwrap();
        let scenario = config.to_scenario().unwrap();

        assert_eq!(scenario.time_axis.len(), 64);
        assert_eq!(scenario.grid.dim(), (1, 3));
        assert!(scenario.emitters[0].signal().iter().any(|&v| v != 0.0));
        assert!(scenario.receivers[0].signal().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_to_scenario_rejects_bad_input() {
        let mut config: ScenarioConfig = serde_json::from_str(MINIMAL).unwrap();
        config.receivers.clear();
        assert!(config.to_scenario().unwrap_err().is_invalid_input());

        let mut config: ScenarioConfig = serde_json::from_str(MINIMAL).unwrap();
        config.emitters[0].waveform.center_frequency = 0.0;
        assert!(matches!(
            config.to_scenario().unwrap_err(),
            BeamformError::InvalidWaveform { parameter: "center_frequency", .. }
        ));

        let mut config: ScenarioConfig = serde_json::from_str(MINIMAL).unwrap();
        config.time_axis.num_samples = 1;
        assert!(config.to_scenario().is_err());
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir().join(format!(
            "math-beamforming-config-{}.json",
            std::process::id()
        ));
        let config = ScenarioConfig::default();
        config.to_file(&path).unwrap();
        let loaded = ScenarioConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.receivers.len(), 8);
        assert_eq!(loaded.grid.nx, 41);
        assert_eq!(loaded.metadata.description, config.metadata.description);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ScenarioConfig::from_file("/nonexistent/scenario.json").unwrap_err();
        assert!(matches!(err, BeamformError::Io(_)));
    }

    #[test]
    fn test_default_scenario_runs() {
        let scenario = ScenarioConfig::default().to_scenario().unwrap();
        let recorded = scenario.simulate().unwrap();
        assert!(recorded.iter().all(|r| r.signal().iter().any(|&v| v != 0.0)));
    }
}
