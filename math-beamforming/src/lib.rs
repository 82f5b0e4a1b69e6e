//! Time-domain acoustic propagation and delay-and-sum beamforming
//!
//! This crate simulates point emitters radiating sinusoidal bursts to point
//! receivers in a 2D plane, then reconstructs where the sound came from.
//!
//! # Features
//!
//! - **Transducers**: emitters and receivers sharing one uniform time axis
//! - **Forward model**: straight-line time of flight, `1/d` attenuation,
//!   linear superposition
//! - **Beamformer**: per-grid-point delay alignment and summation into a
//!   `[y][x][t]` field
//! - **Configuration**: JSON scenarios and JSON output for plotting
//!
//! Both the forward model and the beamformer quantize delays through
//! [`delay_in_samples`], truncating toward zero.
//!
//! # Example
//!
//! ```rust
//! use math_audio_beamforming::{Beamformer, Emitter, ForwardSimulator, Receiver, SamplingGrid, TimeAxis};
//! use std::sync::Arc;
//!
//! let axis = Arc::new(TimeAxis::uniform(0.0, 1e-7, 600).unwrap());
//!
//! let mut source = Emitter::new(0.0, 0.02, Arc::clone(&axis));
//! source.generate_signal(5e5, 3.0, 1.0).unwrap();
//! let emitters = vec![source];
//!
//! let receivers = (0..4)
//!     .map(|i| Receiver::new(-0.015 + 0.01 * i as f64, 0.0, Arc::clone(&axis)))
//!     .collect();
//! let recorded = ForwardSimulator::new(&emitters, receivers, Arc::clone(&axis))
//!     .run()
//!     .unwrap();
//!
//! let grid = SamplingGrid::linear(-0.01, 0.01, 5, 0.01, 0.03, 5).unwrap();
//! let field = Beamformer::new(&recorded, grid, axis).generate_field().unwrap();
//! assert_eq!(field.shape(), (5, 5, 600));
//! ```

pub mod beamformer;
pub mod config;
pub mod error;
pub mod field;
pub mod output;
pub mod parallel;
pub mod simulator;
pub mod time_axis;
pub mod transducer;

// Re-export main types at crate root
pub use beamformer::{Beamformer, SamplingGrid};
pub use config::{Scenario, ScenarioConfig};
pub use error::{BeamformError, Result};
pub use field::{Field, PeakLocation};
pub use output::{PeakImage, create_output_json};
pub use simulator::ForwardSimulator;
pub use time_axis::{TimeAxis, constants, delay_in_samples, lin_space};
pub use transducer::{Emitter, Point2D, Receiver, SignalSink, SignalSource, Transducer};

/// Library version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
