//! Forward propagation from emitters to receivers
//!
//! Straight-line time of flight with `1/d` attenuation. Every emitter's
//! waveform is shifted by its quantized delay and added into each receiver,
//! so contributions from several emitters superpose linearly.

use crate::error::{BeamformError, Result, check_speed_of_sound};
use crate::parallel::parallel_for_each_mut;
use crate::time_axis::{TimeAxis, constants::SPEED_OF_SOUND_WATER};
use crate::transducer::{Emitter, Receiver, SignalSink, SignalSource};
use std::sync::Arc;
use std::time::Instant;

/// Propagates emitter waveforms into a set of receivers.
///
/// [`run`](Self::run) consumes the simulator and hands the receivers back.
/// Accumulation is additive, so feeding the returned receivers into a second
/// simulator adds the arrivals again; call [`Receiver::reset`] first if that
/// is not intended.
#[derive(Debug)]
pub struct ForwardSimulator<'a> {
    emitters: &'a [Emitter],
    receivers: Vec<Receiver>,
    time_axis: Arc<TimeAxis>,
    speed_of_sound: f64,
}

impl<'a> ForwardSimulator<'a> {
    /// Create a simulator using the speed of sound in water
    pub fn new(
        emitters: &'a [Emitter],
        receivers: Vec<Receiver>,
        time_axis: Arc<TimeAxis>,
    ) -> Self {
        Self {
            emitters,
            receivers,
            time_axis,
            speed_of_sound: SPEED_OF_SOUND_WATER,
        }
    }

    /// Override the speed of sound (m/s)
    pub fn with_speed_of_sound(mut self, speed_of_sound: f64) -> Self {
        self.speed_of_sound = speed_of_sound;
        self
    }

    /// Speed of sound used for delays
    pub fn speed_of_sound(&self) -> f64 {
        self.speed_of_sound
    }

    fn validate(&self) -> Result<()> {
        if self.emitters.is_empty() {
            return Err(BeamformError::EmptyCollection { what: "emitters" });
        }
        if self.receivers.is_empty() {
            return Err(BeamformError::EmptyCollection { what: "receivers" });
        }
        check_speed_of_sound(self.speed_of_sound)?;

        let n = self.time_axis.len();
        for (e, emitter) in self.emitters.iter().enumerate() {
            emitter.transducer().check_position("emitter", e)?;
            emitter.transducer().check_len(n)?;
        }
        for (r, receiver) in self.receivers.iter().enumerate() {
            receiver.transducer().check_position("receiver", r)?;
            receiver.transducer().check_len(n)?;
        }
        Ok(())
    }

    /// Propagate every emitter into every receiver and return the receivers.
    ///
    /// For each pair the delay is `floor((d / c) / step)` samples and sample
    /// `i` of the emitter lands on sample `i + delay` of the receiver divided
    /// by `d`. Arrivals past the end of the axis are dropped. A co-located
    /// pair fails the whole run with [`BeamformError::DegenerateEmitterReceiver`].
    pub fn run(mut self) -> Result<Vec<Receiver>> {
        self.validate()?;

        let start = Instant::now();
        let emitters = self.emitters;
        let time_axis = Arc::clone(&self.time_axis);
        let step = time_axis.step();
        let speed_of_sound = self.speed_of_sound;

        log::info!(
            "[forward] {} emitters x {} receivers over {} samples (step {:.3e} s, c = {} m/s)",
            emitters.len(),
            self.receivers.len(),
            time_axis.len(),
            step,
            speed_of_sound
        );

        parallel_for_each_mut(&mut self.receivers, |r, receiver| {
            for (e, emitter) in emitters.iter().enumerate() {
                let distance = emitter.position().distance_to(&receiver.position());
                if distance == 0.0 {
                    return Err(BeamformError::DegenerateEmitterReceiver {
                        emitter: e,
                        emitter_name: emitter.name().to_string(),
                        receiver: r,
                        receiver_name: receiver.name().to_string(),
                    });
                }

                let delay = time_axis.delay_for(distance, speed_of_sound);
                log::debug!(
                    "[forward] emitter {} -> receiver {}: d = {:.6}, delay = {} samples",
                    e,
                    r,
                    distance,
                    delay
                );
                receiver.accumulate_delayed(emitter.emitted(), delay, distance);
            }
            Ok(())
        })?;

        log::info!("[forward] done in {:.2?}", start.elapsed());
        Ok(self.receivers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const STEP: f64 = 1e-5;

    fn axis(n: usize) -> Arc<TimeAxis> {
        Arc::new(TimeAxis::uniform(0.0, STEP, n).unwrap())
    }

    fn pulse_emitter(x: f64, y: f64, time_axis: &Arc<TimeAxis>) -> Emitter {
        let mut emitter = Emitter::new(x, y, Arc::clone(time_axis));
        emitter.generate_signal(5e3, 3.0, 1.0).unwrap();
        emitter
    }

    #[test]
    fn test_onset_and_attenuation() {
        let time_axis = axis(2000);
        let emitters = vec![pulse_emitter(0.0, 0.0, &time_axis)];
        let receivers = vec![Receiver::new(10.0, 0.0, Arc::clone(&time_axis))];

        let receivers = ForwardSimulator::new(&emitters, receivers, Arc::clone(&time_axis))
            .run()
            .unwrap();

        let delay = ((10.0 / 1500.0) / STEP) as usize;
        assert_eq!(delay, 666);

        let received = receivers[0].signal();
        let emitted = emitters[0].signal();
        assert!(received.iter().take(delay).all(|&v| v == 0.0));
        for i in 0..(2000 - delay) {
            assert_abs_diff_eq!(received[i + delay], emitted[i] / 10.0, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_superposition_is_additive() {
        let time_axis = axis(1500);
        let a = pulse_emitter(0.0, 0.0, &time_axis);
        let b = pulse_emitter(3.0, 4.0, &time_axis);
        let fresh = || vec![Receiver::new(7.0, -2.0, Arc::clone(&time_axis))];

        let both = vec![a.clone(), b.clone()];
        let only_a = vec![a];
        let only_b = vec![b];

        let combined = ForwardSimulator::new(&both, fresh(), Arc::clone(&time_axis))
            .run()
            .unwrap();
        let from_a = ForwardSimulator::new(&only_a, fresh(), Arc::clone(&time_axis))
            .run()
            .unwrap();
        let from_b = ForwardSimulator::new(&only_b, fresh(), Arc::clone(&time_axis))
            .run()
            .unwrap();

        for i in 0..time_axis.len() {
            let sum = from_a[0].signal()[i] + from_b[0].signal()[i];
            assert_abs_diff_eq!(combined[0].signal()[i], sum, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_out_of_range_delay_leaves_receiver_silent() {
        let time_axis = axis(100);
        let emitters = vec![pulse_emitter(0.0, 0.0, &time_axis)];
        // 100 samples at 1e-5 s cover 1.5 m of travel
        let receivers = vec![Receiver::new(2.0, 0.0, Arc::clone(&time_axis))];

        let receivers = ForwardSimulator::new(&emitters, receivers, time_axis)
            .run()
            .unwrap();
        assert!(receivers[0].signal().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_colocated_pair_is_degenerate() {
        let time_axis = axis(50);
        let emitters = vec![pulse_emitter(1.0, 1.0, &time_axis).with_name("tx")];
        let receivers = vec![
            Receiver::new(5.0, 1.0, Arc::clone(&time_axis)),
            Receiver::new(1.0, 1.0, Arc::clone(&time_axis)).with_name("rx"),
        ];

        let err = ForwardSimulator::new(&emitters, receivers, time_axis)
            .run()
            .unwrap_err();
        assert!(err.is_degenerate_geometry());
        match err {
            BeamformError::DegenerateEmitterReceiver {
                receiver,
                receiver_name,
                emitter_name,
                ..
            } => {
                assert_eq!(receiver, 1);
                assert_eq!(receiver_name, "rx");
                assert_eq!(emitter_name, "tx");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_finite_position_is_rejected() {
        let time_axis = axis(50);
        let emitters = vec![pulse_emitter(0.0, 0.0, &time_axis)];
        let receivers = vec![
            Receiver::new(1.0, 0.0, Arc::clone(&time_axis)),
            Receiver::new(f64::NAN, 0.0, Arc::clone(&time_axis)).with_name("lost"),
        ];

        let err = ForwardSimulator::new(&emitters, receivers, Arc::clone(&time_axis))
            .run()
            .unwrap_err();
        assert!(err.is_invalid_input());
        match err {
            BeamformError::InvalidPosition { role, index, name, .. } => {
                assert_eq!(role, "receiver");
                assert_eq!(index, 1);
                assert_eq!(name, "lost");
            }
            other => panic!("unexpected error: {other}"),
        }

        let emitters = vec![pulse_emitter(0.0, f64::INFINITY, &time_axis)];
        let receivers = vec![Receiver::new(1.0, 0.0, Arc::clone(&time_axis))];
        let err = ForwardSimulator::new(&emitters, receivers, time_axis)
            .run()
            .unwrap_err();
        assert!(matches!(err, BeamformError::InvalidPosition { role: "emitter", index: 0, .. }));
    }

    #[test]
    fn test_empty_inputs_are_rejected() {
        let time_axis = axis(50);
        let emitters = vec![pulse_emitter(0.0, 0.0, &time_axis)];

        let err = ForwardSimulator::new(&emitters, vec![], Arc::clone(&time_axis))
            .run()
            .unwrap_err();
        assert!(err.is_invalid_input());

        let receivers = vec![Receiver::new(1.0, 0.0, Arc::clone(&time_axis))];
        let err = ForwardSimulator::new(&[], receivers, time_axis)
            .run()
            .unwrap_err();
        assert!(matches!(err, BeamformError::EmptyCollection { what: "emitters" }));
    }

    #[test]
    fn test_mismatched_axis_is_rejected() {
        let long = axis(80);
        let short = axis(40);
        let emitters = vec![pulse_emitter(0.0, 0.0, &long)];
        let receivers = vec![Receiver::new(1.0, 0.0, Arc::clone(&short))];

        let err = ForwardSimulator::new(&emitters, receivers, long)
            .run()
            .unwrap_err();
        assert!(matches!(err, BeamformError::TimeAxisMismatch { expected: 80, actual: 40, .. }));
    }

    #[test]
    fn test_invalid_speed_of_sound() {
        let time_axis = axis(50);
        let emitters = vec![pulse_emitter(0.0, 0.0, &time_axis)];
        let receivers = vec![Receiver::new(1.0, 0.0, Arc::clone(&time_axis))];

        let err = ForwardSimulator::new(&emitters, receivers, time_axis)
            .with_speed_of_sound(-343.0)
            .run()
            .unwrap_err();
        assert!(matches!(err, BeamformError::InvalidSpeedOfSound { .. }));
    }

    #[test]
    fn test_second_run_accumulates_again() {
        let time_axis = axis(400);
        let emitters = vec![pulse_emitter(0.0, 0.0, &time_axis)];
        let receivers = vec![Receiver::new(1.0, 0.0, Arc::clone(&time_axis))];

        let once = ForwardSimulator::new(&emitters, receivers, Arc::clone(&time_axis))
            .run()
            .unwrap();
        let first = once[0].signal().to_owned();
        let twice = ForwardSimulator::new(&emitters, once, Arc::clone(&time_axis))
            .run()
            .unwrap();

        for (a, b) in first.iter().zip(twice[0].signal().iter()) {
            assert_abs_diff_eq!(*b, 2.0 * a, epsilon = 1e-15);
        }

        let mut reset = twice;
        reset[0].reset();
        let again = ForwardSimulator::new(&emitters, reset, time_axis).run().unwrap();
        assert_eq!(again[0].signal(), first.view());
    }
}
