//! Simulated and replay sample sources.
//!
//! The simulated source stands in for the browser game's camera pipeline:
//! it models a child tracking a moving stimulus, with gaze jitter, drifting
//! attention, and affect driven by engagement. Useful for demos and for
//! exercising the full session lifecycle without a detector.

use crate::source::types::{Affect, BehavioralSample};
use crate::source::{SampleSource, SourceError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// How often the simulated stimulus jumps to a new position, in samples.
const STIMULUS_PERIOD: u64 = 20;

/// A deterministic (seeded) simulation of a screening session.
pub struct SimulatedSource {
    rng: StdRng,
    step_ms: u64,
    clock_ms: u64,
    target_x: f64,
    target_y: f64,
    attention: f64,
    engagement: f64,
    emit_detector_confidence: bool,
    acquired: bool,
    samples_produced: u64,
}

impl SimulatedSource {
    /// Create a simulation advancing `step_ms` per sample.
    pub fn new(seed: u64, step_ms: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            step_ms: step_ms.max(1),
            clock_ms: 0,
            target_x: 0.5,
            target_y: 0.5,
            attention: 0.7,
            engagement: 0.5,
            emit_detector_confidence: true,
            acquired: false,
            samples_produced: 0,
        }
    }

    /// Disable detector-confidence emission, emulating a session where the
    /// face-region heuristic never locked on.
    pub fn without_detector(mut self) -> Self {
        self.emit_detector_confidence = false;
        self
    }

    fn advance(&mut self) -> BehavioralSample {
        // Stimulus jumps periodically; gaze follows it with jitter that
        // widens as attention drops.
        if self.samples_produced % STIMULUS_PERIOD == 0 {
            self.target_x = self.rng.gen_range(0.1..0.9);
            self.target_y = self.rng.gen_range(0.1..0.9);
        }

        let jitter = 0.02 + (1.0 - self.attention) * 0.15;
        let gaze_x = (self.target_x + self.rng.gen_range(-jitter..jitter)).clamp(0.0, 1.0);
        let gaze_y = (self.target_y + self.rng.gen_range(-jitter..jitter)).clamp(0.0, 1.0);

        // Attention random walk, bounded.
        self.attention = (self.attention + self.rng.gen_range(-0.05..0.05)).clamp(0.1, 1.0);

        // Engagement trends up while attention holds, down otherwise.
        let drift = if self.attention > 0.5 { 0.02 } else { -0.03 };
        self.engagement = (self.engagement + drift + self.rng.gen_range(-0.02..0.02))
            .clamp(0.0, 1.0);

        let affect = if self.engagement > 0.6 {
            Affect::Positive
        } else if self.engagement < 0.25 {
            Affect::Negative
        } else {
            Affect::Neutral
        };

        let smile = match affect {
            Affect::Positive => self.rng.gen_range(0.4..0.9),
            Affect::Neutral => self.rng.gen_range(0.0..0.3),
            Affect::Negative => 0.0,
        };
        let frown = match affect {
            Affect::Negative => self.rng.gen_range(0.3..0.7),
            _ => self.rng.gen_range(0.0..0.15),
        };

        self.clock_ms += self.step_ms;
        self.samples_produced += 1;

        let mut sample = BehavioralSample::new(self.clock_ms, gaze_x, gaze_y, self.attention)
            .with_affect(affect)
            .with_expression(smile, frown);

        if self.emit_detector_confidence {
            let pose = self.rng.gen_range(0.5..0.95);
            let face = self.rng.gen_range(0.6..0.98);
            sample = sample.with_detector_confidence(pose, face);
        }

        sample
    }
}

impl SampleSource for SimulatedSource {
    fn acquire(&mut self) -> Result<(), SourceError> {
        self.acquired = true;
        Ok(())
    }

    fn next_sample(&mut self) -> Result<BehavioralSample, SourceError> {
        if !self.acquired {
            return Err(SourceError::Acquisition("source not acquired".to_string()));
        }
        Ok(self.advance())
    }

    fn release(&mut self) {
        self.acquired = false;
    }
}

/// Plays back a recorded sample list, one sample per tick.
///
/// Yields [`SourceError::NoSample`] once exhausted, which the session
/// treats as an idle tick.
pub struct ReplaySource {
    samples: Vec<BehavioralSample>,
    cursor: usize,
    acquired: bool,
    fail_acquisition: bool,
}

impl ReplaySource {
    pub fn new(samples: Vec<BehavioralSample>) -> Self {
        Self {
            samples,
            cursor: 0,
            acquired: false,
            fail_acquisition: false,
        }
    }

    /// Make `acquire` fail, for exercising the acquisition-failure path.
    pub fn failing_acquisition() -> Self {
        Self {
            samples: Vec::new(),
            cursor: 0,
            acquired: false,
            fail_acquisition: true,
        }
    }

    /// How many samples remain to be replayed.
    pub fn remaining(&self) -> usize {
        self.samples.len() - self.cursor
    }
}

impl SampleSource for ReplaySource {
    fn acquire(&mut self) -> Result<(), SourceError> {
        if self.fail_acquisition {
            return Err(SourceError::Acquisition(
                "replay configured to fail".to_string(),
            ));
        }
        self.acquired = true;
        Ok(())
    }

    fn next_sample(&mut self) -> Result<BehavioralSample, SourceError> {
        if !self.acquired {
            return Err(SourceError::Acquisition("source not acquired".to_string()));
        }
        match self.samples.get(self.cursor) {
            Some(sample) => {
                self.cursor += 1;
                Ok(sample.clone())
            }
            None => Err(SourceError::NoSample),
        }
    }

    fn release(&mut self) {
        self.acquired = false;
    }
}
