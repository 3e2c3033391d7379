//! Waveform evaluation for a single attribute
//!
//! The phase argument is `2π / i` where `i` is the running phase counter, so
//! the oscillation period shrinks as the counter grows and the argument
//! converges toward zero. At `i = 0` that argument is undefined; the first
//! tick reports `min_value` instead of evaluating it.

use std::f64::consts::TAU;

use devsim_model::AttributeSimSpec;

/// Value of `spec` at phase counter `phase`
pub fn sample(spec: &AttributeSimSpec, phase: u64) -> f64 {
    if phase == 0 {
        return spec.min_value;
    }
    let x = TAU / phase as f64;
    spec.amplitude() * spec.waveform.eval(x) + spec.min_value
}

/// Per-task phase counter
///
/// Owned by exactly one generator task; advances by the step increment each
/// tick and is never reset while the task runs.
#[derive(Debug, Clone)]
pub struct PhaseCounter {
    phase: u64,
    step: u64,
}

impl PhaseCounter {
    pub fn new(step: u64) -> Self {
        Self { phase: 0, step }
    }

    pub fn phase(&self) -> u64 {
        self.phase
    }

    pub fn advance(&mut self) {
        self.phase = self.phase.saturating_add(self.step);
    }
}
