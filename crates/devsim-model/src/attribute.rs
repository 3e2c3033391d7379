//! Waveform rules for simulated attributes

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::SimError;

/// Shape function used to compute an attribute's next value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaveformKind {
    Sine,
    Cosine,
}

impl WaveformKind {
    /// Evaluate the shape function at `x` radians
    pub fn eval(self, x: f64) -> f64 {
        match self {
            WaveformKind::Sine => x.sin(),
            WaveformKind::Cosine => x.cos(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            WaveformKind::Sine => "sine",
            WaveformKind::Cosine => "cosine",
        }
    }
}

impl fmt::Display for WaveformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WaveformKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sine" => Ok(WaveformKind::Sine),
            "cosine" => Ok(WaveformKind::Cosine),
            other => Err(SimError::Config(format!("unknown waveform kind: {other}"))),
        }
    }
}

/// Waveform rule for one simulated attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeSimSpec {
    /// Attribute name, unique within a configuration
    pub name: String,
    /// Shape function
    pub waveform: WaveformKind,
    /// Lower bound of the configured range
    pub min_value: f64,
    /// Upper bound of the configured range
    pub max_value: f64,
    /// Value the attribute holds before the first tick
    pub start_value: f64,
    /// Phase steps advanced per tick
    pub step_increment: u64,
    /// Delay between ticks in milliseconds
    pub tick_interval_ms: u64,
}

impl AttributeSimSpec {
    /// Amplitude as `|max| - |min|`
    ///
    /// This is not the range width: for ranges straddling zero or lying below
    /// it the amplitude can be small or negative.
    pub fn amplitude(&self) -> f64 {
        self.max_value.abs() - self.min_value.abs()
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Check the invariants a generator task relies on
    pub fn validate(&self) -> Result<(), SimError> {
        if self.name.is_empty() {
            return Err(SimError::Config("attribute name is empty".into()));
        }
        if !self.min_value.is_finite() || !self.max_value.is_finite() {
            return Err(SimError::Config(format!(
                "attribute {}: bounds must be finite",
                self.name
            )));
        }
        if self.max_value < self.min_value {
            return Err(SimError::Config(format!(
                "attribute {}: maxValue {} is below minValue {}",
                self.name, self.max_value, self.min_value
            )));
        }
        // A zero step would pin the phase counter at zero forever
        if self.step_increment == 0 {
            return Err(SimError::Config(format!(
                "attribute {}: step increment must be at least 1",
                self.name
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(SimError::Config(format!(
                "attribute {}: tick interval must be at least 1ms",
                self.name
            )));
        }
        Ok(())
    }
}
