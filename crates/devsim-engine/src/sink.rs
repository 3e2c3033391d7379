//! Attribute sinks
//!
//! An [`AttributeSink`] receives every value a generator task computes. The
//! generator takes no locks around a write; a sink that needs serialization
//! provides it itself. A write that blocks stalls the owning task until it
//! returns, so sinks should not block indefinitely.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Instant;

use devsim_model::{SimulationConfig, SinkError};
use tokio::sync::broadcast;

/// Capacity of the update broadcast channel
const UPDATE_CHANNEL_CAPACITY: usize = 256;

/// Destination for simulated attribute values
pub trait AttributeSink: Send + Sync {
    /// Store the latest value for `attribute`
    fn write(&self, attribute: &str, value: f64) -> Result<(), SinkError>;
}

/// Latest known value of an attribute
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttributeReading {
    pub value: f64,
    /// When the value was last written (or the store was created)
    pub updated_at: Instant,
    /// Number of writes received so far
    pub writes: u64,
}

/// Update event emitted on every successful write
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeUpdate {
    pub attribute: String,
    pub value: f64,
}

/// In-memory sink holding the latest reading of each configured attribute
///
/// Readings start at each attribute's start value. Writes to names that were
/// not configured are rejected.
#[derive(Debug)]
pub struct AttributeStore {
    readings: RwLock<HashMap<String, AttributeReading>>,
    updates_tx: broadcast::Sender<AttributeUpdate>,
}

impl AttributeStore {
    /// Create a store seeded with the start values from `config`
    pub fn from_config(config: &SimulationConfig) -> Self {
        let now = Instant::now();
        let readings = config
            .attributes()
            .iter()
            .map(|attr| {
                (
                    attr.name.clone(),
                    AttributeReading {
                        value: attr.start_value,
                        updated_at: now,
                        writes: 0,
                    },
                )
            })
            .collect();
        let (updates_tx, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            readings: RwLock::new(readings),
            updates_tx,
        }
    }

    /// Latest reading for `attribute`
    pub fn read(&self, attribute: &str) -> Option<AttributeReading> {
        let readings = self.readings.read().unwrap_or_else(|e| e.into_inner());
        readings.get(attribute).copied()
    }

    /// Names of all attributes held by the store
    pub fn names(&self) -> Vec<String> {
        let readings = self.readings.read().unwrap_or_else(|e| e.into_inner());
        let mut names: Vec<String> = readings.keys().cloned().collect();
        names.sort();
        names
    }

    /// Subscribe to update events
    pub fn subscribe(&self) -> broadcast::Receiver<AttributeUpdate> {
        self.updates_tx.subscribe()
    }
}

impl AttributeSink for AttributeStore {
    fn write(&self, attribute: &str, value: f64) -> Result<(), SinkError> {
        {
            let mut readings = self.readings.write().unwrap_or_else(|e| e.into_inner());
            let Some(reading) = readings.get_mut(attribute) else {
                return Err(SinkError::new(attribute, "unknown attribute"));
            };
            reading.value = value;
            reading.updated_at = Instant::now();
            reading.writes += 1;
        }

        // No subscribers is fine
        let _ = self.updates_tx.send(AttributeUpdate {
            attribute: attribute.to_string(),
            value,
        });
        Ok(())
    }
}
