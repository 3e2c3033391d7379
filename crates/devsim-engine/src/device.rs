//! Simulated device
//!
//! Wires one configuration to an attribute store, a waveform generator and a
//! command resolver, standing in for the device a control framework would
//! host.

use std::sync::Arc;

use devsim_model::{SimError, SimulationConfig};
use tracing::{info, warn};

use crate::generator::{GeneratorHandle, TaskExit, WaveformGenerator};
use crate::resolver::{CommandInvoker, CommandResolver};
use crate::sink::{AttributeReading, AttributeStore};

/// A simulated instrument with live attributes and scripted command responses
pub struct SimulatedDevice {
    config: Arc<SimulationConfig>,
    store: Arc<AttributeStore>,
    resolver: CommandResolver,
    generator: Option<GeneratorHandle>,
}

impl SimulatedDevice {
    pub fn new(config: SimulationConfig) -> Self {
        let config = Arc::new(config);
        let resolver = CommandResolver::new(config.clone());
        Self::with_resolver(config, resolver)
    }

    /// Create a device whose rule-driven responses are reproducible
    pub fn with_seed(config: SimulationConfig, seed: u64) -> Self {
        let config = Arc::new(config);
        let resolver = CommandResolver::with_seed(config.clone(), seed);
        Self::with_resolver(config, resolver)
    }

    fn with_resolver(config: Arc<SimulationConfig>, resolver: CommandResolver) -> Self {
        Self {
            store: Arc::new(AttributeStore::from_config(&config)),
            config,
            resolver,
            generator: None,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Store receiving generated values
    pub fn store(&self) -> &Arc<AttributeStore> {
        &self.store
    }

    /// Start generating attribute values
    ///
    /// Must be called from within a tokio runtime. Starting a running device
    /// has no effect.
    pub fn start(&mut self) {
        if self.generator.is_some() {
            warn!("Device already running");
            return;
        }
        info!(
            "Starting simulated device with {} attributes",
            self.config.attributes().len()
        );
        let generator = WaveformGenerator::new(self.config.clone(), self.store.clone());
        self.generator = Some(generator.start());
    }

    pub fn is_running(&self) -> bool {
        self.generator.is_some()
    }

    pub fn read_attribute(&self, name: &str) -> Option<AttributeReading> {
        self.store.read(name)
    }

    pub fn attribute_names(&self) -> Vec<&str> {
        self.config
            .attributes()
            .iter()
            .map(|a| a.name.as_str())
            .collect()
    }

    pub fn command_names(&self) -> Vec<&str> {
        self.config.command_names().collect()
    }

    /// Stop every generator task and report how each one ended
    pub async fn shutdown(&mut self) -> Vec<TaskExit> {
        let Some(generator) = self.generator.take() else {
            return Vec::new();
        };
        let exits = generator.shutdown().await;
        info!("Simulated device stopped");
        exits
    }
}

impl CommandInvoker for SimulatedDevice {
    fn invoke(&self, command: &str, payload: &str) -> Result<String, SimError> {
        self.resolver.invoke(command, payload)
    }
}
