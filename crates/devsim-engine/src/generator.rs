//! Attribute waveform generator
//!
//! Runs one independent task per configured attribute. Each tick the task
//! computes the attribute's next value, writes it to the sink, advances its
//! phase counter and sleeps for the tick interval. Tasks share nothing but
//! the read-only configuration and the sink:
//! - a sink failure ends only the task that saw it
//! - one shutdown signal stops every task, observed at least once per tick
//!
//! A task stalls for as long as a sink write blocks; cancellation is only
//! observed between writes.

use std::sync::Arc;

use devsim_model::{AttributeSimSpec, SimError, SimulationConfig};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::sink::AttributeSink;
use crate::waveform::{sample, PhaseCounter};

/// Why an attribute task stopped
#[derive(Debug, Clone, PartialEq)]
pub struct TaskExit {
    pub attribute: String,
    pub reason: SimError,
}

/// Spawns waveform tasks for every attribute in a configuration
pub struct WaveformGenerator {
    config: Arc<SimulationConfig>,
    sink: Arc<dyn AttributeSink>,
}

impl WaveformGenerator {
    pub fn new(config: Arc<SimulationConfig>, sink: Arc<dyn AttributeSink>) -> Self {
        Self { config, sink }
    }

    /// Spawn one task per attribute on the current tokio runtime
    ///
    /// Must be called from within a runtime context.
    pub fn start(&self) -> GeneratorHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let tasks = self
            .config
            .attributes()
            .iter()
            .map(|spec| {
                let task = tokio::spawn(run_attribute_task(
                    spec.clone(),
                    self.sink.clone(),
                    shutdown_rx.clone(),
                ));
                (spec.name.clone(), task)
            })
            .collect();

        GeneratorHandle { shutdown_tx, tasks }
    }
}

/// Handle to a running set of attribute tasks
///
/// Dropping the handle cancels every task.
pub struct GeneratorHandle {
    shutdown_tx: watch::Sender<bool>,
    tasks: Vec<(String, JoinHandle<SimError>)>,
}

impl GeneratorHandle {
    /// Signal every task to stop
    pub fn cancel(&self) {
        self.shutdown_tx.send_replace(true);
    }

    /// Names of the attributes this handle drives
    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.tasks.iter().map(|(name, _)| name.as_str())
    }

    /// Whether the task for `attribute` has stopped, or `None` if unknown
    pub fn is_finished(&self, attribute: &str) -> Option<bool> {
        self.tasks
            .iter()
            .find(|(name, _)| name == attribute)
            .map(|(_, task)| task.is_finished())
    }

    /// Wait for every task to stop and collect their exit reasons
    ///
    /// Does not cancel: healthy tasks keep running, so pair this with
    /// [`cancel`](Self::cancel) or use [`shutdown`](Self::shutdown).
    pub async fn join(mut self) -> Vec<TaskExit> {
        let tasks = std::mem::take(&mut self.tasks);
        let mut exits = Vec::with_capacity(tasks.len());
        for (attribute, task) in tasks {
            let reason = match task.await {
                Ok(reason) => reason,
                Err(e) => {
                    warn!("Attribute task for {} did not complete: {}", attribute, e);
                    SimError::Canceled
                }
            };
            exits.push(TaskExit { attribute, reason });
        }
        exits
    }

    /// Cancel every task and wait for them to stop
    pub async fn shutdown(self) -> Vec<TaskExit> {
        self.cancel();
        self.join().await
    }
}

impl Drop for GeneratorHandle {
    fn drop(&mut self) {
        self.shutdown_tx.send_replace(true);
    }
}

/// Run the tick loop for one attribute until cancellation or sink failure
///
/// Returns the reason the task stopped: [`SimError::Canceled`] or
/// [`SimError::Sink`].
pub async fn run_attribute_task(
    spec: AttributeSimSpec,
    sink: Arc<dyn AttributeSink>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> SimError {
    let mut counter = PhaseCounter::new(spec.step_increment);
    let tick = spec.tick_interval();

    info!(
        "Starting {} generator for {} (tick {}ms, step {})",
        spec.waveform, spec.name, spec.tick_interval_ms, spec.step_increment
    );

    let reason = loop {
        if *shutdown_rx.borrow() {
            break SimError::Canceled;
        }

        let value = sample(&spec, counter.phase());
        debug!("{} phase {} -> {}", spec.name, counter.phase(), value);

        if let Err(e) = sink.write(&spec.name, value) {
            warn!("Write to {} failed, stopping its generator: {}", spec.name, e);
            break SimError::Sink(e);
        }
        counter.advance();

        tokio::select! {
            _ = tokio::time::sleep(tick) => {}
            // A closed channel means the handle is gone
            _ = shutdown_rx.changed() => {
                break SimError::Canceled;
            }
        }
    };

    info!("Generator for {} stopped: {}", spec.name, reason);
    reason
}
