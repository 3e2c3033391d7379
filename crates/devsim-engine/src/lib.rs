//! Simulated Device Engine
//!
//! This crate drives a simulated instrument from a [`SimulationConfig`]:
//!
//! - **WaveformGenerator**: one periodic task per attribute, pushing values
//!   into an [`AttributeSink`]
//! - **CommandResolver**: synthesizes command responses, either from a fixed
//!   override in the payload or from the configured response rules
//! - **SimulatedDevice**: ties both to an in-memory [`AttributeStore`]
//!
//! # Example
//!
//! ```rust
//! use devsim_engine::{CommandInvoker, SimulatedDevice};
//! use devsim_model::document::load_document;
//!
//! let config = load_document(r#"{"commands": {"SENDCMD": []}}"#).unwrap();
//! let device = SimulatedDevice::new(config);
//!
//! let response = device
//!     .invoke("ON", r#"{"fixedResponse": {"Response": "RES_ON", "msg": 0}}"#)
//!     .unwrap();
//! assert_eq!(response, "RES_ON:-msg:0||");
//! assert_eq!(device.invoke("SENDCMD", "").unwrap(), "RESPONSE RECEIVED FOR SENDCMD");
//! ```
//!
//! [`SimulationConfig`]: devsim_model::SimulationConfig

pub mod device;
pub mod generator;
pub mod resolver;
pub mod sink;
pub mod waveform;

pub use device::SimulatedDevice;
pub use generator::{run_attribute_task, GeneratorHandle, TaskExit, WaveformGenerator};
pub use resolver::{CommandInvoker, CommandResolver};
pub use sink::{AttributeReading, AttributeSink, AttributeStore, AttributeUpdate};
