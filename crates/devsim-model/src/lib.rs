//! Simulated Device Configuration Model
//!
//! This crate describes what a simulated instrument produces, independent of
//! how the simulation runs. It includes:
//!
//! - **AttributeSimSpec**: waveform rule for one continuously updating attribute
//! - **CommandResponseSpec**: response rules for one named command
//! - **SimulationConfig**: the validated, read-only set of both
//! - **document**: loader for the JSON simulation document format
//!
//! # Example
//!
//! ```rust
//! use devsim_model::document::load_document;
//!
//! let config = load_document(r#"{
//!     "attributes": {
//!         "Temperature": {"waveForm": "sine", "minValue": "-10", "maxValue": "55",
//!                         "value": 25, "skipSteps": 3, "timeLag": 100}
//!     },
//!     "commands": {
//!         "ON": [{"RES_ON": [{"parameterName": "msg", "value": "0", "minValue": "0",
//!                             "maxValue": "0", "allowedValues": "0,"}]}]
//!     }
//! }"#).unwrap();
//!
//! assert_eq!(config.attributes().len(), 1);
//! assert!(config.command("ON").is_some());
//! ```

pub mod attribute;
pub mod config;
pub mod document;
pub mod error;
pub mod response;

pub use attribute::{AttributeSimSpec, WaveformKind};
pub use config::SimulationConfig;
pub use error::{SimError, SinkError};
pub use response::{CommandResponseSpec, ParameterRule, ResponseCaseGroup};
