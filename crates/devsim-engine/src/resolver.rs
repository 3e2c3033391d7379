//! Command response resolver
//!
//! Turns a command invocation into a response string. A caller-supplied
//! `fixedResponse` object is echoed back verbatim; otherwise the first
//! response group configured for the command is rendered with a value drawn
//! at random for each parameter. Commands without rules get a generic
//! acknowledgement.

use std::sync::{Arc, Mutex};

use devsim_model::{ParameterRule, ResponseCaseGroup, SimError, SimulationConfig};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Payload key holding a fixed response override
pub const FIXED_RESPONSE_KEY: &str = "fixedResponse";

/// Key of the response label inside a fixed response override
pub const RESPONSE_LABEL_KEY: &str = "Response";

/// Entry point for command invocations from a device framework
pub trait CommandInvoker: Send + Sync {
    /// Execute `command` with a JSON parameter payload and return its response
    fn invoke(&self, command: &str, payload: &str) -> Result<String, SimError>;
}

/// Synthesizes command responses from a simulation configuration
///
/// Calls are independent of each other and may run concurrently. The only
/// shared state is the random source, which is locked for the duration of a
/// single response.
#[derive(Debug)]
pub struct CommandResolver {
    config: Arc<SimulationConfig>,
    rng: Mutex<StdRng>,
}

impl CommandResolver {
    /// Create a resolver with an entropy-seeded random source
    pub fn new(config: Arc<SimulationConfig>) -> Self {
        Self {
            config,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Create a resolver whose random choices are reproducible
    pub fn with_seed(config: Arc<SimulationConfig>, seed: u64) -> Self {
        Self {
            config,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Produce the response for `command` given its parameter payload
    ///
    /// An empty payload carries no parameters. Any other payload must be a
    /// JSON object.
    pub fn resolve(&self, command: &str, payload: &str) -> Result<String, SimError> {
        let params = parse_payload(payload)?;

        let fixed = params
            .as_ref()
            .and_then(|p| p.get(FIXED_RESPONSE_KEY))
            .filter(|v| !v.is_null());
        if let Some(fixed) = fixed {
            debug!("{}: using fixed response override", command);
            return fixed_response(fixed);
        }

        let Some(group) = self
            .config
            .command(command)
            .and_then(|spec| spec.primary_group())
        else {
            debug!("{}: no response rules, acknowledging", command);
            return Ok(fallback_response(command));
        };

        debug!("{}: rendering response group {}", command, group.label);
        Ok(self.render_group(group))
    }

    fn render_group(&self, group: &ResponseCaseGroup) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        let mut response = format!("{}: ", group.label);
        for rule in &group.parameters {
            let value = choose_value(rule, &mut *rng);
            response.push_str(&format!("{}:-{}\t", rule.name, value));
        }
        response
    }
}

impl CommandInvoker for CommandResolver {
    fn invoke(&self, command: &str, payload: &str) -> Result<String, SimError> {
        self.resolve(command, payload).inspect_err(|e| {
            warn!("Command {} failed: {}", command, e);
        })
    }
}

/// Acknowledgement for commands without response rules
pub fn fallback_response(command: &str) -> String {
    format!("RESPONSE RECEIVED FOR {}", command.to_uppercase())
}

/// Pick one of the rule's candidate values uniformly at random
pub fn choose_value<R: rand::Rng + ?Sized>(rule: &ParameterRule, rng: &mut R) -> i64 {
    rule.candidates()
        .choose(rng)
        .copied()
        .unwrap_or(rule.value)
}

fn parse_payload(payload: &str) -> Result<Option<Map<String, Value>>, SimError> {
    if payload.trim().is_empty() {
        return Ok(None);
    }
    match serde_json::from_str::<Value>(payload) {
        Ok(Value::Object(map)) => Ok(Some(map)),
        Ok(other) => Err(SimError::Parse(format!(
            "parameter payload must be a JSON object, got {other}"
        ))),
        Err(e) => Err(SimError::Parse(e.to_string())),
    }
}

/// Render `Label:-key:value||key:value||...` from an override object
fn fixed_response(fixed: &Value) -> Result<String, SimError> {
    let Value::Object(fields) = fixed else {
        return Err(SimError::Config(format!(
            "{FIXED_RESPONSE_KEY} must be an object"
        )));
    };
    let Some(label) = fields.get(RESPONSE_LABEL_KEY) else {
        return Err(SimError::Config(format!(
            "{FIXED_RESPONSE_KEY} is missing {RESPONSE_LABEL_KEY}"
        )));
    };

    let mut response = format!("{}:-", display_value(label));
    for (key, value) in fields {
        if key != RESPONSE_LABEL_KEY {
            response.push_str(&format!("{}:{}||", key, display_value(value)));
        }
    }
    Ok(response)
}

/// Strings render without quotes, everything else as compact JSON
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
