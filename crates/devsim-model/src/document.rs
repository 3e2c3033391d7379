//! Simulation document loader
//!
//! Reads the JSON document format used to describe a simulated device:
//!
//! ```text
//! {
//!   "attributes": {
//!     "<name>": { "waveForm": "sine", "minValue": "-10", "maxValue": "55",
//!                 "value": 25, "skipSteps": 3, "timeLag": 100 }
//!   },
//!   "commands": {
//!     "<command>": [ { "<RESPONSE_LABEL>": [
//!         { "parameterName": "msg", "value": "0", "minValue": "0",
//!           "maxValue": "0", "allowedValues": "0," } ] } ]
//!   }
//! }
//! ```
//!
//! Attributes and commands are keyed objects, so entries load in name order.
//! Numbers may be written as JSON numbers or numeric strings. `allowedValues`
//! is either a comma separated string (empty entries skipped) or an array.
//! Each section can also be parsed on its own with [`parse_attributes`] and
//! [`parse_commands`].

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::error::Category;

use crate::{
    AttributeSimSpec, CommandResponseSpec, ParameterRule, ResponseCaseGroup, SimError,
    SimulationConfig,
};

/// A number as it appears in a document
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Numeric {
    Int(i64),
    Float(f64),
    Text(String),
    /// Anything else (`null`, booleans, objects, arrays)
    Other(serde_json::Value),
}

impl Numeric {
    fn raw(&self) -> String {
        match self {
            Numeric::Int(v) => v.to_string(),
            Numeric::Float(v) => v.to_string(),
            Numeric::Text(s) => s.clone(),
            Numeric::Other(v) => v.to_string(),
        }
    }

    fn to_f64(&self, field: &str) -> Result<f64, SimError> {
        match self {
            Numeric::Int(v) => Ok(*v as f64),
            Numeric::Float(v) => Ok(*v),
            Numeric::Text(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| SimError::value(field, s.as_str())),
            Numeric::Other(_) => Err(SimError::value(field, self.raw())),
        }
    }

    fn to_i64(&self, field: &str) -> Result<i64, SimError> {
        match self {
            Numeric::Int(v) => Ok(*v),
            Numeric::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| SimError::value(field, s.as_str())),
            Numeric::Float(_) | Numeric::Other(_) => Err(SimError::value(field, self.raw())),
        }
    }

    fn to_u64(&self, field: &str) -> Result<u64, SimError> {
        let v = self.to_i64(field)?;
        u64::try_from(v).map_err(|_| SimError::value(field, self.raw()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AllowedValues {
    List(Vec<Numeric>),
    Text(String),
    Other(serde_json::Value),
}

impl AllowedValues {
    fn to_vec(&self) -> Result<Vec<i64>, SimError> {
        match self {
            AllowedValues::List(items) => items
                .iter()
                .map(|n| n.to_i64("allowedValues"))
                .collect(),
            AllowedValues::Text(s) => s
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(|part| {
                    part.parse::<i64>()
                        .map_err(|_| SimError::value("allowedValues", part))
                })
                .collect(),
            AllowedValues::Other(v) => Err(SimError::value("allowedValues", v.to_string())),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDataPoint {
    wave_form: String,
    min_value: Numeric,
    max_value: Numeric,
    value: Numeric,
    skip_steps: Numeric,
    time_lag: Numeric,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawParameterRule {
    parameter_name: String,
    value: Numeric,
    min_value: Numeric,
    max_value: Numeric,
    #[serde(default)]
    allowed_values: Option<AllowedValues>,
}

type RawAttributes = BTreeMap<String, RawDataPoint>;
type RawCommands = BTreeMap<String, Vec<BTreeMap<String, Vec<RawParameterRule>>>>;

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    attributes: RawAttributes,
    #[serde(default)]
    commands: RawCommands,
}

/// Load a combined document into a validated configuration
pub fn load_document(text: &str) -> Result<SimulationConfig, SimError> {
    let doc: RawDocument = from_json(text)?;
    SimulationConfig::new(
        convert_attributes(doc.attributes)?,
        convert_commands(doc.commands)?,
    )
}

/// Load either a combined document or the serialized form of a
/// [`SimulationConfig`], where `attributes` and `commands` are arrays
pub fn load_config(text: &str) -> Result<SimulationConfig, SimError> {
    let value: serde_json::Value = from_json(text)?;
    let serialized = ["attributes", "commands"]
        .iter()
        .any(|key| value.get(key).is_some_and(serde_json::Value::is_array));
    if serialized {
        serde_json::from_value(value).map_err(|e| SimError::Config(e.to_string()))
    } else {
        load_document(text)
    }
}

/// Parse a document holding only the attribute section
pub fn parse_attributes(text: &str) -> Result<Vec<AttributeSimSpec>, SimError> {
    convert_attributes(from_json(text)?)
}

/// Parse a document holding only the command section
pub fn parse_commands(text: &str) -> Result<Vec<CommandResponseSpec>, SimError> {
    convert_commands(from_json(text)?)
}

fn from_json<T: DeserializeOwned>(text: &str) -> Result<T, SimError> {
    serde_json::from_str(text).map_err(|e| match e.classify() {
        Category::Data => SimError::Config(e.to_string()),
        Category::Io | Category::Syntax | Category::Eof => SimError::Parse(e.to_string()),
    })
}

fn convert_attributes(raw: RawAttributes) -> Result<Vec<AttributeSimSpec>, SimError> {
    raw.into_iter()
        .map(|(name, point)| -> Result<AttributeSimSpec, SimError> {
            Ok(AttributeSimSpec {
                waveform: point.wave_form.parse()?,
                min_value: point.min_value.to_f64("minValue")?,
                max_value: point.max_value.to_f64("maxValue")?,
                start_value: point.value.to_f64("value")?,
                step_increment: point.skip_steps.to_u64("skipSteps")?,
                tick_interval_ms: point.time_lag.to_u64("timeLag")?,
                name,
            })
        })
        .collect()
}

fn convert_commands(raw: RawCommands) -> Result<Vec<CommandResponseSpec>, SimError> {
    raw.into_iter()
        .map(|(command, groups)| -> Result<CommandResponseSpec, SimError> {
            let groups = groups
                .into_iter()
                .map(|group| convert_group(&command, group))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(CommandResponseSpec::new(command, groups))
        })
        .collect()
}

fn convert_group(
    command: &str,
    group: BTreeMap<String, Vec<RawParameterRule>>,
) -> Result<ResponseCaseGroup, SimError> {
    if group.len() != 1 {
        return Err(SimError::Config(format!(
            "command {command}: response group must have exactly one label, found {}",
            group.len()
        )));
    }
    let Some((label, rules)) = group.into_iter().next() else {
        return Err(SimError::Config(format!(
            "command {command}: response group has no label"
        )));
    };

    let parameters = rules
        .into_iter()
        .map(|rule| -> Result<ParameterRule, SimError> {
            let allowed = match &rule.allowed_values {
                Some(values) => values.to_vec()?,
                None => Vec::new(),
            };
            Ok(ParameterRule::new(
                rule.parameter_name,
                rule.value.to_i64("value")?,
                rule.min_value.to_i64("minValue")?,
                rule.max_value.to_i64("maxValue")?,
                allowed,
            ))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ResponseCaseGroup::new(label, parameters))
}
