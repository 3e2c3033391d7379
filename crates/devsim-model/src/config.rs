//! Validated simulation configuration

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{AttributeSimSpec, CommandResponseSpec, SimError};

/// Read-only description of every simulated attribute and command
///
/// Built once at startup and shared between the generator and the resolver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ConfigParts", into = "ConfigParts")]
pub struct SimulationConfig {
    attributes: Vec<AttributeSimSpec>,
    commands: BTreeMap<String, CommandResponseSpec>,
}

/// Serialized shape of a configuration
#[derive(Debug, Serialize, Deserialize)]
struct ConfigParts {
    #[serde(default)]
    attributes: Vec<AttributeSimSpec>,
    #[serde(default)]
    commands: Vec<CommandResponseSpec>,
}

impl TryFrom<ConfigParts> for SimulationConfig {
    type Error = SimError;

    fn try_from(parts: ConfigParts) -> Result<Self, Self::Error> {
        SimulationConfig::new(parts.attributes, parts.commands)
    }
}

impl From<SimulationConfig> for ConfigParts {
    fn from(config: SimulationConfig) -> Self {
        ConfigParts {
            attributes: config.attributes,
            commands: config.commands.into_values().collect(),
        }
    }
}

impl SimulationConfig {
    /// Validate and assemble a configuration
    pub fn new(
        attributes: Vec<AttributeSimSpec>,
        commands: Vec<CommandResponseSpec>,
    ) -> Result<Self, SimError> {
        let mut seen = HashSet::new();
        for attr in &attributes {
            attr.validate()?;
            if !seen.insert(attr.name.as_str()) {
                return Err(SimError::Config(format!(
                    "duplicate attribute: {}",
                    attr.name
                )));
            }
        }

        let mut by_name = BTreeMap::new();
        for spec in commands {
            if spec.command.is_empty() {
                return Err(SimError::Config("command name is empty".into()));
            }
            let name = spec.command.clone();
            if by_name.insert(name.clone(), spec).is_some() {
                return Err(SimError::Config(format!("duplicate command: {name}")));
            }
        }

        debug!(
            "Loaded simulation config: {} attributes, {} commands",
            attributes.len(),
            by_name.len()
        );

        Ok(Self {
            attributes,
            commands: by_name,
        })
    }

    /// Attribute rules in the order they were passed to [`SimulationConfig::new`]
    pub fn attributes(&self) -> &[AttributeSimSpec] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeSimSpec> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn command(&self, name: &str) -> Option<&CommandResponseSpec> {
        self.commands.get(name)
    }

    /// Configured command names, sorted
    pub fn command_names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ParameterRule, ResponseCaseGroup, WaveformKind};

    fn attr(name: &str) -> AttributeSimSpec {
        AttributeSimSpec {
            name: name.to_string(),
            waveform: WaveformKind::Cosine,
            min_value: 0.0,
            max_value: 100.0,
            start_value: 80.0,
            step_increment: 3,
            tick_interval_ms: 100,
        }
    }

    fn on_command() -> CommandResponseSpec {
        CommandResponseSpec::new(
            "ON",
            vec![ResponseCaseGroup::new(
                "RES_ON",
                vec![ParameterRule::new("msg", 0, 0, 0, [0])],
            )],
        )
    }

    #[test]
    fn test_lookup() {
        let config = SimulationConfig::new(
            vec![attr("Relative_Humidity"), attr("Rainfall")],
            vec![on_command()],
        )
        .unwrap();

        let names: Vec<&str> = config.attributes().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Relative_Humidity", "Rainfall"]);
        assert_eq!(config.attribute("Rainfall").unwrap().start_value, 80.0);
        assert!(config.attribute("Pressure").is_none());
        assert!(config.command("ON").is_some());
        assert!(config.command("OFF").is_none());
        assert_eq!(config.command_names().collect::<Vec<_>>(), vec!["ON"]);
    }

    #[test]
    fn test_duplicate_attribute_rejected() {
        let result = SimulationConfig::new(vec![attr("Rainfall"), attr("Rainfall")], vec![]);
        assert!(matches!(result, Err(SimError::Config(msg)) if msg.contains("Rainfall")));
    }

    #[test]
    fn test_duplicate_command_rejected() {
        let result = SimulationConfig::new(vec![], vec![on_command(), on_command()]);
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn test_invalid_attribute_rejected() {
        let mut bad = attr("Wind_Speed");
        bad.max_value = -1.0;
        assert!(SimulationConfig::new(vec![bad], vec![]).is_err());
    }

    #[test]
    fn test_canonical_json_revalidates() {
        let config = SimulationConfig::new(vec![attr("Rainfall")], vec![on_command()]).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let back: SimulationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);

        let mut value = serde_json::to_value(&config).unwrap();
        value["attributes"][0]["stepIncrement"] = 0.into();
        assert!(serde_json::from_value::<SimulationConfig>(value).is_err());
    }
}
