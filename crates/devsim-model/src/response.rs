//! Response rules for simulated commands

use serde::{Deserialize, Serialize};

/// One parameter of a structured command response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterRule {
    /// Parameter name as it appears in the response
    pub name: String,
    /// Declared (nominal) value
    pub value: i64,
    pub min_value: i64,
    pub max_value: i64,
    /// Additional allowed values, insertion ordered and free of duplicates
    #[serde(default)]
    pub allowed_values: Vec<i64>,
}

impl ParameterRule {
    /// Create a rule, collapsing duplicate allowed values
    pub fn new(
        name: impl Into<String>,
        value: i64,
        min_value: i64,
        max_value: i64,
        allowed_values: impl IntoIterator<Item = i64>,
    ) -> Self {
        let mut allowed = Vec::new();
        for v in allowed_values {
            if !allowed.contains(&v) {
                allowed.push(v);
            }
        }
        Self {
            name: name.into(),
            value,
            min_value,
            max_value,
            allowed_values: allowed,
        }
    }

    /// Distinct values a response may report for this parameter
    ///
    /// `{value, min, max} ∪ allowed`, in that order with duplicates dropped.
    /// Never empty.
    pub fn candidates(&self) -> Vec<i64> {
        let mut set = Vec::with_capacity(3 + self.allowed_values.len());
        let all = [self.value, self.min_value, self.max_value];
        for v in all.into_iter().chain(self.allowed_values.iter().copied()) {
            if !set.contains(&v) {
                set.push(v);
            }
        }
        set
    }
}

/// A labelled bundle of parameter rules describing one possible response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseCaseGroup {
    /// Response name, e.g. `RES_ON`
    pub label: String,
    /// Parameters in declaration order
    pub parameters: Vec<ParameterRule>,
}

impl ResponseCaseGroup {
    pub fn new(label: impl Into<String>, parameters: Vec<ParameterRule>) -> Self {
        Self {
            label: label.into(),
            parameters,
        }
    }
}

/// Response rules for one command
///
/// Only the first group drives responses; later groups are carried for
/// configurations that declare them but have no consumer yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResponseSpec {
    pub command: String,
    pub groups: Vec<ResponseCaseGroup>,
}

impl CommandResponseSpec {
    pub fn new(command: impl Into<String>, groups: Vec<ResponseCaseGroup>) -> Self {
        Self {
            command: command.into(),
            groups,
        }
    }

    /// The group consulted when synthesizing a response
    pub fn primary_group(&self) -> Option<&ResponseCaseGroup> {
        self.groups.first()
    }
}
