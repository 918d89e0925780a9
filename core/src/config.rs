//! Run configuration and the immutable run context
//!
//! All inputs are read once at startup, validated, and bundled into a
//! [`RunContext`] that workers share read-only through an `Arc`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Load test configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoadConfig {
    /// Number of concurrent workers
    pub threads: usize,

    /// Run duration in minutes
    pub mins: u64,

    /// Target hosts, one is picked at random per request
    pub hosts: Vec<String>,

    /// Index name used in the search path
    pub index: String,

    /// Document type name used in the search path
    #[serde(rename = "Type")]
    pub doc_type: String,
}

impl LoadConfig {
    /// Total wall-clock run time
    pub fn run_duration(&self) -> Duration {
        Duration::from_secs(self.mins.saturating_mul(60))
    }

    /// Search endpoint URL for the given host
    ///
    /// Hosts without a scheme are addressed over plain HTTP.
    pub fn search_url(&self, host: &str) -> String {
        let host = host.trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            format!("{}/{}/{}/_search", host, self.index, self.doc_type)
        } else {
            format!("http://{}/{}/{}/_search", host, self.index, self.doc_type)
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threads == 0 {
            return Err(ConfigError::InvalidThreads(
                "Threads must be at least 1".into(),
            ));
        }

        if self.mins == 0 {
            return Err(ConfigError::InvalidDuration(
                "Mins must be at least 1".into(),
            ));
        }

        if self.hosts.is_empty() {
            return Err(ConfigError::NoHosts);
        }

        if let Some(host) = self.hosts.iter().find(|h| h.trim().is_empty()) {
            return Err(ConfigError::InvalidHost(format!("{host:?}")));
        }

        if self.index.is_empty() {
            return Err(ConfigError::MissingField("Index"));
        }

        if self.doc_type.is_empty() {
            return Err(ConfigError::MissingField("Type"));
        }

        Ok(())
    }
}

/// A reusable query template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Optional identifier written to the result log
    #[serde(rename = "ID", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Opaque query body, may contain `$key` placeholders
    #[serde(rename = "Cond")]
    pub body: serde_json::Value,
}

impl Condition {
    /// Create a condition with an identifier
    pub fn new(id: i64, body: serde_json::Value) -> Self {
        Self { id: Some(id), body }
    }
}

/// Non-empty set of query templates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Condition>", into = "Vec<Condition>")]
pub struct ConditionSet(Vec<Condition>);

impl ConditionSet {
    /// Build a condition set, rejecting an empty list
    pub fn new(conditions: Vec<Condition>) -> Result<Self, ConfigError> {
        if conditions.is_empty() {
            return Err(ConfigError::NoConditions);
        }
        Ok(Self(conditions))
    }

    /// All conditions in input order
    pub fn as_slice(&self) -> &[Condition] {
        &self.0
    }

    /// Number of conditions
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a validated set
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Placeholder key to candidate values
///
/// Keys are stored without the leading `$`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, Vec<String>>",
    into = "BTreeMap<String, Vec<String>>"
)]
pub struct SubstitutionSet(BTreeMap<String, Vec<String>>);

impl SubstitutionSet {
    /// Build a substitution set, rejecting keys without candidates
    pub fn new(values: BTreeMap<String, Vec<String>>) -> Result<Self, ConfigError> {
        if let Some((key, _)) = values.iter().find(|(_, v)| v.is_empty()) {
            return Err(ConfigError::EmptyCandidates(key.clone()));
        }
        if values.keys().any(|k| k.is_empty()) {
            return Err(ConfigError::EmptyKey);
        }
        Ok(Self(values))
    }

    /// An empty set (no substitution)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Candidate values for a key
    pub fn candidates(&self, key: &str) -> Option<&[String]> {
        self.0.get(key).map(Vec::as_slice)
    }

    /// Iterate over keys and their candidates in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check whether there are no keys
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<Condition>> for ConditionSet {
    type Error = ConfigError;

    fn try_from(conditions: Vec<Condition>) -> Result<Self, Self::Error> {
        Self::new(conditions)
    }
}

impl From<ConditionSet> for Vec<Condition> {
    fn from(set: ConditionSet) -> Self {
        set.0
    }
}

impl TryFrom<BTreeMap<String, Vec<String>>> for SubstitutionSet {
    type Error = ConfigError;

    fn try_from(values: BTreeMap<String, Vec<String>>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl From<SubstitutionSet> for BTreeMap<String, Vec<String>> {
    fn from(set: SubstitutionSet) -> Self {
        set.0
    }
}

/// Everything a run needs, validated and immutable
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Load configuration
    pub config: LoadConfig,
    /// Query templates
    pub conditions: ConditionSet,
    /// Placeholder values
    pub substitutions: SubstitutionSet,
}

impl RunContext {
    /// Validate and assemble a run context
    pub fn new(
        config: LoadConfig,
        conditions: ConditionSet,
        substitutions: SubstitutionSet,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            conditions,
            substitutions,
        })
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid worker count
    #[error("Invalid threads: {0}")]
    InvalidThreads(String),

    /// Invalid run duration
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    /// Host list is empty
    #[error("At least one host is required")]
    NoHosts,

    /// A host entry is blank
    #[error("Invalid host: {0}")]
    InvalidHost(String),

    /// A required string field is empty
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Condition list is empty
    #[error("At least one condition is required")]
    NoConditions,

    /// A substitution key is the empty string
    #[error("Substitution keys must not be empty")]
    EmptyKey,

    /// A substitution key has no candidate values
    #[error("Substitution key {0:?} has no candidate values")]
    EmptyCandidates(String),
}
