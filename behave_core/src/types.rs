//! Type definitions for behavior suites

use crate::assertion::{AssertionKind, UnknownAssertionKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Environment key holding the region
pub const ENV_REGION: &str = "AWS_REGION";
/// Environment key holding the access key id
pub const ENV_ACCESS_KEY: &str = "AWS_ACCESS_KEY";
/// Environment key holding the secret access key
pub const ENV_SECRET_KEY: &str = "AWS_SECRET_ACCESS_KEY";

/// Keys a case is allowed to override through `localConfig`
pub const ENV_OVERRIDE_KEYS: [&str; 3] = [ENV_REGION, ENV_ACCESS_KEY, ENV_SECRET_KEY];

/// A complete behavior suite document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BehaviorSuite {
    /// Suite-wide defaults
    pub defaults: Defaults,

    /// Test defaults and cases
    pub tests: Tests,
}

/// Environment defaults plus reserved blocks
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Defaults {
    /// Environment variable name to value
    pub env: HashMap<String, String>,

    /// Reserved, not interpreted
    pub files: Option<Value>,

    /// Reserved, not interpreted
    pub config: Option<Value>,
}

/// The test section of a suite
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tests {
    /// Defaults overriding the suite defaults
    pub defaults: Defaults,

    /// Cases in document order
    pub cases: Vec<Case>,
}

/// One behavior test scenario
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Case {
    /// Free text, carried into the generated doc comment
    pub description: String,

    /// Per-case environment overrides
    pub local_config: HashMap<String, String>,

    /// Operation invocation
    pub request: OperationRequest,

    /// Simulated server response; `None` means a bare 200
    pub response: Option<SimulatedResponse>,

    /// Assertions in evaluation order
    pub expect: Vec<Expectation>,
}

/// Operation name plus its input value tree
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OperationRequest {
    pub operation: String,

    pub input: Map<String, Value>,
}

/// Simulated HTTP response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulatedResponse {
    /// Status code, 0 or missing means 200
    pub status_code: u16,

    pub body_content: String,

    /// `base64` or `binary` marks the body content as base64 encoded
    pub body_type: String,

    pub headers: BTreeMap<String, String>,
}

impl SimulatedResponse {
    /// Status code with the 200 default applied
    pub fn status(&self) -> u16 {
        if self.status_code == 0 {
            200
        } else {
            self.status_code
        }
    }

    /// Whether `body_content` holds base64 text
    pub fn is_base64_body(&self) -> bool {
        matches!(
            self.body_type.to_ascii_lowercase().as_str(),
            "base64" | "binary"
        )
    }
}

/// A single expected property of a case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Expectation {
    /// Which predicate applies
    pub kind: AssertionKind,

    /// The expected parameter as written in the document
    pub expected: Value,
}

/// Raised when an `expect` entry is not a single known kind
#[derive(Debug, Error)]
pub enum ExpectationError {
    #[error("expect entry must have exactly one key, found {0}")]
    KeyCount(usize),

    #[error(transparent)]
    UnknownKind(#[from] UnknownAssertionKind),
}

impl TryFrom<Map<String, Value>> for Expectation {
    type Error = ExpectationError;

    fn try_from(entry: Map<String, Value>) -> Result<Self, Self::Error> {
        if entry.len() != 1 {
            return Err(ExpectationError::KeyCount(entry.len()));
        }
        let (name, expected) = entry
            .into_iter()
            .next()
            .ok_or(ExpectationError::KeyCount(0))?;
        Ok(Expectation {
            kind: name.parse()?,
            expected,
        })
    }
}

impl From<Expectation> for Map<String, Value> {
    fn from(expectation: Expectation) -> Self {
        let mut entry = Map::new();
        entry.insert(expectation.kind.name().to_string(), expectation.expected);
        entry
    }
}

impl BehaviorSuite {
    /// The merged environment for a case, ordered by key
    ///
    /// Later layers win: suite defaults, then test defaults, then the case's
    /// `localConfig`.
    pub fn merged_env<'a>(&'a self, case: &'a Case) -> BTreeMap<&'a str, &'a str> {
        let mut merged = BTreeMap::new();
        for layer in [&self.defaults.env, &self.tests.defaults.env, &case.local_config] {
            for (key, value) in layer {
                merged.insert(key.as_str(), value.as_str());
            }
        }
        merged
    }
}
