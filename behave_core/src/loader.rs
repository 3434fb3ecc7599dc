//! Behavior suite loader

use crate::error::{CoreError, Result};
use crate::types::{BehaviorSuite, ENV_OVERRIDE_KEYS};
use std::path::Path;

/// Document syntax of a suite file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteFormat {
    Json,
    Yaml,
}

impl SuiteFormat {
    /// Pick the format from a file extension, defaulting to JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => SuiteFormat::Yaml,
            _ => SuiteFormat::Json,
        }
    }
}

/// Loads behavior suite files
pub struct SuiteLoader {
    /// Reject `localConfig` keys outside the recognized override set
    strict_local_config: bool,
}

impl SuiteLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self {
            strict_local_config: true,
        }
    }

    /// Create a loader that accepts any `localConfig` key
    pub fn permissive() -> Self {
        Self {
            strict_local_config: false,
        }
    }

    /// Load a suite from a file
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<BehaviorSuite> {
        let path = path.as_ref();
        let label = path.display().to_string();
        let content =
            std::fs::read_to_string(path).map_err(|e| CoreError::parse(label.as_str(), e))?;
        self.load_str(&content, SuiteFormat::from_path(path), &label)
    }

    /// Load a suite from a JSON string
    pub fn load_string(&self, content: &str) -> Result<BehaviorSuite> {
        self.load_str(content, SuiteFormat::Json, "<string>")
    }

    /// Load a suite from a YAML string
    pub fn load_yaml_string(&self, content: &str) -> Result<BehaviorSuite> {
        self.load_str(content, SuiteFormat::Yaml, "<string>")
    }

    fn load_str(&self, content: &str, format: SuiteFormat, label: &str) -> Result<BehaviorSuite> {
        let suite: BehaviorSuite = match format {
            SuiteFormat::Json => {
                serde_json::from_str(content).map_err(|e| CoreError::parse(label, e))?
            }
            SuiteFormat::Yaml => {
                serde_yaml::from_str(content).map_err(|e| CoreError::parse(label, e))?
            }
        };
        self.validate(&suite)?;
        tracing::info!(
            "Loaded behavior suite {} with {} cases",
            label,
            suite.tests.cases.len()
        );
        Ok(suite)
    }

    /// Validate a loaded suite
    fn validate(&self, suite: &BehaviorSuite) -> Result<()> {
        if suite.defaults.files.is_some() || suite.defaults.config.is_some() {
            tracing::warn!("Suite defaults carry files/config blocks; they are not interpreted");
        }

        for (index, case) in suite.tests.cases.iter().enumerate() {
            if case.request.operation.is_empty() {
                return Err(CoreError::Validation {
                    path: format!("tests.cases[{index}].request.operation"),
                    message: "Missing operation name".to_string(),
                });
            }

            if self.strict_local_config {
                let mut keys: Vec<_> = case.local_config.keys().collect();
                keys.sort();
                if let Some(key) = keys
                    .into_iter()
                    .find(|k| !ENV_OVERRIDE_KEYS.contains(&k.as_str()))
                {
                    return Err(CoreError::InvalidLocalConfig {
                        case: index,
                        key: key.clone(),
                    });
                }
            }

            if case.expect.is_empty() {
                tracing::warn!("Case {} ({}) has no expectations", index, case.description);
            }
        }

        Ok(())
    }
}

impl Default for SuiteLoader {
    fn default() -> Self {
        Self::new()
    }
}
