//! Generator configuration

use crate::error::{GenError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings controlling how generated tests address their collaborators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Rust path of the generated client crate
    pub client_path: String,

    /// Rust path of the runtime support crate
    pub runtime_path: String,

    /// Prefix of generated test function names
    pub test_prefix: String,

    /// Decode string values of blob shapes as base64
    pub base64_blobs: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            client_path: "client".to_string(),
            runtime_path: "behave_testing".to_string(),
            test_prefix: "behavior".to_string(),
            base64_blobs: false,
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from a YAML file
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: GeneratorConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every path and the test prefix parse as Rust syntax
    pub fn validate(&self) -> Result<()> {
        self.client()?;
        self.runtime()?;
        self.test_ident(0)?;
        Ok(())
    }

    /// Parsed client crate path
    pub fn client(&self) -> Result<syn::Path> {
        parse_path("client_path", &self.client_path)
    }

    /// Parsed runtime crate path
    pub fn runtime(&self) -> Result<syn::Path> {
        parse_path("runtime_path", &self.runtime_path)
    }

    /// Name of the test function generated for case `index`
    pub fn test_ident(&self, index: usize) -> Result<syn::Ident> {
        let name = format!("{}_{:03}", self.test_prefix, index);
        syn::parse_str(&name).map_err(|_| {
            GenError::Config(format!(
                "test_prefix `{}` does not form an identifier",
                self.test_prefix
            ))
        })
    }
}

fn parse_path(field: &str, value: &str) -> Result<syn::Path> {
    syn::parse_str(value)
        .map_err(|e| GenError::Config(format!("{field} `{value}` is not a Rust path: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_keys() {
        let config = GeneratorConfig::from_yaml_str("client_path: sampleservice\n").unwrap();
        assert_eq!(config.client_path, "sampleservice");
        assert_eq!(config.runtime_path, "behave_testing");
        assert_eq!(config.test_prefix, "behavior");
        assert!(!config.base64_blobs);
    }

    #[test]
    fn test_invalid_path_is_rejected() {
        let result = GeneratorConfig::from_yaml_str("client_path: \"not a path\"\n");
        assert!(matches!(result, Err(GenError::Config(_))));
    }

    #[test]
    fn test_invalid_test_prefix_is_rejected() {
        for prefix in ["\"my tests\"", "\"1st\"", "\"case-\""] {
            let result = GeneratorConfig::from_yaml_str(&format!("test_prefix: {prefix}\n"));
            assert!(matches!(result, Err(GenError::Config(_))), "{prefix} accepted");
        }
    }

    #[test]
    fn test_ident_is_numbered() {
        let config = GeneratorConfig::default();
        assert_eq!(config.test_ident(7).unwrap().to_string(), "behavior_007");
        assert_eq!(config.test_ident(1234).unwrap().to_string(), "behavior_1234");
    }

    #[test]
    fn test_nested_paths() {
        let config = GeneratorConfig::from_yaml_str("runtime_path: crate::support\n").unwrap();
        assert_eq!(config.runtime().unwrap().segments.len(), 2);
    }
}
