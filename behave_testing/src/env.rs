//! Per-procedure environment overlay and session construction
//!
//! Generated procedures never touch the process environment. Each one builds
//! an [`EnvOverlay`] holding exactly the variables its session reads and
//! hands it to [`Session::from_overlay`], so procedures can run in parallel.

use std::collections::BTreeMap;

/// Environment key holding the region
pub const ENV_REGION: &str = "AWS_REGION";
/// Environment key holding the access key id
pub const ENV_ACCESS_KEY: &str = "AWS_ACCESS_KEY";
/// Environment key holding the secret access key
pub const ENV_SECRET_KEY: &str = "AWS_SECRET_ACCESS_KEY";

/// Isolated key/value view of the environment for one procedure
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverlay {
    vars: BTreeMap<String, String>,
}

impl EnvOverlay {
    /// An empty overlay that does not see the process environment
    pub fn isolated() -> Self {
        Self::default()
    }

    /// Set a variable
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Get a variable
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Number of variables set
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether no variable is set
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Static credentials
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
}

impl Credentials {
    /// Static credentials without a session token
    pub fn new_static(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: String::new(),
        }
    }
}

/// Region plus credentials a client is constructed from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    region: String,
    credentials: Credentials,
}

impl Session {
    /// Create a session from explicit values
    pub fn new(
        region: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        Self {
            region: region.into(),
            credentials: Credentials::new_static(access_key_id, secret_access_key),
        }
    }

    /// Create a session from an overlay; missing keys become empty values
    pub fn from_overlay(overlay: &EnvOverlay) -> Self {
        let read = |key: &str| overlay.get(key).unwrap_or_default().to_string();
        let session = Self::new(read(ENV_REGION), read(ENV_ACCESS_KEY), read(ENV_SECRET_KEY));
        tracing::debug!("Session created for region {:?}", session.region);
        session
    }

    /// Configured region
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Configured credentials
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_reads_overlay_only() {
        let overlay = EnvOverlay::isolated()
            .set(ENV_REGION, "us-west-1")
            .set(ENV_ACCESS_KEY, "akid")
            .set(ENV_SECRET_KEY, "secret");

        let session = Session::from_overlay(&overlay);

        assert_eq!(session.region(), "us-west-1");
        assert_eq!(session.credentials().access_key_id, "akid");
        assert_eq!(session.credentials().secret_access_key, "secret");
    }

    #[test]
    fn test_isolated_overlay_is_empty() {
        let overlay = EnvOverlay::isolated();
        assert!(overlay.is_empty());
        assert_eq!(Session::from_overlay(&overlay).region(), "");
    }
}
