//! Server configuration
//!
//! Loaded from YAML:
//!
//! ```yaml
//! max_sessions: 4
//! audit: edit-config lock unlock
//! logging: production
//! seed: /etc/netconf/seed.yaml
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use netconf_core::errors::{NetconfError, Result};
use netconf_core::logging_facility::Profile;
use serde::{Deserialize, Serialize};

use crate::audit::AuditFlags;

pub const DEFAULT_MAX_SESSIONS: usize = 4;
pub const MAX_SESSIONS_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Concurrently open sessions, 1 to 10
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Space-separated audited operations
    #[serde(default)]
    pub audit: Option<String>,

    /// File holding the audit options line; takes precedence over `audit`
    #[serde(default)]
    pub audit_file: Option<PathBuf>,

    /// Logging profile name (`development`, `production`, `test`)
    #[serde(default)]
    pub logging: Option<String>,

    /// Seed file the running datastore is loaded from
    #[serde(default)]
    pub seed: Option<PathBuf>,
}

fn default_max_sessions() -> usize {
    DEFAULT_MAX_SESSIONS
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_sessions: DEFAULT_MAX_SESSIONS,
            audit: None,
            audit_file: None,
            logging: None,
            seed: None,
        }
    }
}

fn config_error(origin: &str, reason: impl Into<String>) -> NetconfError {
    NetconfError::Config {
        origin: origin.to_string(),
        reason: reason.into(),
    }
}

impl ServerConfig {
    /// # Errors
    /// * `Config` - unreadable file, bad YAML or out-of-range values
    pub fn load_file(path: &Path) -> Result<Self> {
        let origin = path.display().to_string();
        let content = fs::read_to_string(path)
            .map_err(|e| config_error(&origin, format!("failed to read: {}", e)))?;
        Self::parse(&content, &origin)
    }

    /// # Errors
    /// * `Config` - bad YAML or out-of-range values
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Self::parse(content, "<config>")
    }

    fn parse(content: &str, origin: &str) -> Result<Self> {
        let config: ServerConfig = serde_yaml::from_str(content)
            .map_err(|e| config_error(origin, format!("YAML parse error: {}", e)))?;
        config.validate(origin)?;
        Ok(config)
    }

    fn validate(&self, origin: &str) -> Result<()> {
        if !(1..=MAX_SESSIONS_LIMIT).contains(&self.max_sessions) {
            return Err(config_error(
                origin,
                format!(
                    "max_sessions must be between 1 and {}, got {}",
                    MAX_SESSIONS_LIMIT, self.max_sessions
                ),
            ));
        }
        self.profile()?;
        Ok(())
    }

    /// Logging profile, `Production` when unset
    ///
    /// # Errors
    /// * `Config` - unknown profile name
    pub fn profile(&self) -> Result<Profile> {
        match &self.logging {
            None => Ok(Profile::Production),
            Some(name) => name.parse().map_err(|e: String| config_error("logging", e)),
        }
    }

    /// Audit flags from `audit_file` if set, else from `audit`
    ///
    /// # Errors
    /// * `Config` - the audit file cannot be read
    pub fn audit_flags(&self) -> Result<AuditFlags> {
        match (&self.audit_file, &self.audit) {
            (Some(path), _) => AuditFlags::load_file(path),
            (None, Some(line)) => Ok(AuditFlags::parse(line)),
            (None, None) => Ok(AuditFlags::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply() {
        let config = ServerConfig::from_yaml_str("seed: seed.yaml").unwrap();
        assert_eq!(config.max_sessions, DEFAULT_MAX_SESSIONS);
        assert_eq!(config.profile().unwrap(), Profile::Production);
        assert_eq!(config.seed.as_deref(), Some(Path::new("seed.yaml")));
        assert!(config.audit_flags().unwrap().is_empty());
    }

    #[test]
    fn test_max_sessions_range() {
        for ok in [1, 10] {
            assert!(ServerConfig::from_yaml_str(&format!("max_sessions: {}", ok)).is_ok());
        }
        for bad in [0, 11] {
            let err = ServerConfig::from_yaml_str(&format!("max_sessions: {}", bad)).unwrap_err();
            assert!(matches!(err, NetconfError::Config { .. }), "{}", bad);
        }
    }

    #[test]
    fn test_unknown_profile_and_fields_rejected() {
        assert!(ServerConfig::from_yaml_str("logging: verbose").is_err());
        assert!(ServerConfig::from_yaml_str("sessions: 3").is_err());
    }

    #[test]
    fn test_audit_line() {
        let config = ServerConfig::from_yaml_str("audit: lock get").unwrap();
        let flags = config.audit_flags().unwrap();
        assert!(flags.audits("lock"));
        assert!(flags.audits("get"));
        assert!(!flags.audits("edit-config"));
    }
}
