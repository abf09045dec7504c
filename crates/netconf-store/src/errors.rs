//! Error handling for netconf-store
//!
//! Seed problems surface as core `NetconfError::Config` values

use netconf_core::errors::NetconfError;

pub type Result<T> = std::result::Result<T, NetconfError>;

/// A seed that parsed but does not describe a usable store
pub fn seed_validation(origin: &str, reason: impl Into<String>) -> NetconfError {
    NetconfError::Config {
        origin: origin.to_string(),
        reason: reason.into(),
    }
}

pub fn io_error(origin: &str, err: std::io::Error) -> NetconfError {
    NetconfError::Config {
        origin: origin.to_string(),
        reason: format!("failed to read: {}", err),
    }
}

pub fn yaml_error(origin: &str, err: serde_yaml::Error) -> NetconfError {
    NetconfError::Config {
        origin: origin.to_string(),
        reason: format!("YAML parse error: {}", err),
    }
}
