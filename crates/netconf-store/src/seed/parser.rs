//! Seed parser with validation
//!
//! Parses YAML and validates the parts of a seed that do not need the
//! schema: version, module identities and mount points

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use netconf_core::DataPath;

use crate::errors::{io_error, seed_validation, yaml_error, Result};
use crate::seed::format_v0::SeedV0;

/// Parse a seed file from a path
pub fn parse_seed_file(path: &Path) -> Result<SeedV0> {
    let origin = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|e| io_error(&origin, e))?;
    parse(&content, &origin)
}

/// Parse a seed from a string
pub fn parse_seed_str(content: &str) -> Result<SeedV0> {
    parse(content, "<seed>")
}

fn parse(content: &str, origin: &str) -> Result<SeedV0> {
    let seed: SeedV0 = serde_yaml::from_str(content).map_err(|e| yaml_error(origin, e))?;
    validate_seed(&seed, origin)?;
    Ok(seed)
}

fn validate_seed(seed: &SeedV0, origin: &str) -> Result<()> {
    if seed.schema_version != 0 {
        return Err(seed_validation(
            origin,
            format!("unsupported schema_version {}, expected 0", seed.schema_version),
        ));
    }

    if seed.modules.is_empty() {
        return Err(seed_validation(origin, "no modules declared"));
    }
    let mut names = HashSet::new();
    let mut namespaces = HashSet::new();
    for m in &seed.modules {
        if !names.insert(m.name.as_str()) {
            return Err(seed_validation(origin, format!("duplicate module '{}'", m.name)));
        }
        if !namespaces.insert(m.namespace.as_str()) {
            return Err(seed_validation(
                origin,
                format!("duplicate module namespace '{}'", m.namespace),
            ));
        }
    }
    if let Some(default) = &seed.default_module {
        if !names.contains(default.as_str()) {
            return Err(seed_validation(
                origin,
                format!("unknown default module '{}'", default),
            ));
        }
    }

    let mut mount_points = HashSet::new();
    for mount in &seed.mounts {
        let at = DataPath::parse(&mount.path)
            .map_err(|e| seed_validation(origin, format!("mount '{}': {}", mount.path, e)))?;
        if at.is_root() {
            return Err(seed_validation(origin, "cannot mount at the root"));
        }
        if !mount_points.insert(at) {
            return Err(seed_validation(
                origin,
                format!("duplicate mount '{}'", mount.path),
            ));
        }
    }

    Ok(())
}
