//! Netconf Store - seed files for the agent core
//!
//! Provides:
//! - Seed Format v0 (YAML) describing modules, schema, initial data and proxy mounts
//! - Parser with validation
//! - Loader building a `SchemaRegistry` and a populated `LocalStore`

pub mod errors;
pub mod seed;

pub use errors::Result;
pub use seed::{load_seed_file, load_seed_str, Seeded};
