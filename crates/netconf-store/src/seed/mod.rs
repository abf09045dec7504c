//! Seed import
//!
//! Provides:
//! - Seed Format v0 schema
//! - YAML parser with validation
//! - Loader producing the schema registry and the running store

pub mod format_v0;
pub mod loader;
pub mod parser;

pub use format_v0::{SeedModule, SeedMount, SeedNode, SeedNodeKind, SeedV0};
pub use loader::{build_schema, load_seed, load_seed_file, load_seed_str, Seeded};
pub use parser::{parse_seed_file, parse_seed_str};
