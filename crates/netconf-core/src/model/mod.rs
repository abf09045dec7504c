pub mod path;
pub mod schema;
pub mod tree;

pub use path::{entry_keys, entry_segment, escape_key, unescape_key, DataPath};
pub use schema::{Module, NodeKind, Resolved, SchemaNode, SchemaRegistry, SchemaRegistryBuilder};
pub use tree::{ResultNode, ResultTree};
