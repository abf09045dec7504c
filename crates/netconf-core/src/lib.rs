//! NETCONF Core - filtering and editing engine
//!
//! This crate answers the data operations of a NETCONF (RFC 6241) agent
//! over a hierarchical path/value store:
//! - Subtree and XPath 1.0 filters, rebuilt into reply trees
//! - edit-config with merge/replace/create/delete/remove semantics,
//!   validated against the schema and committed all-or-nothing
//! - with-defaults rendering (RFC 6243)
//! - Sessions, the running-datastore lock and RFC 6022 statistics
//!
//! Stores are reached through `PathAdapter`, so a subtree may be
//! delegated to a remote store transparently.

pub mod adapter;
pub mod defaults;
pub mod edit;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod ops;
pub mod result;
pub mod session;
pub mod subtree;
pub mod view;
pub mod xml;
pub mod xpath;

pub use netconf_core_types as types;

// Re-export commonly used types
pub use adapter::{Changes, LocalStore, PathAdapter, RemoteAdapter};
pub use defaults::WithDefaults;
pub use edit::EditOperation;
pub use errors::{ErrorTag, ErrorType, NcError, NetconfError, Result};
pub use model::{DataPath, ResultNode, ResultTree, SchemaNode, SchemaRegistry};
pub use ops::{Filter, NetconfAgent};
pub use session::{Datastore, Peer, SessionManager};
pub use view::{TreeView, ViewOptions};
