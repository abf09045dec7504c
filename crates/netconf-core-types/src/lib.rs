//! Primitive types shared by the NETCONF engine crates
//!
//! - **Correlation types**: `SessionId`, `RequestId`, `RequestContext`
//! - **Sensitive data**: `Sensitive<T>` keeps usernames and addresses out of log output
//! - **Schema constants**: canonical structured-logging field keys and event names

pub mod correlation;
pub mod schema;
pub mod sensitive;

pub use correlation::{RequestContext, RequestId, SessionId};
pub use sensitive::Sensitive;
