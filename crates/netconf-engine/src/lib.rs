//! Netconf Engine - the RPC and session front
//!
//! Parses `<rpc>` documents, runs them against a shared agent and renders
//! `<rpc-reply>` documents. Also owns the server configuration and the
//! audit log.
//!
//! ## Logging Ownership
//!
//! The core operations log `start`/`end`/`end_error` for every RPC. This
//! layer adds session lifecycle events and audit records on the
//! `netconf::audit` target.

pub mod audit;
pub mod config;
pub mod dispatch;
pub mod reply;
pub mod rpc;
pub mod server;

pub use audit::{AuditFlags, AuditLog};
pub use config::ServerConfig;
pub use rpc::{Request, RpcOperation};
pub use server::{Server, SessionHandle};
