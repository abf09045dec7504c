//! RPC operations
//!
//! One function per NETCONF operation, each taking the agent and the
//! request context. Every operation logs `start` and then `end` or
//! `end_error`, checks the calling session is open, and honours the
//! running-datastore lock.

pub mod agent;
pub mod edit_ops;
pub mod read_ops;
pub mod session_ops;

pub use agent::NetconfAgent;
pub use edit_ops::edit_config;
pub use read_ops::{get, get_config, Filter};
pub use session_ops::{close_session, kill_session, lock, unlock};

use std::time::Instant;

use netconf_core_types::RequestContext;

use crate::errors::{NetconfError, Result};
use crate::session::SessionManager;

/// Run `body` between the operation's start and end events
pub(crate) fn logged<T>(
    op: &'static str,
    ctx: &RequestContext,
    body: impl FnOnce() -> Result<T>,
) -> Result<T> {
    let start = Instant::now();
    let session_id = ctx.session_id.get();
    let request_id = ctx.request_id.as_str();
    crate::log_op_start!(op, session_id = session_id, request_id = request_id);
    let out = body();
    let duration_ms = start.elapsed().as_millis() as u64;
    match &out {
        Ok(_) => {
            crate::log_op_end!(
                op,
                duration_ms = duration_ms,
                session_id = session_id,
                request_id = request_id
            );
        }
        Err(err) => {
            crate::log_op_error!(
                op,
                err,
                duration_ms = duration_ms,
                session_id = session_id,
                request_id = request_id
            );
        }
    }
    out
}

pub(crate) fn require_session(sessions: &SessionManager, ctx: &RequestContext) -> Result<()> {
    if sessions.is_open(ctx.session_id) {
        Ok(())
    } else {
        Err(NetconfError::InvalidSession {
            session_id: ctx.session_id.get(),
        })
    }
}
