use netconf_core_types::RequestContext;

use super::{logged, require_session, NetconfAgent};
use crate::errors::Result;
use crate::session::{Datastore, Session};

/// `<lock>`
///
/// # Errors
/// * `InvalidSession` - the calling session is not open
/// * `LockDenied` - the lock is held, error-info names the holder
pub fn lock(agent: &mut NetconfAgent, ctx: &RequestContext, target: Datastore) -> Result<()> {
    logged("lock", ctx, || agent.sessions.lock(ctx.session_id, target))
}

/// `<unlock>`
///
/// # Errors
/// * `InvalidSession` - the calling session is not open
/// * `OperationFailed` - no lock, or the lock belongs to another session
pub fn unlock(agent: &mut NetconfAgent, ctx: &RequestContext, target: Datastore) -> Result<()> {
    logged("unlock", ctx, || agent.sessions.unlock(ctx.session_id, target))
}

/// `<kill-session>`: ends another session and drops its locks
///
/// Returns the killed session so the caller can tear down its transport.
///
/// # Errors
/// * `InvalidSession` - caller not open, or `target` is 0 or unknown
/// * `SelfKill` - `target` is the caller
pub fn kill_session(agent: &mut NetconfAgent, ctx: &RequestContext, target: u32) -> Result<Session> {
    logged("kill_session", ctx, || {
        require_session(&agent.sessions, ctx)?;
        let killed = agent.sessions.kill(ctx.session_id, target)?;
        tracing::info!(
            component = "session",
            session_id = ctx.session_id.get(),
            killed = killed.id.get(),
            "session killed"
        );
        Ok(killed)
    })
}

/// `<close-session>`: ends the caller's own session
///
/// # Errors
/// * `InvalidSession` - the calling session is not open
pub fn close_session(agent: &mut NetconfAgent, ctx: &RequestContext) -> Result<Session> {
    logged("close_session", ctx, || agent.sessions.close(ctx.session_id))
}
