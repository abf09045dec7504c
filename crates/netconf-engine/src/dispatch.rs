//! Operation dispatch onto the core agent

use netconf_core::errors::Result;
use netconf_core::ops::{self, NetconfAgent};
use netconf_core::types::RequestContext;

use crate::reply::Reply;
use crate::rpc::RpcOperation;

/// What dispatching changed beyond the reply itself
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Effects {
    /// The calling session closed itself
    pub closed: bool,
    /// Session id terminated by `kill-session`
    pub killed: Option<u32>,
}

/// Run one operation for the session in `ctx`
///
/// # Errors
/// Whatever the core operation returns.
pub fn dispatch(
    agent: &mut NetconfAgent,
    ctx: &RequestContext,
    operation: &RpcOperation,
) -> Result<(Reply, Effects)> {
    let mut effects = Effects::default();
    let reply = match operation {
        RpcOperation::Get {
            filter,
            with_defaults,
        } => Reply::Data(ops::get(agent, ctx, filter, *with_defaults)?),
        RpcOperation::GetConfig {
            source,
            filter,
            with_defaults,
        } => Reply::Data(ops::get_config(agent, ctx, *source, filter, *with_defaults)?),
        RpcOperation::EditConfig {
            target,
            default_operation,
            config,
        } => {
            ops::edit_config(agent, ctx, *target, config, *default_operation)?;
            Reply::Ok
        }
        RpcOperation::Lock { target } => {
            ops::lock(agent, ctx, *target)?;
            Reply::Ok
        }
        RpcOperation::Unlock { target } => {
            ops::unlock(agent, ctx, *target)?;
            Reply::Ok
        }
        RpcOperation::KillSession { session_id } => {
            let killed = ops::kill_session(agent, ctx, *session_id)?;
            effects.killed = Some(killed.id.get());
            Reply::Ok
        }
        RpcOperation::CloseSession => {
            ops::close_session(agent, ctx)?;
            effects.closed = true;
            Reply::Ok
        }
    };
    Ok((reply, effects))
}
