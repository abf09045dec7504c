use netconf_core_types::RequestContext;

use super::{logged, require_session, NetconfAgent};
use crate::adapter::Changes;
use crate::edit::{self, EditOperation};
use crate::errors::Result;
use crate::session::Datastore;
use crate::xml::XmlElement;

/// `<edit-config>` against `target`
///
/// All or nothing: on error the datastore is as it was.
///
/// # Errors
/// * `InvalidSession` - the calling session is not open
/// * `InUse` - another session holds the running lock
/// * every edit failure of `edit::edit_config`
pub fn edit_config(
    agent: &mut NetconfAgent,
    ctx: &RequestContext,
    target: Datastore,
    config: &XmlElement,
    default_operation: EditOperation,
) -> Result<Changes> {
    logged("edit_config", ctx, || {
        require_session(&agent.sessions, ctx)?;
        agent.sessions.check_access(ctx.session_id, target)?;
        let changes = edit::edit_config(&mut agent.store, &agent.schema, config, default_operation)?;
        tracing::debug!(
            component = "edit",
            change_count = changes.len(),
            default_operation = default_operation.as_str(),
            "edit committed"
        );
        Ok(changes)
    })
}
