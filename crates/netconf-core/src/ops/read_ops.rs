use netconf_core_types::RequestContext;

use super::{logged, require_session, NetconfAgent};
use crate::defaults::WithDefaults;
use crate::errors::Result;
use crate::model::ResultTree;
use crate::result::full_tree;
use crate::session::Datastore;
use crate::subtree::{match_subtree, FilterNode};
use crate::view::TreeView;
use crate::xpath;

/// The `<filter>` of a read
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Filter {
    /// No filter: the whole datastore
    #[default]
    None,
    Subtree(Vec<FilterNode>),
    XPath {
        select: String,
        /// Prefix bindings in scope on the `<filter>` element
        namespaces: Vec<(String, String)>,
    },
}

/// `<get>`: configuration and state
///
/// # Errors
/// * `InvalidSession` - the calling session is not open
/// * `InUse` - another session holds the running lock
/// * `XPathSyntax` / `NotReadable` - filter failures
pub fn get(
    agent: &NetconfAgent,
    ctx: &RequestContext,
    filter: &Filter,
    with_defaults: WithDefaults,
) -> Result<ResultTree> {
    logged("get", ctx, || read(agent, ctx, filter, with_defaults, false))
}

/// `<get-config>`: configuration only
///
/// # Errors
/// As `get`; the source must be `running`.
pub fn get_config(
    agent: &NetconfAgent,
    ctx: &RequestContext,
    source: Datastore,
    filter: &Filter,
    with_defaults: WithDefaults,
) -> Result<ResultTree> {
    logged("get_config", ctx, || {
        tracing::debug!(datastore = source.as_str(), "get-config source");
        read(agent, ctx, filter, with_defaults, true)
    })
}

fn read(
    agent: &NetconfAgent,
    ctx: &RequestContext,
    filter: &Filter,
    with_defaults: WithDefaults,
    config_only: bool,
) -> Result<ResultTree> {
    require_session(&agent.sessions, ctx)?;
    agent.sessions.check_access(ctx.session_id, Datastore::Running)?;

    let view = TreeView::new(&agent.schema, &agent.store, with_defaults.view_options(config_only));
    let tree = match filter {
        Filter::None => full_tree(view)?,
        Filter::Subtree(nodes) => match_subtree(view, nodes)?,
        Filter::XPath { select, namespaces } => xpath::select(view, select, namespaces)?,
    };
    let tree = with_defaults.render(&agent.schema, tree);
    tracing::debug!(
        component = "read",
        node_count = tree.roots().iter().map(|r| r.count()).sum::<usize>(),
        with_defaults = with_defaults.as_str(),
        "read complete"
    );
    Ok(tree)
}
