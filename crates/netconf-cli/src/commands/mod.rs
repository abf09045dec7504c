//! Subcommands

pub mod edit;
pub mod get;
pub mod rpc;

use std::path::Path;

use netconf_core::ops::NetconfAgent;
use netconf_core::types::RequestContext;
use netconf_core::xml::{parse_document, XmlElement, XmlWriter, NETCONF_BASE_NS};
use netconf_core::{Peer, ResultTree};

/// Load `seed` and open a local session on it
fn open(seed: &Path) -> netconf_core::Result<(NetconfAgent, RequestContext)> {
    let mut agent = netconf_store::load_seed_file(seed)?.into_agent(1);
    let id = agent.sessions_mut().open(Peer::new("cli").with_transport("cli"))?;
    Ok((agent, RequestContext::new(id)))
}

/// Parse `body` inside a base-namespace `<name>` wrapper
fn wrapped(name: &str, body: &str) -> netconf_core::Result<XmlElement> {
    parse_document(&format!(
        r#"<{name} xmlns="{ns}">{body}</{name}>"#,
        name = name,
        ns = NETCONF_BASE_NS,
        body = body
    ))
}

fn print_tree(tree: &ResultTree) {
    print!("{}", XmlWriter::pretty().write(&tree.to_data_element()));
}
