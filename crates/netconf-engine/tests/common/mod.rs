#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;

use netconf_core::xml::NETCONF_BASE_NS;
use netconf_engine::{Server, ServerConfig, SessionHandle};

pub const SEED: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../netconf-store/tests/fixtures/animals.yaml"
);

pub const TESTING_NS: &str = "http://test.com/ns/yang/testing";

/// A server over the animals seed
pub fn server_with(config: ServerConfig) -> Server {
    let seeded = netconf_store::load_seed_file(Path::new(SEED)).unwrap();
    let agent = seeded.into_agent(config.max_sessions);
    Server::new(config, agent)
}

pub fn server() -> Server {
    server_with(ServerConfig::default())
}

pub fn session(server: &Server) -> SessionHandle {
    server.open_session("admin", None).unwrap()
}

pub fn session_from(server: &Server, remote: &str) -> SessionHandle {
    let addr: SocketAddr = remote.parse().unwrap();
    server.open_session("admin", Some(addr)).unwrap()
}

/// Wrap `body` in an `<rpc>` envelope
pub fn rpc(message_id: &str, body: &str) -> String {
    format!(
        r#"<rpc xmlns="{}" message-id="{}">{}</rpc>"#,
        NETCONF_BASE_NS, message_id, body
    )
}

pub fn get_xpath(select: &str) -> String {
    format!(r#"<get><filter type="xpath" select="{}"/></get>"#, select)
}

pub fn edit(config: &str) -> String {
    format!(
        r#"<edit-config><target><running/></target><config>{}</config></edit-config>"#,
        config
    )
}

pub fn settings(body: &str) -> String {
    format!(
        r#"<test xmlns="{}"><settings>{}</settings></test>"#,
        TESTING_NS, body
    )
}

pub const LOCK: &str = "<lock><target><running/></target></lock>";
pub const UNLOCK: &str = "<unlock><target><running/></target></unlock>";

pub fn error_tag(reply: &str) -> Option<&str> {
    let start = reply.find("<error-tag>")? + "<error-tag>".len();
    let end = reply[start..].find("</error-tag>")? + start;
    Some(&reply[start..end])
}

pub fn is_ok(reply: &str) -> bool {
    reply.contains("<ok/>") && !reply.contains("<rpc-error>")
}
