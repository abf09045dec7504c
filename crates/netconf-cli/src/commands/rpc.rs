//! Rpc command
//!
//! Usage: netconf rpc --seed <FILE> <RPC_FILE>...

use clap::Args;
use std::path::PathBuf;

use netconf_engine::{Server, ServerConfig};

#[derive(Debug, Args)]
pub struct RpcArgs {
    /// Seed YAML file holding the schema and running data
    #[arg(long)]
    pub seed: PathBuf,

    /// Server config YAML; defaults apply when omitted
    #[arg(long)]
    pub server_config: Option<PathBuf>,

    /// Files each holding one <rpc> document, handled in order
    #[arg(required = true)]
    pub rpc_files: Vec<PathBuf>,
}

/// Execute rpc command
pub fn execute(args: RpcArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.server_config {
        Some(path) => ServerConfig::load_file(path)?,
        None => ServerConfig::default(),
    };
    config.seed = Some(args.seed);
    let server = Server::from_config(config)?;
    let session = server.open_session("cli", None)?;

    for path in &args.rpc_files {
        let document = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
        println!("{}", session.handle(&document));
    }

    Ok(())
}
