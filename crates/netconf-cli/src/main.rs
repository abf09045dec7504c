//! NETCONF CLI
//!
//! Runs filters, edits and raw RPCs against a seeded datastore

use clap::{Parser, Subcommand};
use netconf_core::logging_facility::{self, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "netconf")]
#[command(about = "NETCONF filtering and editing against a seeded datastore", long_about = None)]
struct Cli {
    /// Logging profile written to stderr (development, production)
    #[arg(long, global = true)]
    log: Option<Profile>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Read data through a subtree or XPath filter
    Get(commands::get::GetArgs),
    /// Apply an edit-config to the running datastore
    Edit(commands::edit::EditArgs),
    /// Run raw <rpc> documents through one session
    Rpc(commands::rpc::RpcArgs),
}

fn main() {
    let cli = Cli::parse();
    if let Some(profile) = cli.log {
        logging_facility::init(profile);
    }

    let result = match cli.command {
        Commands::Get(args) => commands::get::execute(args),
        Commands::Edit(args) => commands::edit::execute(args),
        Commands::Rpc(args) => commands::rpc::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
