//! Edit command
//!
//! Usage: netconf edit --seed <FILE> --config <XML> [--default-operation <OP>]

use clap::Args;
use std::path::PathBuf;

use netconf_core::{ops, Datastore, EditOperation, Filter, WithDefaults};

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Seed YAML file holding the schema and running data
    #[arg(long)]
    pub seed: PathBuf,

    /// Content of the <config> element
    #[arg(long)]
    pub config: String,

    /// merge, replace or none
    #[arg(long, default_value = "merge")]
    pub default_operation: String,
}

/// Execute edit command; prints the running configuration afterwards
pub fn execute(args: EditArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (mut agent, ctx) = super::open(&args.seed)?;
    let default_operation = EditOperation::from_default(&args.default_operation)?;
    let config = super::wrapped("config", &args.config)?;

    let changes = ops::edit_config(&mut agent, &ctx, Datastore::Running, &config, default_operation)?;
    eprintln!("Applied {} change(s)", changes.len());

    let tree = ops::get_config(&agent, &ctx, Datastore::Running, &Filter::None, WithDefaults::Explicit)?;
    super::print_tree(&tree);

    Ok(())
}
