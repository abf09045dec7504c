//! Get command
//!
//! Usage: netconf get --seed <FILE> [--subtree <XML> | --xpath <EXPR>]
//! [--config-only] [--with-defaults <MODE>]

use clap::Args;
use std::path::PathBuf;

use netconf_core::subtree::parse_filter;
use netconf_core::{ops, Datastore, Filter, WithDefaults};

#[derive(Debug, Args)]
pub struct GetArgs {
    /// Seed YAML file holding the schema and running data
    #[arg(long)]
    pub seed: PathBuf,

    /// Subtree filter content
    #[arg(long, conflicts_with = "xpath")]
    pub subtree: Option<String>,

    /// XPath 1.0 select expression
    #[arg(long)]
    pub xpath: Option<String>,

    /// Leave out state data (get-config)
    #[arg(long)]
    pub config_only: bool,

    /// explicit, trim or report-all
    #[arg(long, default_value = "explicit")]
    pub with_defaults: WithDefaults,
}

/// Execute get command
pub fn execute(args: GetArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (agent, ctx) = super::open(&args.seed)?;

    let filter = match (&args.subtree, &args.xpath) {
        (Some(xml), _) => Filter::Subtree(parse_filter(&super::wrapped("filter", xml)?)?),
        (None, Some(select)) => Filter::XPath {
            select: select.clone(),
            namespaces: Vec::new(),
        },
        (None, None) => Filter::None,
    };

    let tree = if args.config_only {
        ops::get_config(&agent, &ctx, Datastore::Running, &filter, args.with_defaults)?
    } else {
        ops::get(&agent, &ctx, &filter, args.with_defaults)?
    };
    super::print_tree(&tree);

    Ok(())
}
