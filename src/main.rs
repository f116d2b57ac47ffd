mod command;
mod config;
mod executor;
mod handlebars;
mod logger;
mod options;
mod sync;

use anyhow::{Context, Result};
use clap::Parser;
use executor::ShellExecutor;
use log::info;
use options::Options;

fn main() -> Result<()> {
    let opts = Options::parse();

    logger::init(opts.verbosity, opts.quiet)?;

    let config = config::load_config(&opts.config)?;

    let handlebars = handlebars::create_new_handlebars();
    let transfer_options = config
        .transfer_options(opts.proxy, &handlebars)
        .context("prepare transfer options")?;
    info!("using proxy: {}", transfer_options.proxy_command.is_some());

    // per-host failures are only logged
    sync::sync_group(&config, &opts.group, &mut ShellExecutor, &transfer_options)?;

    Ok(())
}
