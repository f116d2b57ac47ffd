use anyhow::{Context, Result};
use simple_logger::SimpleLogger;

pub fn init(verbosity: u8, quiet: bool) -> Result<()> {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Error)
        .with_module_level("pushsync", level(verbosity, quiet))
        .init()
        .context("cannot set logger")
}

fn level(verbosity: u8, quiet: bool) -> log::LevelFilter {
    match (verbosity, quiet) {
        (_, true) => log::LevelFilter::Error,
        (0, false) => log::LevelFilter::Info,
        (1, false) => log::LevelFilter::Debug,
        (_, false) => log::LevelFilter::Trace,
    }
}
