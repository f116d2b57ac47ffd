use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Default, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Options {
    #[clap(short, long, value_parser, default_value = "pushsync/config.yaml")]
    pub config: PathBuf,

    /// Target group to sync
    #[clap(short, long, value_parser, default_value = "default")]
    pub group: String,

    /// Tunnel the ssh transport through the configured proxy
    #[clap(short, long, value_parser)]
    pub proxy: bool,

    #[clap(short, long, value_parser)]
    pub quiet: bool,

    #[clap(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}
