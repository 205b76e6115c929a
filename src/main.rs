mod cmd;

use clap::Parser;

use crate::cmd::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    // --verbose enables debug messages; RUST_LOG overrides
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_module("bdnet", level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .init();

    match cli.command {
        Commands::Show(a) => a.run(),
        Commands::Dump(a) => a.run(),
    }
}
