//! Command-line front end for `image-aging`.

#[macro_use]
extern crate derivative;

mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use env_logger::Env;

/// Sets up a logger that prints a timestamp, level, file name and line
/// before each message. `verbose` lowers the default filter to debug.
fn init_logger(verbose: bool) {
    use std::io::Write;

    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format(|buf, record| {
            let style = buf.default_level_style(record.level());
            let ts = cutil::time::local_now("%H:%M:%S");

            writeln!(
                buf,
                "[{} {style}{}{style:#} {} {}] {}",
                ts,
                record.level(),
                record
                    .file()
                    .unwrap_or("None")
                    .split('/')
                    .next_back()
                    .unwrap_or("None"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;

    match &cli.command {
        Commands::Age {
            inputs,
            output,
            archive,
            options,
        } => commands::age(
            &config,
            inputs,
            output.as_deref(),
            archive.as_deref(),
            options,
        ),
        Commands::Samples {
            output,
            count,
            options,
        } => commands::samples(&config, output.as_deref(), *count, options),
        Commands::Config { options } => commands::print_config(&config, options),
    }
}
