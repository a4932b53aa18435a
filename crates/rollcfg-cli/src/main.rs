//! rollcfg entry point: argument parsing, logging setup and command dispatch.

use clap::Parser;
use miette::Result;
use rollcfg_cli::{cli, commands, error, logger, ui};

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let result = match args.command {
        cli::Command::Resolve(resolve_args) => commands::resolve_execute(resolve_args, args.quiet),
        cli::Command::Stages => commands::stages_execute(),
    };

    result.map_err(error::cli_error_to_miette)
}
