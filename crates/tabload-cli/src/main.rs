//! tabload: load a folder of delimited files into SQLite.

use std::io::{self, IsTerminal};

use clap::Parser;

use tabload_cli::cli::{Cli, Command, SummaryFormatArg};
use tabload_cli::commands::{run_load, run_schema};
use tabload_cli::logging::init_logging;
use tabload_cli::summary::print_summary;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = cli.log_config(io::stderr().is_terminal());
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match cli.command {
        Command::Load(args) => match run_load(&args) {
            Ok(report) => {
                match args.summary {
                    SummaryFormatArg::Table => print_summary(&report),
                    SummaryFormatArg::Json => match serde_json::to_string_pretty(&report) {
                        Ok(json) => println!("{json}"),
                        Err(error) => eprintln!("error: failed to encode summary: {error}"),
                    },
                }
                if report.has_failures() { 1 } else { 0 }
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::Schema(args) => match run_schema(&args) {
            Ok(0) => 0,
            Ok(_) => 1,
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
    };
    std::process::exit(exit_code);
}
