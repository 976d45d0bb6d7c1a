// CLI module
// Command-line interface and argument parsing

mod args;
mod commands;

pub use args::{to_batch_config, CliArgs, Command, PageArgs};
pub use commands::execute;

use clap::Parser;

/// Parse command-line arguments using clap
///
/// Invalid arguments and `--help` are handled by clap, which prints the
/// message and exits the process.
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}
