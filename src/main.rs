//! Binary entry point for `wdh`.

use clap::Parser as _;
use colored::Colorize as _;

use wallet_daemon_helper::cli_app::{self, Cli};

fn main() {
    let cli = Cli::parse();
    if let Err(error) = cli_app::run(&cli) {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
