mod cli;

use colored::Colorize;
use tracing_subscriber::EnvFilter;

fn main() {
    // Initialize logging; SHAPECAST_LOG=debug shows parse/inference/emit steps
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env("SHAPECAST_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let command_line_interface = cli::CommandLineInterface::load();
    if let Err(error) = command_line_interface.run() {
        eprintln!("{} {error:#}", "error:".red().bold());
        std::process::exit(1);
    }
}
