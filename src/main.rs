use clap::Parser;
use jira_3lo::cli::{self, Cli};
use jira_3lo::config::load_config;
use jira_3lo::logger::setup_logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref()).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {}", e);
        std::process::exit(1);
    });
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    // Keep the guard alive to ensure log messages are flushed
    let guard = setup_logging(&config).unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    });

    if let Err(e) = cli::run(cli.command, &config).await {
        tracing::error!("{}", e);
        drop(guard);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
