//! Hireflow command-line client.

mod cli;

use clap::Parser;
use tracing::{error, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Install rustls crypto provider (required for rustls 0.23+)
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        warn!("rustls crypto provider already installed");
    }

    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    if let Err(e) = cli::run(cli).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

/// Pretty output by default, JSON with `LOG_FORMAT=json`.
fn init_tracing(level: Option<&str>) {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let default_directive = format!("hire={}", level.unwrap_or("warn"));
    let env_filter = match default_directive.parse() {
        Ok(directive) => EnvFilter::from_default_env().add_directive(directive),
        Err(_) => EnvFilter::from_default_env(),
    };

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .with_writer(std::io::stderr),
            )
            .with(env_filter)
            .init();
    }
}
