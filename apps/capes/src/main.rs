//! # Capes - Character Catalogue Server
//!
//! The main binary for the Capes character catalogue.
//!
//! This application provides:
//! - HTTP REST API server (axum-based)
//! - CLI interface for catalogue operations
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │           apps/capes (THE BINARY)           │
//! │                                             │
//! │   ┌─────────────┐      ┌─────────────┐      │
//! │   │    CLI      │      │  HTTP API   │      │
//! │   │   (clap)    │      │   (axum)    │      │
//! │   └──────┬──────┘      └──────┬──────┘      │
//! │          └──────────┬─────────┘             │
//! │                     ▼                       │
//! │             ┌───────────────┐               │
//! │             │  capes-core   │               │
//! │             │  (THE LOGIC)  │               │
//! │             └───────────────┘               │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! capes server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! capes create -f spider-man.json
//! capes list --filter universe=DC --ordering -power_level
//! capes top --limit 5
//! ```

use capes::cli;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // CAPES_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("CAPES_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "capes=info,tower_http=debug".into());

    // Logs go to stderr so command output on stdout stays parseable.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Capes startup banner.
fn print_banner() {
    println!(
        r#"
   ██████╗ █████╗ ██████╗ ███████╗███████╗
  ██╔════╝██╔══██╗██╔══██╗██╔════╝██╔════╝
  ██║     ███████║██████╔╝█████╗  ███████╗
  ██║     ██╔══██║██╔═══╝ ██╔══╝  ╚════██║
  ╚██████╗██║  ██║██║     ███████╗███████║
   ╚═════╝╚═╝  ╚═╝╚═╝     ╚══════╝╚══════╝

  Character Catalogue v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
