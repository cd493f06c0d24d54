//! # CountNow
//!
//! The main binary for the CountNow counter.
//!
//! This application provides:
//! - HTTP REST API server (axum-based) with a realtime session feed
//! - CLI interface for stored sessions, rooms and input replay
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │              apps/countnow (THE BINARY)       │
//! │                                               │
//! │   ┌─────────────┐        ┌─────────────┐      │
//! │   │   CLI       │        │   HTTP API  │      │
//! │   │  (clap)     │        │   (axum)    │      │
//! │   └──────┬──────┘        └──────┬──────┘      │
//! │          └───────────┬──────────┘             │
//! │                      ▼                        │
//! │              ┌───────────────┐                │
//! │              │ countnow-core │                │
//! │              │  (THE LOGIC)  │                │
//! │              └───────────────┘                │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! countnow server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! countnow sessions list
//! countnow results AB12CD
//! countnow simulate --script "down:touch@0,up:touch@1100"
//! ```

use clap::Parser;
use countnow::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // COUNTNOW_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("COUNTNOW_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let default_filter = if cli.verbose {
        "countnow=debug,countnow_core=debug,tower_http=debug"
    } else {
        "countnow=info,tower_http=debug"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

fn print_banner() {
    println!(
        r#"
  +-----------------------------+
  |  C O U N T   N O W   v{:<6}|
  +-----------------------------+
  Tap to count, hold to count faster
"#,
        env!("CARGO_PKG_VERSION")
    );
}
