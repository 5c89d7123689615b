//! `photobooth-agent` -- printer agent for the booth.
//!
//! Runs next to a photo printer, polls the cloud print queue, renders each
//! claimed photo onto the print page and hands it to the OS spooler.
//! Outcomes are reported back to the queue.
//!
//! # Environment variables
//!
//! | Variable             | Required | Default     | Description                              |
//! |----------------------|----------|-------------|------------------------------------------|
//! | `CLOUD_BASE_URL`     | yes      | --          | API base URL, e.g. `https://booth.example.com` |
//! | `PRINT_AGENT_KEY`    | yes      | --          | Shared key matching the server's         |
//! | `PRINT_AGENT_ID`     | no       | `agent`     | Identifier reported with each claim      |
//! | `POLL_INTERVAL_MS`   | no       | `1500`      | Delay between polls when idle            |
//! | `HTTP_TIMEOUT_SECS`  | no       | `30`        | Bound on each queue or image request     |
//! | `DEFAULT_PRINTER`    | no       | --          | Printer name passed as `lp -d`           |
//! | `PRINT_COMMAND`      | no       | `lp`        | Print program                            |
//! | `PRINT_TIMEOUT_SECS` | no       | `120`       | Kill the print command after this long   |
//! | `SPOOL_DIR`          | no       | OS temp dir | Where rendered pages are written         |

use photobooth_agent::client::QueueClient;
use photobooth_agent::config::AgentConfig;
use photobooth_agent::poll::PollLoop;
use photobooth_agent::printer::CommandPrinter;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "photobooth_agent=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AgentConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid agent configuration");
        std::process::exit(1);
    });

    if let Err(e) = std::fs::create_dir_all(&config.spool_dir) {
        tracing::error!(
            spool_dir = %config.spool_dir.display(),
            error = %e,
            "Cannot create spool directory",
        );
        std::process::exit(1);
    }

    tracing::info!(
        agent_id = %config.agent_id,
        cloud_base_url = %config.cloud_base_url,
        printer = config.default_printer.as_deref().unwrap_or("(system default)"),
        poll_interval_ms = config.poll_interval.as_millis() as u64,
        http_timeout_secs = config.http_timeout.as_secs(),
        print_timeout_secs = config.print_timeout.as_secs(),
        "Starting photobooth-agent",
    );

    let queue = QueueClient::new(
        config.cloud_base_url.clone(),
        config.agent_key.clone(),
        config.agent_id.clone(),
        config.http_timeout,
    )
    .unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to build HTTP client");
        std::process::exit(1);
    });
    let printer = CommandPrinter::new(
        config.print_command.clone(),
        config.default_printer.clone(),
        config.print_timeout,
    );
    let poll_loop = PollLoop::new(queue, printer, config.spool_dir.clone(), config.poll_interval);

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, finishing current job");
            cancel.cancel();
        }
    });

    poll_loop.run(cancel).await;
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
