use call_monitor::monitor;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    tracing::info!("Call Monitor v{}", env!("CARGO_PKG_VERSION"));

    match monitor::execute(|key| std::env::var(key).ok(), monitor::connect).await {
        Ok(report) => {
            tracing::info!(
                flagged = report.flagged(),
                notified = report.notified,
                "Run finished"
            );
        }
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(e.exit_code());
        }
    }
}
