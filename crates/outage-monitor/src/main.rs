use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use outage_monitor::config::debug_requested;
use outage_monitor::{build_notifier, Args, Monitor, MonitorConfig, RunError, RunReport};
use outage_source::{OutageClient, SourceConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let filter = if debug_requested(&args) {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(args).await {
        Ok(report) => info!(
            payloads = report.payloads,
            incidents = report.incidents,
            new = report.new,
            restored = report.restored,
            updated = report.updated,
            notice = report.notice,
            delivery = ?report.delivery,
            "Run complete"
        ),
        Err(e) => error!(error = %e, "Unexpected error"),
    }

    // Scheduled runs must not be marked failed by the scheduler.
    ExitCode::SUCCESS
}

async fn run(args: Args) -> Result<RunReport, RunError> {
    let config = MonitorConfig::from_args(args)?;
    info!(
        partitions = ?config.partition_ids,
        state = %config.state_path.display(),
        transport = ?config.transport,
        "Starting outage monitor"
    );

    let source = OutageClient::new(SourceConfig::from_env()?)?;

    let notifier = match build_notifier(config.transport) {
        Ok(notifier) => Some(notifier),
        Err(e) => {
            warn!(error = %e, "Notification transport unavailable; changes will only be logged");
            None
        }
    };

    let monitor = Monitor::new(config, Box::new(source), notifier);
    monitor.run_once().await
}
