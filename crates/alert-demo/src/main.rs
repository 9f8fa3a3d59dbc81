//! Security Alert Demo - Main Entry Point

use alert_demo::{init_logging, run};
use provisioning::{DemoConfig, LogFormat};
use std::process::ExitCode;
use tracing::{error, info, warn};

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    warn!("Ctrl-C received, stopping and cleaning up");
}

#[tokio::main]
async fn main() -> ExitCode {
    let demo = match DemoConfig::load() {
        Ok(demo) => demo,
        Err(e) => {
            init_logging(LogFormat::Text);
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    init_logging(demo.log_format);

    info!("=== Security Alert Demo v{} ===", env!("CARGO_PKG_VERSION"));

    match run(&demo, shutdown_signal()).await {
        Ok(report) if report.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
