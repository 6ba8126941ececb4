//! Serial Transport Simulator - Main Entry Point

use serial_sim::{init_logging, load_settings, run_session};
use std::path::PathBuf;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings_path = std::env::args_os().nth(1).map(PathBuf::from);
    let settings = load_settings(settings_path.as_deref())?;
    init_logging(settings.log_level()?);

    info!("=== Serial transport simulator v{} ===", env!("CARGO_PKG_VERSION"));

    let report = run_session(&settings);
    info!(
        "Bit clock reload {:#04X} ({}), status {}",
        report.reload,
        if report.detected { "detected" } else { "fixed fallback" },
        report.status
    );
    println!("{}", String::from_utf8_lossy(&report.wire));

    Ok(())
}
