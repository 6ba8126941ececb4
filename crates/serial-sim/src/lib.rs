//! Serial Transport Simulator
//!
//! Runs baud-rate calibration against a synthetic peer and an echo session
//! through the interrupt-driven transport, all on the host.

mod session;
mod settings;

pub use session::{run_session, SessionReport};
pub use settings::{load_settings, SettingsError, SimSettings, ENV_PREFIX};

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Initialize logging
pub fn init_logging(level: Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}
