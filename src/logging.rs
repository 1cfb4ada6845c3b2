//! Diagnostic log setup for binaries. The library only emits `tracing` events.

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Install a stderr subscriber. Unknown or missing levels fall back to WARN
/// so stdout stays clean for JSON output.
pub fn init_logging(log_level: Option<&str>) {
    let level = log_level
        .and_then(|s| s.parse::<Level>().ok())
        .unwrap_or(Level::WARN);

    let _ = FmtSubscriber::builder()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}
