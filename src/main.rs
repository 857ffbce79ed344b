//! AtmosGuard: personalized sun-protection advice in the terminal.
//!
//! Main entry point for the terminal application.

use anyhow::Result;
use std::io::IsTerminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use atmosguard::adapters::sanitize::SanitizingMakeWriter;
use atmosguard::tui::App;
use atmosguard::AppConfig;

fn main() -> Result<()> {
    // Initialize logging.
    //
    // Writing logs to the terminal corrupts the TUI (alternate screen), so an
    // interactive session logs to a file and a non-interactive one to stdout.
    let log_mode = std::env::var("ATMOSGUARD_LOG_MODE").unwrap_or_else(|_| "auto".to_string());

    let interactive = std::io::stdout().is_terminal();
    let use_file = match log_mode.as_str() {
        "file" => true,
        "stdout" => false,
        // auto
        _ => interactive,
    };

    let (writer, _guard) = if use_file {
        let log_file = std::env::var("ATMOSGUARD_LOG_FILE")
            .unwrap_or_else(|_| "atmosguard.log".to_string());

        if let Some(parent) = std::path::Path::new(&log_file).parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stdout())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(SanitizingMakeWriter::new(writer)))
        .init();

    let config = AppConfig::from_env();
    tracing::info!("Starting AtmosGuard with {:?}", config);

    let mut app = App::new(&config)?;
    app.run()?;

    tracing::info!("AtmosGuard shutdown complete.");
    Ok(())
}
