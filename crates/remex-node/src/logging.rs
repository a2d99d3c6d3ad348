use crate::config::LoggingConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the logging system based on configuration.
pub fn init_logging(config: &LoggingConfig, cli_verbose: u8) -> anyhow::Result<()> {
    let log_level = match cli_verbose {
        0 => config.level.as_str(),
        1 => "debug",
        _ => "trace",
    };

    let filter =
        EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()));

    let subscriber = tracing_subscriber::registry().with(filter);
    let console_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    if let Some(file_path) = &config.file_output {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        let file_layer = fmt::layer().with_writer(file).with_ansi(false);
        subscriber.with(console_layer).with(file_layer).init();
    } else {
        subscriber.with(console_layer).init();
    }

    Ok(())
}
