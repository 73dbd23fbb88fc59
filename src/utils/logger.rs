use crate::config::{LogConfig, LogFormat};
use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn default_filter(verbose: bool) -> EnvFilter {
    let directives = if verbose {
        "api_etl_connector=debug,etl_connector=debug,info"
    } else {
        "api_etl_connector=info,etl_connector=info,warn"
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives))
}

/// Installs the console + append-only file sinks for the whole run.
///
/// The returned guard flushes the file writer on drop, so `main` keeps it alive until exit.
/// Calling this twice fails because a global subscriber is already set.
pub fn init_logger(config: &LogConfig) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(&config.log_dir).with_context(|| {
        format!("Failed to create log directory {}", config.log_dir.display())
    })?;

    // rolling::never 以附加模式開啟單一檔案
    let file_appender = tracing_appender::rolling::never(&config.log_dir, &config.log_file);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = default_filter(config.verbose);

    match config.format {
        LogFormat::Text => {
            let console_layer = fmt::layer()
                .with_writer(std::io::stdout)
                .with_target(false)
                .with_thread_ids(false)
                .compact();
            let file_layer = fmt::layer()
                .with_writer(file_writer)
                .with_target(false)
                .with_ansi(false);

            tracing_subscriber::registry()
                .with(filter)
                .with(console_layer)
                .with(file_layer)
                .try_init()
                .context("Failed to install tracing subscriber")?;
        }
        LogFormat::Json => {
            let console_layer = fmt::layer()
                .with_writer(std::io::stdout)
                .with_target(false)
                .json();
            let file_layer = fmt::layer()
                .with_writer(file_writer)
                .with_target(false)
                .with_ansi(false)
                .json();

            tracing_subscriber::registry()
                .with(filter)
                .with(console_layer)
                .with(file_layer)
                .try_init()
                .context("Failed to install tracing subscriber")?;
        }
    }

    Ok(guard)
}
