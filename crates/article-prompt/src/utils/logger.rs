use anyhow::Result;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing::Subscriber;
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

const DEFAULT_FILTER: &str = "warn,article_prompt=info";

/// Install the global tracing subscriber.
///
/// Diagnostics go to stderr so stdout carries only the presenter output.
/// `LOG_FORMAT=json` switches to JSON lines, `LOG_DIR` adds a daily rolling file.
pub fn init_logger() -> Result<()> {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let filter = EnvFilter::try_new(&log_level)?;

    let log_dir = std::env::var("LOG_DIR").ok().filter(|d| !d.trim().is_empty());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true)
                        .with_thread_ids(true),
                )
                .with(file_layer(log_dir.as_deref())?)
                .try_init()?;
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .compact()
                        .with_writer(std::io::stderr)
                        .with_target(false)
                        .with_level(true),
                )
                .with(file_layer(log_dir.as_deref())?)
                .try_init()?;
        }
    }

    Ok(())
}

/// Plain-text file layer, enabled only when a log directory is configured
fn file_layer<S>(log_dir: Option<&str>) -> Result<Option<impl Layer<S>>>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let Some(dir) = log_dir else {
        return Ok(None);
    };

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("article-prompt")
        .filename_suffix("log")
        .build(dir)?;

    Ok(Some(
        fmt::layer()
            .with_writer(file_appender)
            .with_target(true)
            .with_level(true)
            .with_ansi(false), // No colors in file
    ))
}
