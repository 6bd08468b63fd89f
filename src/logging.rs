use std::io::IsTerminal;

use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
    Compact,
}

impl LogFormat {
    /// Unknown names fall back to `Pretty`.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            "compact" => LogFormat::Compact,
            _ => LogFormat::Pretty,
        }
    }
}

/// Directive for a configured level name; unknown names mean `info`.
pub fn level_directive(level: &str) -> &'static str {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" | "warning" => "warn",
        "error" => "error",
        "off" | "none" => "off",
        _ => "info",
    }
}

/// `RUST_LOG` when set, otherwise the configured level.
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_directive(level)))
}

fn use_color(color: &str) -> bool {
    match color.trim().to_ascii_lowercase().as_str() {
        "always" => true,
        "never" => false,
        _ => std::io::stderr().is_terminal(),
    }
}

/// Subscriber writing to stderr, configured from `LOG_LEVEL`, `LOG_FORMAT`
/// and `LOG_COLOR`. Nothing is installed globally.
pub fn build_subscriber(level: &str, format: &str, color: &str) -> Box<dyn Subscriber + Send + Sync> {
    build_subscriber_with(env_filter(level), LogFormat::parse(format), use_color(color), std::io::stderr)
}

pub fn build_subscriber_with<W>(
    filter: EnvFilter,
    format: LogFormat,
    ansi: bool,
    writer: W,
) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi);

    match format {
        LogFormat::Json => Box::new(builder.json().finish()),
        LogFormat::Compact => Box::new(builder.compact().finish()),
        LogFormat::Pretty => Box::new(builder.pretty().finish()),
    }
}
