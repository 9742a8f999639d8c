use crate::errors::{AzflowError, Result};
use tracing_subscriber::EnvFilter;

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Returns the filter directives for a `-v` count.
///
/// `0` logs progress at info, `1` adds per-stage debug events and `2` or
/// more traces everything azflow emits.
#[must_use]
pub fn default_directives(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn,azflow=info",
        1 => "warn,azflow=debug",
        _ => "info,azflow=trace",
    }
}

/// Installs the global subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence over `verbosity` when set.
pub fn init_tracing(verbosity: u8, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(verbosity)));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
    };
    installed.map_err(|e| AzflowError::Config(format!("unable to install log subscriber: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directives_by_verbosity() {
        assert_eq!(default_directives(0), "warn,azflow=info");
        assert_eq!(default_directives(1), "warn,azflow=debug");
        assert_eq!(default_directives(5), "info,azflow=trace");
    }

    #[test]
    fn test_directives_parse() {
        for verbosity in 0..3 {
            assert!(default_directives(verbosity).parse::<EnvFilter>().is_ok());
        }
    }

    #[test]
    fn test_second_init_fails_cleanly() {
        let _ = init_tracing(0, LogFormat::Text);
        assert!(init_tracing(0, LogFormat::Json).is_err());
    }
}
