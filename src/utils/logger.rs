use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One compact line per event on stdout, for an operator at the terminal.
    Compact,
    /// JSON lines on stderr, so scan output on stdout stays clean.
    Json,
}

/// Directives used when `RUST_LOG` is unset. HTTP client internals stay at
/// `warn` even in verbose mode.
fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "warn,scout_scan=debug"
    } else {
        "warn,scout_scan=info"
    }
}

pub fn init_logger(format: LogFormat, verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Compact => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(verbose)
                    .compact(),
            )
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .json(),
            )
            .init(),
    }
}
