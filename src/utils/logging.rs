use std::fmt;
use std::path::PathBuf;

use tracing_appender::non_blocking::{NonBlockingBuilder, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::Layer as FmtLayer;
use tracing_subscriber::{prelude::*, registry::Registry, EnvFilter};

use super::app_config::AppConfig;
use super::error::Result;

pub mod prelude {
    pub use tracing::{debug, error, info, trace, warn};
    pub use tracing::{debug_span, error_span, info_span, trace_span, warn_span};
    pub use tracing::{event, instrument, span};
}

/// Keeps the non-blocking log writers flushing; hold this in `main` for the
/// lifetime of the process.
pub struct GlobalLoggingContext {
    _worker_guards: Vec<WorkerGuard>,
}

/// Install the global subscriber: filter directives from the config (or
/// `RUST_LOG` when set), timestamps on stderr, and an optional file sink.
pub fn setup() -> Result<GlobalLoggingContext> {
    let cfg = AppConfig::get::<LoggingConfig>("logging").unwrap_or_default();

    let filter = if std::env::var(EnvFilter::DEFAULT_ENV).is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(cfg.directives.as_deref().unwrap_or("info"))
    };

    let mut guards = Vec::new();

    let (stderr_writer, guard) = NonBlockingBuilder::default()
        .lossy(false)
        .finish(std::io::stderr());
    guards.push(guard);
    let stderr_layer = FmtLayer::default()
        .with_ansi(true)
        .with_target(false)
        .with_timer(ISOTimeFormat)
        .with_writer(stderr_writer);

    let registry = Registry::default().with(filter).with(stderr_layer);
    match &cfg.file {
        Some(sink) => {
            let appender = RollingFileAppender::new(Rotation::NEVER, &sink.directory, &sink.name);
            let (writer, guard) = NonBlockingBuilder::default().lossy(false).finish(appender);
            guards.push(guard);
            let file_layer = FmtLayer::default()
                .with_ansi(false)
                .with_target(false)
                .with_timer(ISOTimeFormat)
                .with_writer(writer);
            registry.with(file_layer).try_init()?;
        }
        None => registry.try_init()?,
    }

    Ok(GlobalLoggingContext {
        _worker_guards: guards,
    })
}

struct ISOTimeFormat;

impl FormatTime for ISOTimeFormat {
    fn format_time(&self, w: &mut dyn fmt::Write) -> fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

// ====== Logging Config ======

#[derive(Debug, Default, serde::Deserialize)]
struct LoggingConfig {
    #[serde(default)]
    directives: Option<String>,
    #[serde(default)]
    file: Option<FileSink>,
}

#[derive(Debug, serde::Deserialize)]
struct FileSink {
    directory: PathBuf,
    name: PathBuf,
}
