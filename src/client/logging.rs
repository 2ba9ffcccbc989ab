// Logging configuration for the Dice Poker client

use std::path::PathBuf;
use std::sync::OnceLock;

use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

// Keep the guards alive for the lifetime of the program
static LOG_GUARD: OnceLock<Vec<WorkerGuard>> = OnceLock::new();

/// Parse a level name, falling back to INFO
fn parse_level(level: &str) -> LevelFilter {
    level.trim().parse::<LevelFilter>().unwrap_or(LevelFilter::INFO)
}

/// Build the filter: `RUST_LOG` when set, the configured level otherwise
fn build_filter(level: &str, rust_log: Option<&str>) -> EnvFilter {
    let builder =
        EnvFilter::builder().with_default_directive(Directive::from(parse_level(level)));
    builder.parse_lossy(rust_log.map(str::trim).unwrap_or_default())
}

/// Initialize logging with optional console and file outputs.
///
/// # Arguments
/// * `enable_console` - If true, logs will be written to stderr
/// * `log_file_path` - If Some, logs will be written to this file
/// * `level` - Default level when `RUST_LOG` is not set
///
/// Nothing is installed when both outputs are off, so the terminal stays clean.
pub fn init_logging(enable_console: bool, log_file_path: Option<PathBuf>, level: &str) {
    if !enable_console && log_file_path.is_none() {
        return;
    }

    let mut guards = Vec::new();

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(level, rust_log.as_deref());

    // Create file layer if path is provided
    let file_layer = log_file_path.and_then(|path| {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name = path.file_name()?.to_str()?.to_string();

        let file_appender = tracing_appender::rolling::never(parent, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        guards.push(guard);

        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(false),
        )
    });

    // Create console layer if enabled
    let console_layer = if enable_console {
        let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stderr());
        guards.push(guard);

        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(false),
        )
    } else {
        None
    };

    // Build and set the subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init();

    // Store guards to keep logging alive
    let _ = LOG_GUARD.set(guards);
}
