use camino::Utf8Path;
use miette::{miette, IntoDiagnostic, Result, WrapErr};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_FILTER: &str = "gxa_packer=info,gxa_texpak=info";

/// Install the global subscriber.
///
/// Events go to stderr, filtered by `RUST_LOG` when set. With `log_file` they
/// are also appended to that file without color codes. Keep the returned guard
/// alive until exit so the file writer is flushed.
pub fn init_logging(log_file: Option<&Utf8Path>) -> Result<Option<WorkerGuard>> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_FILTER.into());

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let (file_guard, file_layer) = match log_file {
        Some(path) => {
            let file_name = path
                .file_name()
                .ok_or_else(|| miette!("Log file path has no file name: {path}"))?;
            let dir = match path.parent() {
                Some(parent) if !parent.as_str().is_empty() => parent,
                _ => Utf8Path::new("."),
            };
            std::fs::create_dir_all(dir)
                .into_diagnostic()
                .with_context(|| format!("Failed to create log directory: {dir}"))?;

            let file_appender = tracing_appender::rolling::never(dir, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false);
            (Some(guard), Some(layer))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(file_guard)
}
