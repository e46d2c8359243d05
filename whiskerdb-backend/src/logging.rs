use camino::Utf8Path;

/// Without a log directory, human-readable output for interactive runs;
/// with one, JSON lines in a daily-rolling `whiskerdb.log`.
pub fn initialize_logging(log_dir: Option<&Utf8Path>) {
    use tracing::Level;
    use tracing_subscriber::{filter::Targets, prelude::*};

    let log_layer = tracing_subscriber::fmt::layer();

    match log_dir {
        None => {
            let dev_log_filter = Targets::new()
                .with_target("whiskerdb_backend", Level::DEBUG)
                .with_target("whiskerdb_core", Level::DEBUG);
            let log_layer = log_layer.pretty().with_filter(dev_log_filter);

            tracing_subscriber::registry().with(log_layer).init();
        }
        Some(path) => {
            let log_writer = tracing_appender::rolling::daily(path, "whiskerdb.log");
            let batch_log_filter = Targets::new()
                .with_target("whiskerdb_backend", Level::INFO)
                .with_target("whiskerdb_core", Level::INFO);
            let log_layer = log_layer
                .json()
                .with_writer(log_writer)
                .with_filter(batch_log_filter);

            tracing_subscriber::registry().with(log_layer).init();
        }
    }
}
