use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Default filter: debug when `SAB_DEBUG=TRUE`, info otherwise.
pub fn default_filter(config: &Config) -> &'static str {
    if config.debug { "sakebomb=debug" } else { "sakebomb=info" }
}

/// Installs a JSON `tracing` subscriber on stderr.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(config)));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
