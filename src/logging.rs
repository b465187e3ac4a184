use tracing_subscriber::{fmt, EnvFilter};

/// Console logging to stderr, filtered by `RUST_LOG` when set.
pub fn init_logging() {
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("neighborhood_enrich=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
