use tracing_subscriber::{prelude::*, util::SubscriberInitExt, EnvFilter};

/// Log to stderr, filtered by `RUST_LOG`.
///
/// Records from the `log` facade are forwarded too.
pub fn init() {
    tracing_subscriber::Registry::default()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(std::io::stderr)
                .with_filter(EnvFilter::from_default_env()),
        )
        .init();
}
