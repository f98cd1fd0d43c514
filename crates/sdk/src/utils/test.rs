use tracing::{dispatcher::DefaultGuard, subscriber::set_default};
use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber for the current thread, filtered by `RUST_LOG`
/// or by `default_directives` if it is not set.
pub fn setup_fmt_tracing(default_directives: &str) -> DefaultGuard {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .finish();
    set_default(subscriber)
}
