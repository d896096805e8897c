//! Tracing initialisation for tests.

use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber on the test writer, filtered by `RUST_LOG`
/// (default `info`). Later calls are ignored.
///
/// ```ignore
/// #[test]
/// fn completes_after_alias() {
///     nans_test_utils::tracing_setup::init_test_tracing();
///     // RUST_LOG=nans_core=debug shows completion dispatch
/// }
/// ```
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}
