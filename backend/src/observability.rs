//! Tracing subscriber setup shared by binaries.

use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// Install a JSON subscriber filtered by `RUST_LOG`.
///
/// A subscriber installed earlier (for example by a test harness) is left in
/// place.
pub fn init_tracing() {
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(%error, "tracing init failed");
    }
}
