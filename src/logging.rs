//! Internal logging bootstrap for Boxtree.
//!
//! This module initializes the logging configuration at startup. The behavior is
//! controlled by the `DEBUG_BOXTREE` environment variable. If `DEBUG_BOXTREE` is not set
//! or is set to a falsy value ("0", "false", or empty), logging remains disabled.
//! Otherwise, logging is enabled with a maximum level of DEBUG.

#[cfg(feature = "setup_tracing")]
use ctor::ctor;
#[cfg(feature = "setup_tracing")]
use tracing::Level;

#[cfg(feature = "setup_tracing")]
#[ctor]
fn set_debug_level() {
    if std::env::var("DEBUG_BOXTREE").map_or(true, |v| v == "0" || v == "false" || v.is_empty()) {
        // Logging stays disabled; tracing macros are no-ops without a subscriber.
    } else {
        tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .init();
    }
}
