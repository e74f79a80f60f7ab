//! Diagnostic output on stderr
//!
//! The subscriber is built once by the binary and installed as the default
//! for the current thread only. The runtime is single-threaded, so every
//! pipeline stage logs through it; nothing registers a process-wide global.

use std::io::IsTerminal;

use tracing::level_filters::LevelFilter;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::EnvFilter;

/// Build the stderr subscriber
///
/// `debug` selects the `debug` level, otherwise only warnings and errors are
/// shown. `RUST_LOG` directives are applied on top.
pub fn subscriber(debug: bool) -> impl tracing::Subscriber + Send + Sync + 'static {
    let level = if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .finish()
}

/// Install the subscriber for the current thread; logging stops when the guard drops
pub fn init(debug: bool) -> DefaultGuard {
    tracing::subscriber::set_default(subscriber(debug))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_flag_enables_debug_level() {
        let _guard = init(true);
        assert!(tracing::enabled!(tracing::Level::DEBUG) || std::env::var("RUST_LOG").is_ok());
    }

    #[test]
    fn test_default_level_hides_debug() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let _guard = init(false);
        assert!(!tracing::enabled!(tracing::Level::DEBUG));
        assert!(tracing::enabled!(tracing::Level::WARN));
    }
}
