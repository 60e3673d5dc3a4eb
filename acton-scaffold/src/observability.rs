//! Logging setup for scaffold tools

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use tracing_subscriber::util::TryInitError;

/// Install the global subscriber
///
/// Honours `RUST_LOG`. Without it, debug builds log `debug` (and `trace` for
/// this crate) with pretty formatting; release builds log `info` as JSON.
/// `verbose` raises the release default to `debug`.
///
/// # Example
///
/// ```rust,no_run
/// use acton_scaffold::observability;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// observability::init(false)?;
/// tracing::info!("Scaffolding started");
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init(verbose: bool) -> Result<(), TryInitError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            EnvFilter::new("debug,acton_scaffold=trace")
        } else if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    #[cfg(debug_assertions)]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init()
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    }
}
