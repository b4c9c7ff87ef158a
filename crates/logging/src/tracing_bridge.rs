//! crates/logging/src/tracing_bridge.rs
//! Installation of the process-wide tracing subscriber.
//!
//! Applications own the subscriber; the security manager only emits events.
//! [`init_tracing`] is a convenience for hosts and test binaries that want
//! the manager's subsystems filtered according to a [`LogConfig`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use logging::{LogConfig, init_tracing};
//!
//! init_tracing(&LogConfig::from_verbose_level(2))?;
//! tracing::debug!(target: logging::HANDSHAKE_TARGET, "handshake step");
//! ```

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

use super::config::LogConfig;

/// Failures raised while installing the tracing subscriber.
#[derive(Debug, Error)]
pub enum InitError {
    /// The configuration rendered a directive `EnvFilter` refused.
    #[error("invalid log directive: {0}")]
    InvalidDirective(#[from] ParseError),
    /// Another global subscriber is already installed.
    #[error("tracing subscriber already installed: {0}")]
    AlreadyInstalled(#[from] TryInitError),
}

/// Builds the `EnvFilter` matching `config`.
pub fn env_filter(config: &LogConfig) -> Result<EnvFilter, InitError> {
    Ok(EnvFilter::try_new(config.directives())?)
}

/// Installs a formatting subscriber filtered by `config` as the global default.
///
/// Returns [`InitError::AlreadyInstalled`] instead of panicking when a
/// subscriber is already in place.
pub fn init_tracing(config: &LogConfig) -> Result<(), InitError> {
    let filter = env_filter(config)?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()?;
    Ok(())
}
