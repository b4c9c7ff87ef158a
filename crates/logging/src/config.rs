//! crates/logging/src/config.rs
//! Per-subsystem verbosity configuration.

use tracing::level_filters::LevelFilter;

use super::levels::{Subsystem, directive_level};

/// Level filters for the security manager's subsystems.
///
/// `default` applies to every target outside the security manager; the
/// per-subsystem fields override it for their own targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogConfig {
    /// Level for targets that are not a [`Subsystem`].
    pub default: LevelFilter,
    /// Level for [`Subsystem::Query`].
    pub query: LevelFilter,
    /// Level for [`Subsystem::Handshake`].
    pub handshake: LevelFilter,
    /// Level for [`Subsystem::Listener`].
    pub listener: LevelFilter,
    /// Level for [`Subsystem::Pipeline`].
    pub pipeline: LevelFilter,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::from_verbose_level(0)
    }
}

impl LogConfig {
    /// Creates a configuration from a verbosity count (`-v` repetitions).
    ///
    /// - `0`: warnings and errors only.
    /// - `1`: informational entry points.
    /// - `2`: debug output for query framing and handshakes.
    /// - `3` and above: trace output everywhere.
    #[must_use]
    pub fn from_verbose_level(level: u8) -> Self {
        match level {
            0 => Self::uniform(LevelFilter::WARN),
            1 => Self::uniform(LevelFilter::INFO),
            2 => Self {
                query: LevelFilter::DEBUG,
                handshake: LevelFilter::DEBUG,
                ..Self::uniform(LevelFilter::INFO)
            },
            _ => Self::uniform(LevelFilter::TRACE),
        }
    }

    /// Creates a configuration that uses `level` for every target.
    #[must_use]
    pub const fn uniform(level: LevelFilter) -> Self {
        Self {
            default: level,
            query: level,
            handshake: level,
            listener: level,
            pipeline: level,
        }
    }

    /// Returns the level configured for `subsystem`.
    #[must_use]
    pub const fn level(&self, subsystem: Subsystem) -> LevelFilter {
        match subsystem {
            Subsystem::Query => self.query,
            Subsystem::Handshake => self.handshake,
            Subsystem::Listener => self.listener,
            Subsystem::Pipeline => self.pipeline,
        }
    }

    /// Returns the configuration with `subsystem` set to `level`.
    #[must_use]
    pub const fn with_level(mut self, subsystem: Subsystem, level: LevelFilter) -> Self {
        match subsystem {
            Subsystem::Query => self.query = level,
            Subsystem::Handshake => self.handshake = level,
            Subsystem::Listener => self.listener = level,
            Subsystem::Pipeline => self.pipeline = level,
        }
        self
    }

    /// Renders the configuration as `EnvFilter` directives.
    ///
    /// Subsystems matching the default level are omitted.
    #[must_use]
    pub fn directives(&self) -> String {
        let mut directives = String::from(directive_level(self.default));
        for subsystem in Subsystem::ALL {
            let level = self.level(subsystem);
            if level != self.default {
                directives.push(',');
                directives.push_str(subsystem.target());
                directives.push('=');
                directives.push_str(directive_level(level));
            }
        }
        directives
    }
}
