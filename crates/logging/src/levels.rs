//! crates/logging/src/levels.rs
//! Subsystems of the security manager and their tracing targets.

use tracing::level_filters::LevelFilter;

/// Target used for wire query parsing and serialization.
pub const QUERY_TARGET: &str = "security::query";
/// Target used for handshake coordination.
pub const HANDSHAKE_TARGET: &str = "security::handshake";
/// Target used for listener registration and notification.
pub const LISTENER_TARGET: &str = "security::listener";
/// Target used for the inbound message pipeline.
pub const PIPELINE_TARGET: &str = "security::pipeline";

/// Diagnostic categories emitted by the security manager.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Subsystem {
    /// Query framing and error reports.
    Query,
    /// Handshake state machine.
    Handshake,
    /// Listener registry.
    Listener,
    /// Inbound message pipeline.
    Pipeline,
}

impl Subsystem {
    /// Every subsystem in declaration order.
    pub const ALL: [Subsystem; 4] = [
        Subsystem::Query,
        Subsystem::Handshake,
        Subsystem::Listener,
        Subsystem::Pipeline,
    ];

    /// Returns the tracing target events of this subsystem are emitted under.
    #[must_use]
    pub const fn target(self) -> &'static str {
        match self {
            Self::Query => QUERY_TARGET,
            Self::Handshake => HANDSHAKE_TARGET,
            Self::Listener => LISTENER_TARGET,
            Self::Pipeline => PIPELINE_TARGET,
        }
    }

    /// Returns the short subsystem name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Handshake => "handshake",
            Self::Listener => "listener",
            Self::Pipeline => "pipeline",
        }
    }

    /// Maps a tracing target back to its subsystem.
    ///
    /// Accepts the full target (`security::handshake`), any path ending in
    /// the subsystem segment, or the bare name.
    #[must_use]
    pub fn from_target(target: &str) -> Option<Self> {
        let last = target.rsplit("::").next().unwrap_or(target);
        Self::ALL.into_iter().find(|subsystem| subsystem.name() == last)
    }
}

/// Renders a level filter the way `EnvFilter` directives spell it.
#[must_use]
pub(crate) fn directive_level(level: LevelFilter) -> &'static str {
    if level == LevelFilter::OFF {
        "off"
    } else if level == LevelFilter::ERROR {
        "error"
    } else if level == LevelFilter::WARN {
        "warn"
    } else if level == LevelFilter::INFO {
        "info"
    } else if level == LevelFilter::DEBUG {
        "debug"
    } else {
        "trace"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_target_accepts_full_and_bare_names() {
        assert_eq!(
            Subsystem::from_target("security::handshake"),
            Some(Subsystem::Handshake)
        );
        assert_eq!(Subsystem::from_target("pipeline"), Some(Subsystem::Pipeline));
        assert_eq!(
            Subsystem::from_target("vendor::security::listener"),
            Some(Subsystem::Listener)
        );
    }

    #[test]
    fn from_target_rejects_partial_matches() {
        assert_eq!(Subsystem::from_target("security::queryx"), None);
        assert_eq!(Subsystem::from_target("unknown"), None);
    }

    #[test]
    fn targets_round_trip() {
        for subsystem in Subsystem::ALL {
            assert_eq!(Subsystem::from_target(subsystem.target()), Some(subsystem));
        }
    }

    #[test]
    fn directive_level_uses_lowercase_names() {
        assert_eq!(directive_level(LevelFilter::OFF), "off");
        assert_eq!(directive_level(LevelFilter::WARN), "warn");
        assert_eq!(directive_level(LevelFilter::TRACE), "trace");
    }
}
