#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` names the tracing targets the security manager emits under and
//! turns a verbosity setting into a subscriber filter.
//!
//! # Design
//!
//! Every event carries one of four targets, one per [`Subsystem`]. A
//! [`LogConfig`] holds a level per subsystem plus a default for foreign
//! targets and renders them as `EnvFilter` directives. Hosts that do not
//! install their own subscriber can call [`init_tracing`].
//!
//! # Examples
//!
//! ```
//! use logging::{LogConfig, Subsystem};
//!
//! let config = LogConfig::from_verbose_level(2);
//! assert_eq!(Subsystem::from_target("security::handshake"), Some(Subsystem::Handshake));
//! assert!(config.directives().contains("security::handshake=debug"));
//! ```

mod config;
mod levels;
mod tracing_bridge;
mod tracing_macros;

pub use config::LogConfig;
pub use levels::{HANDSHAKE_TARGET, LISTENER_TARGET, PIPELINE_TARGET, QUERY_TARGET, Subsystem};
pub use tracing::level_filters::LevelFilter;
pub use tracing_bridge::{InitError, env_filter, init_tracing};
