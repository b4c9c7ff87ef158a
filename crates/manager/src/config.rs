//! Runtime configuration for the security manager.

use protocol::PROTOCOL_VERSION_2;

use crate::pipeline::PipelineConfig;

/// Name of the configuration section the manager's settings live under.
pub const CONFIG_SECTION: &str = "Security Manager";

/// Default name of the pipeline worker thread.
pub const DEFAULT_WORKER_NAME: &str = "SecurityManager";

/// Immutable configuration handed to [`crate::SecurityManager::new`].
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ManagerConfig {
    worker_name: String,
    queue_capacity: Option<usize>,
    protocol_version: u8,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        ManagerConfigBuilder::default().build()
    }
}

impl ManagerConfig {
    /// Creates a new [`ManagerConfigBuilder`].
    #[must_use]
    pub fn builder() -> ManagerConfigBuilder {
        ManagerConfigBuilder::default()
    }

    /// Name given to the pipeline worker thread.
    #[must_use]
    pub fn worker_name(&self) -> &str {
        &self.worker_name
    }

    /// Maximum number of queued inbound queries, or `None` for no limit.
    #[must_use]
    pub const fn queue_capacity(&self) -> Option<usize> {
        self.queue_capacity
    }

    /// Protocol version stamped on outbound messages.
    #[must_use]
    pub const fn protocol_version(&self) -> u8 {
        self.protocol_version
    }

    /// Settings for the inbound pipeline derived from this configuration.
    #[must_use]
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            worker_name: self.worker_name.clone(),
            queue_capacity: self.queue_capacity,
        }
    }
}

/// Builder used to assemble a [`ManagerConfig`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ManagerConfigBuilder {
    worker_name: String,
    queue_capacity: Option<usize>,
    protocol_version: u8,
}

impl Default for ManagerConfigBuilder {
    fn default() -> Self {
        Self {
            worker_name: DEFAULT_WORKER_NAME.to_owned(),
            queue_capacity: None,
            protocol_version: PROTOCOL_VERSION_2,
        }
    }
}

impl ManagerConfigBuilder {
    /// Names the pipeline worker thread.
    #[must_use]
    pub fn worker_name(mut self, name: impl Into<String>) -> Self {
        self.worker_name = name.into();
        self
    }

    /// Bounds the inbound queue; posts beyond `capacity` are dropped.
    #[must_use]
    pub const fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    /// Removes any queue bound.
    #[must_use]
    pub const fn unbounded_queue(mut self) -> Self {
        self.queue_capacity = None;
        self
    }

    #[must_use]
    pub const fn protocol_version(mut self, version: u8) -> Self {
        self.protocol_version = version;
        self
    }

    /// Finalises the builder and constructs the [`ManagerConfig`].
    #[must_use]
    pub fn build(self) -> ManagerConfig {
        ManagerConfig {
            worker_name: self.worker_name,
            queue_capacity: self.queue_capacity,
            protocol_version: self.protocol_version,
        }
    }
}
