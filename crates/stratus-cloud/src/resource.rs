//! Resource lifecycle trait definition

use crate::error::{CloudError, Result};
use crate::schema::ResourceSchema;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20 * 60);

/// Lifecycle contract for a single managed resource type
///
/// Every adapter (GuardDuty invite accepter, S3 bucket object, ...) implements
/// this trait. The orchestrating layer owns diffing and state storage; an
/// adapter only turns a desired configuration into remote calls and reports
/// back what the remote side looks like.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Desired configuration
    type Config: Send + Sync;

    /// Recorded state
    type State: Send + Sync;

    /// Returns the resource type name (e.g., "aws_s3_bucket_object")
    fn type_name(&self) -> &'static str;

    /// Field schema exposed to the orchestrating layer
    fn schema(&self) -> ResourceSchema;

    /// Per-operation time budgets
    fn timeouts(&self) -> &Timeouts;

    /// Identity key of a recorded state
    fn id(&self, state: &Self::State) -> String;

    /// Create the remote entity and return its state
    async fn create(&self, config: &Self::Config) -> Result<Self::State>;

    /// Refresh state from the remote side
    ///
    /// `Ok(None)` means the entity no longer exists and the recorded state
    /// should be dropped.
    async fn read(&self, state: &Self::State) -> Result<Option<Self::State>>;

    /// Apply a changed configuration in place
    async fn update(&self, _state: &Self::State, _config: &Self::Config) -> Result<Self::State> {
        Err(CloudError::Validation(format!(
            "{} does not support in-place updates; changes require replacement",
            self.type_name()
        )))
    }

    /// Remove the remote entity
    async fn delete(&self, state: &Self::State) -> Result<()>;
}

/// Time budget per lifecycle operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeouts {
    pub create: Duration,
    pub read: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            create: DEFAULT_TIMEOUT,
            read: DEFAULT_TIMEOUT,
            update: DEFAULT_TIMEOUT,
            delete: DEFAULT_TIMEOUT,
        }
    }
}

impl Timeouts {
    pub fn with_create(mut self, create: Duration) -> Self {
        self.create = create;
        self
    }
}
