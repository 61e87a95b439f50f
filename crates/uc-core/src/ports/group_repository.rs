use async_trait::async_trait;

use crate::ports::errors::CoreError;
use crate::sync::GroupMembership;

/// Persists the set of groups the local device participates in. Mutated
/// only via IPC `sync.join`/`sync.leave` (spec.md §3).
#[async_trait]
pub trait GroupRepositoryPort: Send + Sync {
    async fn load(&self) -> Result<GroupMembership, CoreError>;
    async fn join(&self, group: &str) -> Result<(), CoreError>;
    async fn leave(&self, group: &str) -> Result<(), CoreError>;
}
