//! The no-op publisher (spec.md §4.D): used when `sync.enabled = false`.
//! Logs and discards; `join`/`leave` only track local state so `sync.status`
//! still reports something sensible while disabled.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tracing::debug;
use uc_core::clipboard::ClipboardContent;
use uc_core::ports::errors::CoreError;
use uc_core::ports::{InboundHandler, PublisherPort};
use uc_core::sync::GroupMembership;

#[derive(Default)]
pub struct NoopPublisher {
    groups: RwLock<GroupMembership>,
}

impl NoopPublisher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PublisherPort for NoopPublisher {
    async fn publish(&self, group: &str, content: &ClipboardContent) -> Result<(), CoreError> {
        debug!(group, hash = %content.hash, "sync disabled, dropping publish");
        Ok(())
    }

    async fn join(&self, group: &str) -> Result<(), CoreError> {
        self.groups.write().expect("group membership lock poisoned").join(group.to_string());
        Ok(())
    }

    async fn leave(&self, group: &str) -> Result<(), CoreError> {
        self.groups.write().expect("group membership lock poisoned").leave(group);
        Ok(())
    }

    async fn list_groups(&self) -> Result<Vec<String>, CoreError> {
        Ok(self.groups.read().expect("group membership lock poisoned").list())
    }

    fn on_inbound(&self, _handler: InboundHandler) {
        // No transport, so no inbound events ever occur.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uc_core::clipboard::ContentType;
    use uc_core::device::DeviceId;

    #[tokio::test]
    async fn publish_always_succeeds_and_joins_are_tracked_locally() {
        let publisher = NoopPublisher::new();
        let content = ClipboardContent::new(b"hi".to_vec(), ContentType::Text, Utc::now(), DeviceId::new());
        assert!(publisher.publish("default", &content).await.is_ok());
        publisher.join("team").await.unwrap();
        assert_eq!(publisher.list_groups().await.unwrap(), vec!["team".to_string()]);
        publisher.leave("team").await.unwrap();
        assert!(publisher.list_groups().await.unwrap().is_empty());
    }
}
