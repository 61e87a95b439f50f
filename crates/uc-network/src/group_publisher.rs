//! The group publisher (spec.md §4.D): a libp2p-backed `PublisherPort` that
//! discovers peers on the LAN via mDNS and exchanges clips over a
//! request-response protocol. Filtering (`uc_core::ports::sync_filter`) is
//! applied before a publish is ever handed to the swarm task.

use std::sync::Arc;

use async_trait::async_trait;
use libp2p::identity::Keypair;
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::warn;
use uc_core::clipboard::ClipboardContent;
use uc_core::config::SyncConfig;
use uc_core::ports::errors::{CoreError, ErrorKind};
use uc_core::ports::{sync_filter, InboundHandler, PublisherPort};
use uc_core::sync::GroupMembership;

use crate::swarm::{build_swarm, run_swarm, SwarmCommand};
use crate::wire::ClipboardEnvelope;

pub struct GroupPublisher {
    commands: mpsc::Sender<SwarmCommand>,
    groups: Arc<RwLock<GroupMembership>>,
    inbound: Arc<RwLock<Option<InboundHandler>>>,
    sync_config: SyncConfig,
}

impl GroupPublisher {
    /// Generates a fresh libp2p identity, builds and spawns the swarm, and
    /// returns a handle implementing [`PublisherPort`]. The identity is not
    /// persisted: this daemon has no pairing/trust model (out of scope), so
    /// peer identity only needs to be stable for the lifetime of one run.
    pub fn spawn(sync_config: SyncConfig) -> Result<Self, CoreError> {
        let keypair = Keypair::generate_ed25519();
        let swarm = build_swarm(keypair)?;

        let (tx, rx) = mpsc::channel(32);
        let groups = Arc::new(RwLock::new(GroupMembership::default()));
        let inbound = Arc::new(RwLock::new(None));

        tokio::spawn(run_swarm(swarm, rx, groups.clone(), inbound.clone()));

        Ok(Self { commands: tx, groups, inbound, sync_config })
    }
}

#[async_trait]
impl PublisherPort for GroupPublisher {
    async fn publish(&self, group: &str, content: &ClipboardContent) -> Result<(), CoreError> {
        sync_filter::check(&self.sync_config, content)?;

        let envelope = ClipboardEnvelope { group: group.to_string(), content: content.clone() };
        let (respond_to, response) = oneshot::channel();

        self.commands
            .send(SwarmCommand::Publish { group: group.to_string(), envelope, respond_to })
            .await
            .map_err(|_| CoreError::new(ErrorKind::Fatal, "sync", "sync swarm task is not running"))?;

        response
            .await
            .map_err(|_| CoreError::new(ErrorKind::Fatal, "sync", "sync swarm task dropped the publish response"))?
    }

    async fn join(&self, group: &str) -> Result<(), CoreError> {
        self.groups.write().await.join(group.to_string());
        Ok(())
    }

    async fn leave(&self, group: &str) -> Result<(), CoreError> {
        self.groups.write().await.leave(group);
        Ok(())
    }

    async fn list_groups(&self) -> Result<Vec<String>, CoreError> {
        Ok(self.groups.read().await.list())
    }

    fn on_inbound(&self, handler: InboundHandler) {
        let inbound = self.inbound.clone();
        tokio::spawn(async move {
            if inbound.write().await.replace(handler).is_some() {
                warn!("on_inbound called more than once; replacing previous handler");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_sync_config() -> SyncConfig {
        SyncConfig {
            enabled: true,
            default_group: "default".into(),
            max_item_size: 1024 * 1024,
            allowed_types: None,
            excluded_types: Vec::new(),
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn join_and_leave_are_reflected_in_list_groups_without_any_peers() {
        let publisher = GroupPublisher::spawn(base_sync_config()).expect("spawn publisher");
        publisher.join("team").await.unwrap();
        assert_eq!(publisher.list_groups().await.unwrap(), vec!["team".to_string()]);
        publisher.leave("team").await.unwrap();
        assert!(publisher.list_groups().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn publish_with_no_discovered_peers_is_unavailable() {
        use chrono::Utc;
        use uc_core::clipboard::ContentType;
        use uc_core::device::DeviceId;

        let publisher = GroupPublisher::spawn(base_sync_config()).expect("spawn publisher");
        let content = ClipboardContent::new(b"hi".to_vec(), ContentType::Text, Utc::now(), DeviceId::new());
        let err = publisher.publish("default", &content).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unavailable);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn publish_respects_sync_filter_before_touching_the_swarm() {
        use chrono::Utc;
        use uc_core::clipboard::ContentType;
        use uc_core::device::DeviceId;

        let cfg = SyncConfig { max_item_size: 1, ..base_sync_config() };
        let publisher = GroupPublisher::spawn(cfg).expect("spawn publisher");
        let content = ClipboardContent::new(b"too big for the limit".to_vec(), ContentType::Text, Utc::now(), DeviceId::new());
        let err = publisher.publish("default", &content).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TooLarge);
    }
}
