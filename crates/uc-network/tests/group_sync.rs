//! End-to-end: two `GroupPublisher`s discover each other over mDNS and
//! exchange a publish, mirroring the teacher's `mdns_e2e_discovers_peers`
//! shape (spawn two adapters, wait for discovery, assert behavior) but
//! carried through to an actual publish/ack round trip.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::time::{sleep, timeout};
use uc_core::clipboard::{ClipboardContent, ContentType};
use uc_core::config::SyncConfig;
use uc_core::device::DeviceId;
use uc_core::ports::PublisherPort;
use uc_network::GroupPublisher;

fn sync_config() -> SyncConfig {
    SyncConfig {
        enabled: true,
        default_group: "default".into(),
        max_item_size: 10 * 1024 * 1024,
        allowed_types: None,
        excluded_types: Vec::new(),
        include_patterns: Vec::new(),
        exclude_patterns: Vec::new(),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn publish_is_delivered_to_a_peer_in_the_same_group() {
    let sender = GroupPublisher::spawn(sync_config()).expect("spawn sender");
    let receiver = GroupPublisher::spawn(sync_config()).expect("spawn receiver");

    sender.join("default").await.unwrap();
    receiver.join("default").await.unwrap();

    let received: Arc<Mutex<Option<ClipboardContent>>> = Arc::new(Mutex::new(None));
    let received_clone = received.clone();
    receiver.on_inbound(Arc::new(move |_group, content| {
        *received_clone.lock().expect("received mutex poisoned") = Some(content);
    }));

    // mDNS discovery over loopback needs a moment to settle.
    sleep(Duration::from_millis(500)).await;

    let content = ClipboardContent::new(b"hello from sender".to_vec(), ContentType::Text, Utc::now(), DeviceId::new());

    let publish_result = timeout(Duration::from_secs(10), async {
        loop {
            match sender.publish("default", &content).await {
                Ok(()) => return,
                Err(_) => sleep(Duration::from_millis(200)).await,
            }
        }
    })
    .await;

    assert!(publish_result.is_ok(), "publish did not succeed within the discovery+ack window");

    sleep(Duration::from_millis(200)).await;
    let got = received.lock().expect("received mutex poisoned").clone();
    assert_eq!(got.map(|c| c.data), Some(b"hello from sender".to_vec()));
}
