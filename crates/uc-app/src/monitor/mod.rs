//! The clipboard monitor (spec.md §4.E): polls the clipboard adapter for
//! changes, classifies and stores them, publishes to the default sync
//! group, and applies inbound sync events back to the OS clipboard. Grounded
//! in the teacher's `StartClipboardWatcher`/`HandleLocalClipboardChanged`
//! use-case pair: a `tracing::info_span!` around the loop body, a
//! `thiserror` error enum, and a `Arc<dyn Port>`-holding struct rather than
//! free functions closing over globals.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};
use uc_core::clipboard::{classify, ClipboardContent, ContentHash};

use crate::deps::AppDeps;

/// Echo-suppression window: an inbound record applied to the OS clipboard
/// is not re-published if the next local poll observes the same hash
/// within this window (spec.md §4.E).
const ECHO_SUPPRESSION: Duration = Duration::from_secs(5);

/// Three consecutive `Unavailable` polls double the interval, up to this
/// multiple of the configured base (spec.md §4.E).
const MAX_BACKOFF_MULTIPLIER: u32 = 2;
const UNAVAILABLE_STREAK_FOR_BACKOFF: u32 = 3;

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("clipboard store failed: {0}")]
    StoreFailed(String),
}

pub struct ClipboardMonitor {
    deps: AppDeps,
    recent_inbound: Mutex<HashMap<ContentHash, std::time::Instant>>,
}

impl ClipboardMonitor {
    pub fn new(deps: AppDeps) -> Self {
        Self { deps, recent_inbound: Mutex::new(HashMap::new()) }
    }

    /// Registers the inbound sync callback and runs the polling loop until
    /// `shutdown` is cancelled or a storage error makes the loop fatal.
    pub async fn run(self: std::sync::Arc<Self>, shutdown: CancellationToken) -> Result<(), MonitorError> {
        let inbound_self = self.clone();
        self.deps.publisher.on_inbound(std::sync::Arc::new(move |group, content| {
            let inbound_self = inbound_self.clone();
            tokio::spawn(async move {
                inbound_self.handle_inbound(group, content).await;
            });
        }));

        let base_interval = Duration::from_millis(self.deps.config.monitor.polling_interval_ms.max(1));
        let mut interval = base_interval;
        let mut unavailable_streak: u32 = 0;
        let mut last_committed: Option<ContentHash> = None;
        let mut change_token = None;

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!("clipboard monitor stopping");
                    return Ok(());
                }
                _ = tokio::time::sleep(interval) => {}
            }

            let span = info_span!("monitor.poll");
            let outcome = self.poll_once(&mut change_token, &mut last_committed).instrument(span).await;

            match outcome {
                Ok(PollResult::Changed) => {
                    unavailable_streak = 0;
                    interval = base_interval;
                    debug!("clipboard change captured");
                }
                Ok(PollResult::NoChange) => {
                    // Covers both `poll_changed` returning `None` and a real
                    // read landing on the same hash already committed: in
                    // either case the adapter responded, so this is not
                    // evidence of unavailability.
                    unavailable_streak = 0;
                    interval = base_interval;
                }
                Err(PollOutcome::Unavailable) => {
                    unavailable_streak += 1;
                    if unavailable_streak == UNAVAILABLE_STREAK_FOR_BACKOFF {
                        warn!(streak = unavailable_streak, "clipboard adapter unavailable for {UNAVAILABLE_STREAK_FOR_BACKOFF} consecutive polls, doubling poll interval");
                    }
                    if unavailable_streak >= UNAVAILABLE_STREAK_FOR_BACKOFF {
                        interval = base_interval * MAX_BACKOFF_MULTIPLIER;
                    }
                }
                Err(PollOutcome::Fatal(e)) => {
                    warn!(error = %e, "clipboard monitor hit a fatal storage error, stopping");
                    return Err(MonitorError::StoreFailed(e));
                }
            }
        }
    }

    async fn poll_once(
        &self,
        change_token: &mut Option<uc_core::ports::ChangeToken>,
        last_committed: &mut Option<ContentHash>,
    ) -> Result<PollResult, PollOutcome> {
        // `None` means the adapter has nothing new to report, not that it's
        // unreachable (spec.md §4.E: "If None, loop"): no read is attempted
        // and the unavailable streak is left untouched.
        let Some(new_token) = self.deps.adapter.poll_changed(change_token.as_ref()).await else {
            return Ok(PollResult::NoChange);
        };
        *change_token = Some(new_token);

        let read = match self.deps.adapter.read().await {
            Ok(r) => r,
            Err(e) => {
                debug!(error = %e, "clipboard read failed, treating this poll as unavailable");
                return Err(PollOutcome::Unavailable);
            }
        };

        let content_type = classify(&read.data, &read.mime_hints);
        let hash = ContentHash::compute(&read.data, content_type);

        if last_committed.as_ref() == Some(&hash) {
            return Ok(PollResult::NoChange);
        }

        if self.was_recently_applied_inbound(&hash) {
            *last_committed = Some(hash);
            return Ok(PollResult::NoChange);
        }

        let content = ClipboardContent::new(read.data, content_type, self.deps.clock.now(), self.deps.device_id);

        self.deps
            .store
            .put(content.clone())
            .await
            .map_err(|e| PollOutcome::Fatal(e.to_string()))?;
        *last_committed = Some(hash);

        self.publish_best_effort(&content).await;
        Ok(PollResult::Changed)
    }

    async fn publish_best_effort(&self, content: &ClipboardContent) {
        let group = self.deps.config.sync.default_group.clone();
        match self.deps.publisher.publish(&group, content).await {
            Ok(()) => {
                if let Err(e) = self.deps.devices.touch(self.deps.device_id).await {
                    debug!(error = %e, "failed to update device last_seen after publish");
                }
            }
            Err(e) => debug!(error = %e, hash = %content.hash, "publish skipped"),
        }
    }

    async fn handle_inbound(&self, group: String, content: ClipboardContent) {
        match self.deps.store.put(content.clone()).await {
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, group, "failed to store inbound clip");
                return;
            }
        }

        if let Err(e) = self.deps.devices.touch(self.deps.device_id).await {
            debug!(error = %e, "failed to update device last_seen after inbound apply");
        }

        if !self.deps.config.monitor.apply_inbound {
            return;
        }

        let is_latest = matches!(self.deps.store.latest().await, Ok(Some(latest)) if latest.hash == content.hash);
        if !is_latest {
            return;
        }

        self.mark_applied_inbound(content.hash);
        if let Err(e) = self.deps.adapter.write(&content.data, content.content_type).await {
            debug!(error = %e, "failed to apply inbound clip to the OS clipboard");
        }
    }

    fn was_recently_applied_inbound(&self, hash: &ContentHash) -> bool {
        let mut guard = self.recent_inbound.lock().expect("recent_inbound lock poisoned");
        guard.retain(|_, seen_at| seen_at.elapsed() < ECHO_SUPPRESSION);
        guard.contains_key(hash)
    }

    fn mark_applied_inbound(&self, hash: ContentHash) {
        let mut guard = self.recent_inbound.lock().expect("recent_inbound lock poisoned");
        guard.insert(hash, std::time::Instant::now());
    }
}

enum PollResult {
    Changed,
    NoChange,
}

enum PollOutcome {
    Unavailable,
    Fatal(String),
}
