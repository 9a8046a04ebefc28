//! Island event announcers.
//!
//! `TracingAnnouncer` writes each event as a structured log line.
//! `BroadcastAnnouncer` fans events out to in-process subscribers over a
//! tokio broadcast channel; lagging or absent subscribers never block the
//! island that announced.

use std::sync::Arc;

use skyisle_domain::IslandEvent;
use tokio::sync::broadcast;

use crate::infrastructure::ports::EventAnnouncerPort;

/// Logs every event.
pub struct TracingAnnouncer;

impl EventAnnouncerPort for TracingAnnouncer {
    fn announce(&self, event: IslandEvent) {
        let payload = serde_json::to_string(&event).unwrap_or_default();
        tracing::info!(
            event_type = event.event_type(),
            island_id = %event.island_id(),
            is_coop = event.is_coop(),
            payload = %payload,
            "Island event"
        );
    }
}

/// Broadcasts events to subscribers.
#[derive(Clone)]
pub struct BroadcastAnnouncer {
    sender: broadcast::Sender<IslandEvent>,
}

impl BroadcastAnnouncer {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<IslandEvent> {
        self.sender.subscribe()
    }
}

impl EventAnnouncerPort for BroadcastAnnouncer {
    fn announce(&self, event: IslandEvent) {
        // No receivers is fine - nobody is listening yet.
        let _ = self.sender.send(event);
    }
}

/// Forwards each event to every inner announcer, in order.
pub struct FanoutAnnouncer {
    targets: Vec<Arc<dyn EventAnnouncerPort>>,
}

impl FanoutAnnouncer {
    pub fn new(targets: Vec<Arc<dyn EventAnnouncerPort>>) -> Self {
        Self { targets }
    }
}

impl EventAnnouncerPort for FanoutAnnouncer {
    fn announce(&self, event: IslandEvent) {
        for target in &self.targets {
            target.announce(event.clone());
        }
    }
}
