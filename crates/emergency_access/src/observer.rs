//! Render callbacks driven by the emergency access controller.

use shared::{
    domain::{CountdownTick, EmergencyAccessState},
    protocol::PortalEvent,
};
use tokio::sync::broadcast;

/// Presentation hooks for the emergency access lifecycle.
///
/// Callbacks are delivered one at a time, in transition order, without the
/// controller's lock held. An implementation may call back into the
/// controller; notifications caused by such a call are delivered after the
/// current callback returns.
pub trait EmergencyAccessObserver: Send + Sync {
    fn on_state_change(&self, state: &EmergencyAccessState);
    fn on_tick(&self, tick: &CountdownTick);
    fn on_expired(&self);
}

pub struct NoopObserver;

impl EmergencyAccessObserver for NoopObserver {
    fn on_state_change(&self, _state: &EmergencyAccessState) {}
    fn on_tick(&self, _tick: &CountdownTick) {}
    fn on_expired(&self) {}
}

/// Forwards every callback as a [`PortalEvent`] to broadcast subscribers.
pub struct BroadcastObserver {
    events: broadcast::Sender<PortalEvent>,
}

impl BroadcastObserver {
    pub fn new(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity);
        Self { events }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PortalEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: PortalEvent) {
        // No subscribers is fine; the event is simply dropped.
        let _ = self.events.send(event);
    }
}

impl EmergencyAccessObserver for BroadcastObserver {
    fn on_state_change(&self, state: &EmergencyAccessState) {
        self.publish(PortalEvent::EmergencyStateChanged(state.clone()));
    }

    fn on_tick(&self, tick: &CountdownTick) {
        self.publish(PortalEvent::EmergencyTick(*tick));
    }

    fn on_expired(&self) {
        self.publish(PortalEvent::EmergencyExpired);
    }
}
