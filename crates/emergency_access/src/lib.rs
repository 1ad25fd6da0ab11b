use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    thread,
    time::Duration,
};

use chrono::{TimeDelta, Utc};
use shared::domain::{CountdownTick, EmergencyAccessState};
use tokio::{
    runtime::Handle,
    sync::watch,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, info};

pub mod error;
pub mod observer;

pub use error::EmergencyAccessError;
pub use observer::{BroadcastObserver, EmergencyAccessObserver, NoopObserver};

const EMERGENCY_ACCESS_MILLIS: u64 = 15 * 60 * 1000;
pub const EMERGENCY_ACCESS_DURATION: Duration = Duration::from_millis(EMERGENCY_ACCESS_MILLIS);
pub const COUNTDOWN_TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationOutcome {
    Activated(EmergencyAccessState),
    /// A session was already running; its window was left untouched.
    AlreadyActive(EmergencyAccessState),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStep {
    Tick(CountdownTick),
    Expired,
}

impl CountdownStep {
    /// The countdown works in whole milliseconds; less than one left counts
    /// as lapsed.
    pub fn evaluate(remaining: Duration) -> Self {
        if remaining.as_millis() == 0 {
            Self::Expired
        } else {
            Self::Tick(CountdownTick::from_remaining(remaining))
        }
    }
}

struct ActiveSession {
    id: u64,
    deadline: Instant,
    countdown_task: JoinHandle<()>,
}

enum Notification {
    StateChanged(EmergencyAccessState),
    Tick { session: u64, tick: CountdownTick },
    Expired,
}

#[derive(Default)]
struct SessionSlot {
    active: Option<ActiveSession>,
    next_id: u64,
    outbox: VecDeque<Notification>,
    dispatching: bool,
}

impl SessionSlot {
    fn is_current(&self, session: u64) -> bool {
        self.active.as_ref().is_some_and(|active| active.id == session)
    }

    /// Next notification to deliver, skipping ticks of sessions that ended
    /// after they were queued. Clears `dispatching` once the outbox is empty.
    fn next_notification(&mut self) -> Option<Notification> {
        while let Some(notification) = self.outbox.pop_front() {
            match &notification {
                Notification::Tick { session, .. } if !self.is_current(*session) => continue,
                _ => return Some(notification),
            }
        }
        self.dispatching = false;
        None
    }
}

/// Owns the emergency access window and its countdown.
///
/// Transitions are committed under the session lock and queue their observer
/// notifications. The queue is drained outside the lock by one caller at a
/// time, so notifications arrive in transition order, observers may call back
/// into the controller, and a tick belonging to a cancelled session is never
/// delivered after the deactivation that cancelled it.
pub struct EmergencyAccessController {
    observer: Arc<dyn EmergencyAccessObserver>,
    session: Mutex<SessionSlot>,
    state: watch::Sender<EmergencyAccessState>,
}

impl EmergencyAccessController {
    pub fn new(observer: Arc<dyn EmergencyAccessObserver>) -> Arc<Self> {
        let (state, _) = watch::channel(EmergencyAccessState::inactive());
        Arc::new(Self {
            observer,
            session: Mutex::new(SessionSlot::default()),
            state,
        })
    }

    pub fn status(&self) -> EmergencyAccessState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<EmergencyAccessState> {
        self.state.subscribe()
    }

    /// Opens a fifteen minute window and starts the countdown.
    ///
    /// Activating while a session is running is ignored and reports
    /// [`ActivationOutcome::AlreadyActive`].
    pub fn activate(self: &Arc<Self>) -> Result<ActivationOutcome, EmergencyAccessError> {
        let runtime =
            Handle::try_current().map_err(|_| EmergencyAccessError::SchedulerUnavailable)?;

        let mut slot = self.lock_session();
        if let Some(active) = &slot.active {
            debug!(
                session = active.id,
                "emergency access: activation ignored, session already active"
            );
            return Ok(ActivationOutcome::AlreadyActive(self.status()));
        }

        let started = Instant::now();
        let deadline = started + EMERGENCY_ACCESS_DURATION;
        let activated_at = Utc::now();
        let ends_at = activated_at + TimeDelta::milliseconds(EMERGENCY_ACCESS_MILLIS as i64);

        let id = slot.next_id;
        slot.next_id += 1;
        let countdown_task = runtime.spawn(run_countdown(
            Arc::downgrade(self),
            id,
            started,
            deadline,
        ));
        slot.active = Some(ActiveSession {
            id,
            deadline,
            countdown_task,
        });

        let state = EmergencyAccessState::active(activated_at, ends_at);
        self.publish(&mut slot, state.clone());
        drop(slot);
        info!(session = id, %ends_at, "emergency access: activated");

        self.dispatch();
        Ok(ActivationOutcome::Activated(state))
    }

    /// Cancels the running session, if any. Returns whether one was cancelled.
    pub fn deactivate(&self) -> bool {
        let mut slot = self.lock_session();
        let Some(active) = slot.active.take() else {
            return false;
        };

        active.countdown_task.abort();
        self.publish(&mut slot, EmergencyAccessState::inactive());
        drop(slot);
        info!(session = active.id, "emergency access: deactivated");

        self.dispatch();
        true
    }

    /// Evaluates the countdown now.
    ///
    /// Returns the tick reported to the observer, or `None` when no session
    /// is running or the window has just lapsed (in which case the session is
    /// expired and cleared).
    pub fn tick(&self) -> Option<CountdownTick> {
        let session = self.lock_session().active.as_ref()?.id;
        self.tick_session(session)
    }

    fn tick_session(&self, session: u64) -> Option<CountdownTick> {
        let tick = self.tick_locked(&mut self.lock_session(), session);
        self.dispatch();
        tick
    }

    fn tick_locked(&self, slot: &mut SessionSlot, session: u64) -> Option<CountdownTick> {
        let active = slot.active.as_ref().filter(|active| active.id == session)?;
        let remaining = active.deadline.saturating_duration_since(Instant::now());

        match CountdownStep::evaluate(remaining) {
            CountdownStep::Tick(tick) => {
                debug!(
                    session,
                    countdown = %tick,
                    warning = tick.is_warning,
                    "emergency access: tick"
                );
                slot.outbox.push_back(Notification::Tick { session, tick });
                Some(tick)
            }
            CountdownStep::Expired => {
                self.expire_locked(slot, session);
                None
            }
        }
    }

    fn expire_session(&self, session: u64) {
        self.expire_locked(&mut self.lock_session(), session);
        self.dispatch();
    }

    fn expire_locked(&self, slot: &mut SessionSlot, session: u64) {
        if !slot.is_current(session) {
            return;
        }
        let Some(active) = slot.active.take() else {
            return;
        };

        active.countdown_task.abort();
        self.publish(slot, EmergencyAccessState::expired());
        slot.outbox.push_back(Notification::Expired);
        self.publish(slot, EmergencyAccessState::inactive());
        info!(session, "emergency access: expired");
    }

    fn publish(&self, slot: &mut SessionSlot, state: EmergencyAccessState) {
        self.state.send_replace(state.clone());
        slot.outbox.push_back(Notification::StateChanged(state));
    }

    /// Delivers queued notifications unless another caller (possibly an
    /// observer further up this stack) is already delivering them.
    fn dispatch(&self) {
        {
            let mut slot = self.lock_session();
            if slot.dispatching {
                return;
            }
            slot.dispatching = true;
        }

        let _reset = DispatchReset(self);
        loop {
            let Some(notification) = self.lock_session().next_notification() else {
                return;
            };
            match notification {
                Notification::StateChanged(state) => self.observer.on_state_change(&state),
                Notification::Tick { tick, .. } => self.observer.on_tick(&tick),
                Notification::Expired => self.observer.on_expired(),
            }
        }
    }

    fn lock_session(&self) -> MutexGuard<'_, SessionSlot> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Releases the dispatcher role if an observer panics mid-delivery.
struct DispatchReset<'a>(&'a EmergencyAccessController);

impl Drop for DispatchReset<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.lock_session().dispatching = false;
        }
    }
}

impl Drop for EmergencyAccessController {
    fn drop(&mut self) {
        let slot = self.session.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(active) = slot.active.take() {
            active.countdown_task.abort();
        }
    }
}

async fn run_countdown(
    controller: Weak<EmergencyAccessController>,
    session: u64,
    started: Instant,
    deadline: Instant,
) {
    let mut ticker = time::interval_at(started + COUNTDOWN_TICK_PERIOD, COUNTDOWN_TICK_PERIOD);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let expiry = time::sleep_until(deadline);
    tokio::pin!(expiry);

    loop {
        tokio::select! {
            biased;
            _ = &mut expiry => {
                if let Some(controller) = controller.upgrade() {
                    controller.expire_session(session);
                }
                return;
            }
            _ = ticker.tick() => {
                let Some(controller) = controller.upgrade() else {
                    return;
                };
                if controller.tick_session(session).is_none() {
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
