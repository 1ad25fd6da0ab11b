use std::{sync::Arc, time::Duration};

use emergency_access::{
    ActivationOutcome, BroadcastObserver, EmergencyAccessController, EMERGENCY_ACCESS_DURATION,
};
use shared::{domain::EmergencyAccessStatus, protocol::PortalEvent};
use tokio::{sync::broadcast::error::TryRecvError, time};

fn drain(rx: &mut tokio::sync::broadcast::Receiver<PortalEvent>) -> Vec<PortalEvent> {
    let mut events = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => events.push(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return events,
            Err(TryRecvError::Lagged(skipped)) => panic!("lagged by {skipped} events"),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn full_window_expires_into_inactive() {
    let observer = Arc::new(BroadcastObserver::new(2_048));
    let mut rx = observer.subscribe();
    let controller = EmergencyAccessController::new(observer.clone());
    let mut state_rx = controller.subscribe();

    controller.activate().expect("activate");
    assert!(matches!(
        drain(&mut rx).as_slice(),
        [PortalEvent::EmergencyStateChanged(state)] if state.status == EmergencyAccessStatus::Active
    ));

    time::sleep(EMERGENCY_ACCESS_DURATION + Duration::from_secs(1)).await;

    let events = drain(&mut rx);
    let ticks = events
        .iter()
        .filter(|event| matches!(event, PortalEvent::EmergencyTick(_)))
        .count();
    assert_eq!(ticks, 899);

    let tail: Vec<_> = events
        .iter()
        .filter(|event| !matches!(event, PortalEvent::EmergencyTick(_)))
        .cloned()
        .collect();
    assert!(matches!(
        tail.as_slice(),
        [
            PortalEvent::EmergencyStateChanged(expired),
            PortalEvent::EmergencyExpired,
            PortalEvent::EmergencyStateChanged(inactive),
        ] if expired.status == EmergencyAccessStatus::Expired
            && inactive.status == EmergencyAccessStatus::Inactive
    ));

    assert!(state_rx.has_changed().expect("sender alive"));
    assert_eq!(
        state_rx.borrow_and_update().status,
        EmergencyAccessStatus::Inactive
    );
}

#[tokio::test(start_paused = true)]
async fn manual_cancel_midway_silences_countdown() {
    let observer = Arc::new(BroadcastObserver::new(1_024));
    let mut rx = observer.subscribe();
    let controller = EmergencyAccessController::new(observer.clone());

    controller.activate().expect("activate");
    time::sleep(Duration::from_secs(500)).await;
    assert!(controller.deactivate());

    let before_cancel = drain(&mut rx);
    assert!(matches!(
        before_cancel.last(),
        Some(PortalEvent::EmergencyStateChanged(state))
            if state.status == EmergencyAccessStatus::Inactive
    ));
    assert!(!before_cancel
        .iter()
        .any(|event| matches!(event, PortalEvent::EmergencyExpired)));

    time::sleep(Duration::from_secs(1_000)).await;
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test(start_paused = true)]
async fn state_watchers_wake_on_activation() {
    let controller = EmergencyAccessController::new(Arc::new(BroadcastObserver::new(16)));
    let mut state_rx = controller.subscribe();

    let waiter = tokio::spawn(async move {
        state_rx.changed().await.expect("sender alive");
        state_rx.borrow_and_update().clone()
    });
    tokio::task::yield_now().await;

    let ActivationOutcome::Activated(state) = controller.activate().expect("activate") else {
        panic!("expected a fresh activation");
    };
    let observed = waiter.await.expect("waiter");
    assert_eq!(observed, state);
    assert!(controller.deactivate());
}
