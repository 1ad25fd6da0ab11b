use std::{future::Future, io::Write, str::FromStr, sync::Arc, time::Duration};

use anyhow::{anyhow, ensure, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use consent::{ConsentError, ConsentRegistry};
use emergency_access::EmergencyAccessController;
use records::{RecordFilter, RecordStore};
use shared::{
    domain::{ConsentId, HospitalId},
    protocol::PortalEvent,
};
use tokio::time;
use tracing::{info, warn};

use crate::render::TerminalRenderer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsentToggle {
    pub consent_id: ConsentId,
    pub enabled: bool,
}

/// Parses `<consent>=<on|off>`, e.g. `consent-2=on`.
impl FromStr for ConsentToggle {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (id, value) = raw
            .split_once('=')
            .ok_or_else(|| anyhow!("expected <consent>=<on|off>, got '{raw}'"))?;
        let enabled = match value.trim().to_ascii_lowercase().as_str() {
            "on" | "true" | "enable" | "enabled" => true,
            "off" | "false" | "disable" | "disabled" => false,
            other => return Err(anyhow!("expected on or off, got '{other}'")),
        };
        Ok(Self {
            consent_id: id.parse()?,
            enabled,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmergencyExit {
    Expired,
    Cancelled,
    Interrupted,
}

/// Activates emergency access and renders it until the window lapses, the
/// optional cancel delay elapses or `interrupt` resolves.
pub async fn run_emergency<W, I>(
    renderer: Arc<TerminalRenderer<W>>,
    cancel_after: Option<Duration>,
    interrupt: I,
) -> Result<EmergencyExit>
where
    W: Write + Send + 'static,
    I: Future<Output = ()>,
{
    let controller = EmergencyAccessController::new(renderer);
    controller.activate()?;
    let mut state_rx = controller.subscribe();

    let cancel = async move {
        match cancel_after {
            Some(delay) => time::sleep(delay).await,
            None => std::future::pending().await,
        }
    };

    let exit = tokio::select! {
        closed = state_rx.wait_for(|state| !state.is_active()) => {
            closed.context("emergency access controller went away")?;
            EmergencyExit::Expired
        }
        _ = cancel => EmergencyExit::Cancelled,
        _ = interrupt => EmergencyExit::Interrupted,
    };

    if exit != EmergencyExit::Expired {
        controller.deactivate();
    }
    info!(?exit, "emergency access session finished");
    Ok(exit)
}

pub fn run_consents<W: Write + Send>(
    renderer: &TerminalRenderer<W>,
    registry: &mut ConsentRegistry,
    toggles: &[ConsentToggle],
    today: NaiveDate,
) -> Result<()> {
    let mut failures = 0;
    for toggle in toggles {
        match registry.set_consent(toggle.consent_id, toggle.enabled, today) {
            Ok(change) => renderer.event(&change.to_event()),
            Err(err) => {
                failures += 1;
                report(renderer, err);
            }
        }
    }

    renderer.consents(registry.consents());
    ensure_applied(failures)
}

pub fn run_hospitals<W: Write + Send>(
    renderer: &TerminalRenderer<W>,
    registry: &mut ConsentRegistry,
    grant: &[HospitalId],
    revoke: &[HospitalId],
    now: DateTime<Utc>,
) -> Result<()> {
    let requests = grant
        .iter()
        .map(|id| (*id, true))
        .chain(revoke.iter().map(|id| (*id, false)));

    let mut failures = 0;
    for (hospital_id, has_access) in requests {
        match registry.set_hospital_access(hospital_id, has_access, now) {
            Ok(change) => {
                for event in change.to_events() {
                    renderer.event(&event);
                }
            }
            Err(err) => {
                failures += 1;
                report(renderer, err);
            }
        }
    }

    renderer.hospitals(registry.hospitals());
    ensure_applied(failures)
}

pub fn run_access_log<W: Write + Send>(renderer: &TerminalRenderer<W>, registry: &ConsentRegistry) {
    renderer.access_log(registry.access_log());
}

pub fn run_timeline<W: Write + Send>(
    renderer: &TerminalRenderer<W>,
    store: &RecordStore,
    filter: RecordFilter,
) {
    renderer.timeline(&store.timeline(filter));
}

pub fn run_sources<W: Write + Send>(renderer: &TerminalRenderer<W>, store: &RecordStore) {
    renderer.sources(&store.source_summaries(), &store.unified_records());
}

fn report<W: Write + Send>(renderer: &TerminalRenderer<W>, err: ConsentError) {
    warn!(%err, "portal: request ignored");
    renderer.event(&PortalEvent::Error(err.into()));
}

fn ensure_applied(failures: usize) -> Result<()> {
    ensure!(
        failures == 0,
        "{failures} request(s) referenced unknown records"
    );
    Ok(())
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;
