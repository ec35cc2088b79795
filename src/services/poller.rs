//! Background status poller.

use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, warn};

use crate::state::{PollerPhase, SharedState};

use super::sync_service;

/// Poll the active target on the configured interval until the process exits.
///
/// Each cycle flips the published phase to `Fetching`, reconciles, and flips
/// back to `Idle`. A failing cycle is logged and the loop keeps its cadence;
/// a single bad cycle never halts polling.
pub async fn run(state: SharedState) {
    let mut ticker = interval(state.config().poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick fires immediately; the initial draw already happened at
    // startup, so skip it.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        state.set_poller_phase(PollerPhase::Fetching);
        match sync_service::reconcile(&state, None).await {
            Ok(report) => debug!(
                active = report.active_id.as_deref().unwrap_or("none"),
                "periodic status update complete"
            ),
            Err(err) => warn!(error = %err, "periodic status update failed"),
        }
        state.set_poller_phase(PollerPhase::Idle);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::{
        dao::models::Target,
        testing::{FakeGateway, FakeSource, test_state_with_interval},
    };

    use super::*;

    #[tokio::test]
    async fn poller_keeps_polling_through_failed_cycles() {
        let source = FakeSource::online();
        let (state, _dir) =
            test_state_with_interval(source, Duration::from_millis(50)).await;
        // No gateway installed yet: every cycle fails with Degraded.
        tokio::spawn(run(state.clone()));

        tokio::time::sleep(Duration::from_millis(130)).await;
        assert_eq!(state.poller_phase(), PollerPhase::Idle);

        // Installing a gateway lets the following cycles succeed.
        let gateway = FakeGateway::install(&state).await;
        state
            .registry()
            .add(Target {
                id: "1".into(),
                name: "Server 1".into(),
            })
            .await;

        tokio::time::sleep(Duration::from_millis(130)).await;
        assert!(!gateway.created.lock().unwrap().is_empty());
    }
}
