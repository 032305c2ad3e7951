//! Periodic check-in: announce the device until the server hands out a token.

use opiapi::{CheckIn, ControlPlane};
use opiconfig::TokenStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

pub const CHECK_IN_PERIOD: Duration = Duration::from_secs(10 * 60);

/// Outcome of one check-in round, as seen by the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckInStatus {
    TokenSaved,
    Pending,
    Failed,
}

/// Performs one check-in and persists the token if one is granted.
///
/// Errors are logged, never returned: the next round retries.
pub async fn check_in_once(api: &dyn ControlPlane, mac: &str, tokens: &TokenStore) -> CheckInStatus {
    match api.check_in(mac).await {
        Ok(CheckIn::TokenAcquired(token)) => match tokens.save(&token) {
            Ok(()) => {
                info!("Check-in OK, token saved");
                CheckInStatus::TokenSaved
            }
            Err(e) => {
                error!("Check-in OK but token not saved: {:#}", e);
                CheckInStatus::Failed
            }
        },
        Ok(CheckIn::StillPending) => {
            info!(mac, "Device known, waiting for group assignment");
            CheckInStatus::Pending
        }
        Err(e) => {
            warn!("Check-in failed: {}", e);
            CheckInStatus::Failed
        }
    }
}

/// Check-in loop: one round immediately, then every [`CHECK_IN_PERIOD`].
///
/// `token_ready` is notified each time a token is saved. Runs until
/// `shutdown` is cancelled.
pub async fn run_check_in_worker(
    api: Arc<dyn ControlPlane>,
    mac: String,
    tokens: TokenStore,
    token_ready: Arc<Notify>,
    shutdown: CancellationToken,
) {
    let mut ticker = interval(CHECK_IN_PERIOD);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {}
        }
        if check_in_once(api.as_ref(), &mac, &tokens).await == CheckInStatus::TokenSaved {
            token_ready.notify_one();
        }
    }
}
