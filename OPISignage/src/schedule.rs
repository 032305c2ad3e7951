//! When to run a sync: once on the first token, then daily at 04:00.

use chrono::{NaiveDate, NaiveDateTime, Timelike};

/// Local wall-clock hour of the daily sync.
pub const DAILY_HOUR: u32 = 4;
pub const DAILY_MINUTE: u32 = 0;

/// Why a sync was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    /// First non-empty token seen by this process.
    FirstToken,
    /// Daily refresh for the given local date.
    Daily(NaiveDate),
}

/// Sync trigger state owned by the sync loop.
///
/// Cold until a token is first observed, armed afterwards. Only the loop
/// touches it, so there is no locking.
#[derive(Debug, Default, Clone)]
pub struct SyncSchedule {
    initial_done: bool,
    last_run: Option<NaiveDate>,
}

impl SyncSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self) -> bool {
        self.initial_done
    }

    pub fn last_run(&self) -> Option<NaiveDate> {
        self.last_run
    }

    /// Samples the schedule at `now`.
    ///
    /// Returns the trigger to act on, if any. The first sync also claims the
    /// daily slot when it happens to run at 04:00, so a boot at 04:00 does
    /// not sync twice.
    pub fn poll(&mut self, now: NaiveDateTime, token_present: bool) -> Option<SyncTrigger> {
        let today = now.date();
        let daily_slot = now.hour() == DAILY_HOUR && now.minute() == DAILY_MINUTE;

        if !self.initial_done {
            if !token_present {
                return None;
            }
            self.initial_done = true;
            if daily_slot {
                self.last_run = Some(today);
            }
            return Some(SyncTrigger::FirstToken);
        }

        if daily_slot && self.last_run != Some(today) {
            self.last_run = Some(today);
            return Some(SyncTrigger::Daily(today));
        }
        None
    }
}
