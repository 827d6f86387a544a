//! Study stopwatch persisted across CLI invocations.
//!
//! Only the start instant is stored; elapsed time is derived from the wall
//! clock on every read, so nothing needs to tick in the background.
//!
//! ```text
//! Idle --start--> Running --stop/cancel--> Idle
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::DatabaseError;
use crate::storage::Database;

/// Key holding the running stopwatch.
pub const STORAGE_TIMER: &str = "study_timer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RunningTimer {
    started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopwatchState {
    Idle,
    Running,
}

/// Point-in-time view of the stopwatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopwatchStatus {
    pub state: StopwatchState,
    pub started_at: Option<DateTime<Utc>>,
    pub elapsed_secs: u64,
    /// Elapsed time as `MM:SS`.
    pub display: String,
}

impl StopwatchStatus {
    fn idle() -> Self {
        Self {
            state: StopwatchState::Idle,
            started_at: None,
            elapsed_secs: 0,
            display: format_elapsed(0),
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == StopwatchState::Running
    }
}

/// Minutes credited for a stopped session: rounded to the nearest minute,
/// never less than one.
pub fn minutes_for_elapsed(elapsed_secs: u64) -> u32 {
    let minutes = (elapsed_secs.saturating_add(30) / 60).max(1);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

/// Format seconds as zero-padded `MM:SS`. Minutes are not wrapped at 60.
pub fn format_elapsed(elapsed_secs: u64) -> String {
    format!("{:02}:{:02}", elapsed_secs / 60, elapsed_secs % 60)
}

/// Stopwatch state stored in the local key-value table.
#[derive(Clone)]
pub struct Stopwatch {
    db: Arc<Mutex<Database>>,
}

impl Stopwatch {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db }
    }

    fn db(&self) -> Result<MutexGuard<'_, Database>, DatabaseError> {
        self.db
            .lock()
            .map_err(|_| DatabaseError::QueryFailed("local store lock poisoned".into()))
    }

    fn running(db: &Database) -> Result<Option<RunningTimer>, DatabaseError> {
        db.kv_get_json::<RunningTimer>(STORAGE_TIMER)
    }

    fn status_of(running: Option<RunningTimer>, now: DateTime<Utc>) -> StopwatchStatus {
        match running {
            Some(timer) => {
                let elapsed_secs = u64::try_from((now - timer.started_at).num_seconds()).unwrap_or(0);
                StopwatchStatus {
                    state: StopwatchState::Running,
                    started_at: Some(timer.started_at),
                    elapsed_secs,
                    display: format_elapsed(elapsed_secs),
                }
            }
            None => StopwatchStatus::idle(),
        }
    }

    /// Start the stopwatch. Starting while already running keeps the
    /// original start instant.
    pub fn start(&self, now: DateTime<Utc>) -> Result<StopwatchStatus, DatabaseError> {
        let db = self.db()?;
        let running = match Self::running(&db)? {
            Some(timer) => timer,
            None => {
                let timer = RunningTimer { started_at: now };
                db.kv_set_json(STORAGE_TIMER, &timer)?;
                timer
            }
        };
        Ok(Self::status_of(Some(running), now))
    }

    pub fn status(&self, now: DateTime<Utc>) -> Result<StopwatchStatus, DatabaseError> {
        let db = self.db()?;
        Ok(Self::status_of(Self::running(&db)?, now))
    }

    /// Reset to idle. Returns the status just before clearing.
    pub fn clear(&self, now: DateTime<Utc>) -> Result<StopwatchStatus, DatabaseError> {
        let db = self.db()?;
        let before = Self::status_of(Self::running(&db)?, now);
        db.kv_delete(STORAGE_TIMER)?;
        Ok(before)
    }
}
