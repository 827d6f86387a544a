//! Goal and check-in repository.
//!
//! Owns the active [`RecordSource`] chosen once per session and a
//! [`LocalSource`] kept as the fallback. Every operation tries the active
//! source first; when that is the remote store and it fails, the same
//! operation is retried once against the local store. Reads never fail:
//! if no source answers, the default view is returned.
//!
//! Writes follow a small state machine:
//!
//! ```text
//! Idle -> Submitting -> Committed
//!                    -> Failed      (local retry also failed)
//! ```
//!
//! A committed write is followed by a full refresh of the view.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::{CoreError, SourceError, ValidationError};
use crate::model::{CheckinEvent, Goal, GoalView};
use crate::source::{HttpCollection, LocalSource, RecordSource, RemoteSource, SourceKind};
use crate::stats::{aggregate, period_totals, streak, DailySummary, PeriodTotals};
use crate::stopwatch::{minutes_for_elapsed, Stopwatch, StopwatchStatus};
use crate::storage::{Config, Database, GoalDefaults};

/// Where the data behind a view came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceStatus {
    Local,
    Remote,
    /// The remote store failed and the local store answered instead.
    FellBackToLocal { reason: String },
    /// No source answered; the view holds defaults.
    Unavailable { reason: String },
}

impl SourceStatus {
    /// Notice worth showing the user, if any.
    pub fn notice(&self) -> Option<String> {
        match self {
            SourceStatus::Local | SourceStatus::Remote => None,
            SourceStatus::FellBackToLocal { reason } => {
                Some(format!("remote store unavailable, fell back to local ({reason})"))
            }
            SourceStatus::Unavailable { reason } => {
                Some(format!("no record source available, showing defaults ({reason})"))
            }
        }
    }
}

impl From<SourceKind> for SourceStatus {
    fn from(kind: SourceKind) -> Self {
        match kind {
            SourceKind::Local => SourceStatus::Local,
            SourceKind::Remote => SourceStatus::Remote,
        }
    }
}

/// Home screen view model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewModel {
    pub goal: GoalView,
    pub today: DailySummary,
    pub streak: u32,
    pub source: SourceStatus,
}

/// Statistics screen view model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsView {
    pub totals: PeriodTotals,
    pub source: SourceStatus,
}

/// Progress of the most recent write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SubmissionState {
    Idle,
    Submitting,
    Committed { source: SourceStatus },
    Failed { reason: String },
}

/// Result of the explicit "check in" action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "view", rename_all = "snake_case")]
pub enum CheckinOutcome {
    Recorded(ViewModel),
    /// Today was already checked; nothing was written.
    AlreadyCheckedIn(ViewModel),
}

impl CheckinOutcome {
    pub fn view(&self) -> &ViewModel {
        match self {
            CheckinOutcome::Recorded(view) | CheckinOutcome::AlreadyCheckedIn(view) => view,
        }
    }
}

/// Result of stopping the stopwatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoppedSession {
    pub elapsed_secs: u64,
    pub minutes: u32,
    pub view: ViewModel,
}

fn validate_minutes(field: &str, minutes: i64) -> Result<u32, ValidationError> {
    if minutes < 0 {
        return Err(ValidationError::NegativeMinutes(minutes));
    }
    u32::try_from(minutes).map_err(|_| ValidationError::InvalidValue {
        field: field.to_string(),
        message: format!("{minutes} is too large"),
    })
}

async fn snapshot(
    source: &dyn RecordSource,
) -> Result<(Option<Goal>, Vec<CheckinEvent>), SourceError> {
    let (goal, events) = tokio::join!(source.fetch_goal(), source.fetch_all());
    Ok((goal?, events?))
}

pub struct Repository {
    active: Box<dyn RecordSource>,
    fallback: LocalSource,
    stopwatch: Stopwatch,
    clock: Box<dyn Clock>,
    defaults: GoalDefaults,
    /// Last goal seen on the remote store, with its assigned id.
    remote_goal: Option<Goal>,
    submission: SubmissionState,
}

impl Repository {
    /// Repository over `active`, with the local store in `db` as fallback.
    pub fn new(active: Box<dyn RecordSource>, db: Arc<Mutex<Database>>) -> Self {
        Self {
            active,
            fallback: LocalSource::new(Arc::clone(&db)),
            stopwatch: Stopwatch::new(db),
            clock: Box::new(SystemClock),
            defaults: GoalDefaults::default(),
            remote_goal: None,
            submission: SubmissionState::Idle,
        }
    }

    /// Repository that only ever uses the local store.
    pub fn local(db: Arc<Mutex<Database>>) -> Self {
        let active = Box::new(LocalSource::new(Arc::clone(&db)));
        Self::new(active, db)
    }

    /// Pick the source once for this session: remote when it is configured
    /// and its client can be built, local otherwise.
    pub fn from_config(config: &Config, db: Database) -> Self {
        let db = Arc::new(Mutex::new(db));
        let repo = if config.remote.is_ready() {
            match HttpCollection::from_config(&config.remote) {
                Ok(collection) => {
                    info!(base_url = %config.remote.base_url, env = %config.remote.env, "using remote record source");
                    Self::new(Box::new(RemoteSource::new(collection)), db)
                }
                Err(err) => {
                    warn!(error = %err, "remote record source unusable, using local store");
                    Self::local(db)
                }
            }
        } else {
            info!("remote store not configured, using local store");
            Self::local(db)
        };
        repo.with_defaults(config.goal.clone())
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_defaults(mut self, defaults: GoalDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn active_kind(&self) -> SourceKind {
        self.active.kind()
    }

    pub fn submission_state(&self) -> &SubmissionState {
        &self.submission
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn now_local(&self) -> NaiveDateTime {
        self.clock.now_local()
    }

    fn sources(&self) -> Vec<&dyn RecordSource> {
        let mut chain: Vec<&dyn RecordSource> = vec![self.active.as_ref()];
        if self.active.kind() == SourceKind::Remote {
            chain.push(&self.fallback);
        }
        chain
    }

    /// Run `op` against the active source, then once against the local
    /// fallback if the active source is remote and failed.
    async fn attempt<'s, T, F, Fut>(
        &'s self,
        what: &str,
        op: F,
    ) -> Result<(T, SourceStatus), SourceError>
    where
        F: Fn(&'s dyn RecordSource) -> Fut,
        Fut: Future<Output = Result<T, SourceError>>,
    {
        let mut fallback_reason: Option<String> = None;
        let mut last_err = None;

        for source in self.sources() {
            match op(source).await {
                Ok(value) => {
                    let status = match fallback_reason {
                        Some(reason) => SourceStatus::FellBackToLocal { reason },
                        None => SourceStatus::from(source.kind()),
                    };
                    return Ok((value, status));
                }
                Err(err) => {
                    warn!(source = ?source.kind(), error = %err, "{what} failed");
                    if fallback_reason.is_none() {
                        fallback_reason = Some(err.to_string());
                    }
                    last_err = Some(err);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| SourceError::Unavailable("no record source".into())))
    }

    fn remember_goal(&mut self, goal: Option<&Goal>, status: &SourceStatus) {
        if *status == SourceStatus::Remote {
            if let Some(goal) = goal.filter(|g| g.id.is_some()) {
                self.remote_goal = Some(goal.clone());
            }
        }
    }

    /// Compose the home view for `reference_date`. Never fails.
    pub async fn load_view(&mut self, reference_date: NaiveDate) -> ViewModel {
        match self.attempt("load view", |source| snapshot(source)).await {
            Ok(((goal, events), source)) => {
                self.remember_goal(goal.as_ref(), &source);
                let daily = aggregate(&events);
                debug!(events = events.len(), days = daily.len(), "aggregated check-ins");
                ViewModel {
                    goal: GoalView::from_goal(goal.as_ref(), &self.defaults),
                    today: daily.day_or_empty(reference_date),
                    streak: streak(&daily, reference_date),
                    source,
                }
            }
            Err(err) => ViewModel {
                goal: GoalView::from_goal(None, &self.defaults),
                today: DailySummary::empty(reference_date),
                streak: 0,
                source: SourceStatus::Unavailable {
                    reason: err.to_string(),
                },
            },
        }
    }

    /// All-time and current-week totals as of `now`. Never fails.
    pub async fn load_stats(&self, now: NaiveDateTime) -> StatsView {
        match self.attempt("load stats", |source| source.fetch_all()).await {
            Ok((events, source)) => StatsView {
                totals: period_totals(&aggregate(&events), now),
                source,
            },
            Err(err) => StatsView {
                totals: PeriodTotals::default(),
                source: SourceStatus::Unavailable {
                    reason: err.to_string(),
                },
            },
        }
    }

    /// The stored goal with defaults applied. Never fails.
    pub async fn current_goal(&mut self) -> (GoalView, SourceStatus) {
        match self.attempt("load goal", |source| source.fetch_goal()).await {
            Ok((goal, source)) => {
                self.remember_goal(goal.as_ref(), &source);
                (GoalView::from_goal(goal.as_ref(), &self.defaults), source)
            }
            Err(err) => (
                GoalView::from_goal(None, &self.defaults),
                SourceStatus::Unavailable {
                    reason: err.to_string(),
                },
            ),
        }
    }

    /// Create or update the goal.
    ///
    /// # Errors
    /// Returns a validation error for negative or oversized minutes before
    /// anything is written, or the last source error if no source accepted
    /// the write.
    pub async fn save_goal(&mut self, title: &str, daily_minutes: i64) -> Result<Goal, CoreError> {
        let daily_minutes = validate_minutes("daily_minutes", daily_minutes)?;

        // A fresh process has not seen the remote goal yet. If it cannot be
        // looked up, adding a new document could duplicate it, so the write
        // goes to the local store instead.
        let mut lookup_failure = None;
        if self.remote_goal.is_none() && self.active.kind() == SourceKind::Remote {
            let lookup = self.active.fetch_goal().await;
            match lookup {
                Ok(existing) => self.remember_goal(existing.as_ref(), &SourceStatus::Remote),
                Err(err) => {
                    warn!(error = %err, "goal lookup failed, saving to local store");
                    lookup_failure = Some(err.to_string());
                }
            }
        }

        let now = self.clock.now_utc();
        let goal = match &self.remote_goal {
            Some(existing) => Goal {
                title: title.trim().to_string(),
                daily_minutes,
                updated_at: now,
                ..existing.clone()
            },
            None => Goal::new(title.trim(), daily_minutes, now),
        };

        self.submission = SubmissionState::Submitting;
        let result = match lookup_failure {
            Some(reason) => self
                .fallback
                .upsert_goal(goal)
                .await
                .map(|saved| (saved, SourceStatus::FellBackToLocal { reason })),
            None => {
                self.attempt("save goal", |source| source.upsert_goal(goal.clone()))
                    .await
            }
        };

        match result {
            Ok((saved, source)) => {
                self.remember_goal(Some(&saved), &source);
                info!(title = %saved.title, daily_minutes = saved.daily_minutes, ?source, "goal saved");
                self.submission = SubmissionState::Committed { source };
                Ok(saved)
            }
            Err(err) => {
                self.submission = SubmissionState::Failed {
                    reason: err.to_string(),
                };
                Err(err.into())
            }
        }
    }

    async fn append(&mut self, minutes: u32, checked: bool) -> Result<ViewModel, CoreError> {
        let today = self.clock.today();
        let event = CheckinEvent::new(today, minutes, checked, self.clock.now_utc());

        self.submission = SubmissionState::Submitting;
        let result = self
            .attempt("record check-in", |source| source.append_checkin(event.clone()))
            .await;

        match result {
            Ok(((), source)) => {
                info!(%today, minutes, checked, ?source, "check-in recorded");
                self.submission = SubmissionState::Committed { source };
                Ok(self.load_view(today).await)
            }
            Err(err) => {
                self.submission = SubmissionState::Failed {
                    reason: err.to_string(),
                };
                Err(err.into())
            }
        }
    }

    /// Append a check-in dated today and return the refreshed view.
    ///
    /// An unchecked entry is study time only, so it always carries at least
    /// one minute.
    ///
    /// # Errors
    /// Returns a validation error for negative minutes before anything is
    /// written, or the last source error if no source accepted the write.
    pub async fn record_checkin(&mut self, minutes: i64, checked: bool) -> Result<ViewModel, CoreError> {
        let minutes = validate_minutes("minutes", minutes)?;
        let minutes = if checked { minutes } else { minutes.max(1) };
        self.append(minutes, checked).await
    }

    /// Mark today as checked unless it already is. The marker carries no
    /// minutes; study time is recorded by timed sessions and manual entries.
    pub async fn check_in_today(&mut self) -> Result<CheckinOutcome, CoreError> {
        let view = self.load_view(self.clock.today()).await;
        if view.today.checked {
            info!(date = %view.today.date, "already checked in today");
            return Ok(CheckinOutcome::AlreadyCheckedIn(view));
        }
        Ok(CheckinOutcome::Recorded(self.append(0, true).await?))
    }

    pub fn start_timer(&self) -> Result<StopwatchStatus, CoreError> {
        Ok(self.stopwatch.start(self.clock.now_utc())?)
    }

    pub fn timer_status(&self) -> Result<StopwatchStatus, CoreError> {
        Ok(self.stopwatch.status(self.clock.now_utc())?)
    }

    /// Stop the stopwatch and record the session unchecked. Returns `None`
    /// if it was not running. The stopwatch keeps running if the session
    /// could not be recorded.
    pub async fn stop_timer(&mut self) -> Result<Option<StoppedSession>, CoreError> {
        let status = self.timer_status()?;
        if !status.is_running() {
            return Ok(None);
        }

        let minutes = minutes_for_elapsed(status.elapsed_secs);
        let view = self.append(minutes, false).await?;
        self.stopwatch.clear(self.clock.now_utc())?;

        Ok(Some(StoppedSession {
            elapsed_secs: status.elapsed_secs,
            minutes,
            view,
        }))
    }

    /// Discard a running stopwatch without recording anything.
    pub fn cancel_timer(&self) -> Result<StopwatchStatus, CoreError> {
        Ok(self.stopwatch.clear(self.clock.now_utc())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn repo_at(today: NaiveDate) -> Repository {
        let db = Arc::new(Mutex::new(Database::open_memory().unwrap()));
        Repository::local(db).with_clock(Box::new(FixedClock::at_noon(today)))
    }

    #[test]
    fn minutes_validation() {
        assert_eq!(validate_minutes("m", 0), Ok(0));
        assert_eq!(validate_minutes("m", 45), Ok(45));
        assert_eq!(
            validate_minutes("m", -1),
            Err(ValidationError::NegativeMinutes(-1))
        );
        assert!(matches!(
            validate_minutes("m", i64::from(u32::MAX) + 1),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[tokio::test]
    async fn empty_store_gives_default_view() {
        let mut repo = repo_at(date(2024, 1, 3));
        let view = repo.load_view(date(2024, 1, 3)).await;
        assert_eq!(view.goal, GoalView::default());
        assert_eq!(view.today, DailySummary::empty(date(2024, 1, 3)));
        assert_eq!(view.streak, 0);
        assert_eq!(view.source, SourceStatus::Local);
    }

    #[tokio::test]
    async fn configured_defaults_apply_before_first_save() {
        let mut repo = repo_at(date(2024, 1, 3)).with_defaults(GoalDefaults {
            default_title: "Japanese".into(),
            default_daily_minutes: 20,
        });
        let (goal, _) = repo.current_goal().await;
        assert_eq!(goal.title, "Japanese");
        assert_eq!(goal.daily_minutes, 20);
    }

    #[tokio::test]
    async fn negative_minutes_write_nothing() {
        let mut repo = repo_at(date(2024, 1, 3));
        let err = repo.record_checkin(-5, true).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::NegativeMinutes(-5))
        ));
        assert_eq!(repo.submission_state(), &SubmissionState::Idle);

        let err = repo.save_goal("Rust", -1).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(repo.current_goal().await.0, GoalView::default());
    }

    #[tokio::test]
    async fn record_returns_refreshed_view() {
        let today = date(2024, 1, 3);
        let mut repo = repo_at(today);
        repo.record_checkin(25, false).await.unwrap();
        let view = repo.record_checkin(20, true).await.unwrap();

        assert_eq!(view.today.minutes, 45);
        assert!(view.today.checked);
        assert_eq!(view.streak, 1);
        assert_eq!(
            repo.submission_state(),
            &SubmissionState::Committed {
                source: SourceStatus::Local
            }
        );
    }

    #[tokio::test]
    async fn unchecked_entry_is_never_zero_minutes() {
        let db = Arc::new(Mutex::new(Database::open_memory().unwrap()));
        let mut repo = Repository::local(Arc::clone(&db))
            .with_clock(Box::new(FixedClock::at_noon(date(2024, 1, 3))));

        let view = repo.record_checkin(0, false).await.unwrap();
        assert_eq!(view.today.minutes, 1);
        assert!(!view.today.checked);

        repo.record_checkin(0, true).await.unwrap();
        let stored: Vec<CheckinEvent> = db
            .lock()
            .unwrap()
            .kv_get_json(crate::source::STORAGE_CHECKINS)
            .unwrap()
            .unwrap();
        let pairs: Vec<_> = stored.iter().map(|e| (e.minutes, e.checked)).collect();
        assert_eq!(pairs, vec![(1, false), (0, true)]);
    }

    #[tokio::test]
    async fn check_in_today_is_refused_once_checked() {
        let mut repo = repo_at(date(2024, 1, 3));
        repo.record_checkin(30, false).await.unwrap();

        let first = repo.check_in_today().await.unwrap();
        assert!(matches!(first, CheckinOutcome::Recorded(_)));
        assert_eq!(first.view().today.minutes, 30);
        assert!(first.view().today.checked);

        let second = repo.check_in_today().await.unwrap();
        assert!(matches!(second, CheckinOutcome::AlreadyCheckedIn(_)));
        assert_eq!(second.view().today.minutes, 30);
    }

    #[tokio::test]
    async fn saved_goal_shows_in_view() {
        let mut repo = repo_at(date(2024, 1, 3));
        let saved = repo.save_goal("  Linear algebra ", 90).await.unwrap();
        assert_eq!(saved.title, "Linear algebra");
        assert_eq!(saved.id, None);

        let view = repo.load_view(date(2024, 1, 3)).await;
        assert_eq!(view.goal.title, "Linear algebra");
        assert_eq!(view.goal.daily_minutes, 90);
    }

    #[tokio::test]
    async fn stats_cover_week_and_all_time() {
        let mut repo = repo_at(date(2024, 1, 3));
        repo.record_checkin(40, true).await.unwrap();

        let stats = repo.load_stats(repo.now_local()).await;
        assert_eq!(stats.totals.total_minutes, 40);
        assert_eq!(stats.totals.week_checked_days, 1);
        assert_eq!(stats.source, SourceStatus::Local);
    }

    #[tokio::test]
    async fn timer_session_records_rounded_minutes() {
        let db = Arc::new(Mutex::new(Database::open_memory().unwrap()));
        let start = date(2024, 1, 3).and_hms_opt(9, 0, 0).unwrap();

        let repo = Repository::local(Arc::clone(&db)).with_clock(Box::new(FixedClock::new(start)));
        repo.start_timer().unwrap();

        let stop_at = start + Duration::seconds(25 * 60 + 40);
        let mut repo = Repository::local(db).with_clock(Box::new(FixedClock::new(stop_at)));
        assert_eq!(repo.timer_status().unwrap().display, "25:40");

        let stopped = repo.stop_timer().await.unwrap().unwrap();
        assert_eq!(stopped.minutes, 26);
        assert_eq!(stopped.view.today.minutes, 26);
        assert!(!stopped.view.today.checked);
        assert!(!repo.timer_status().unwrap().is_running());
    }

    #[tokio::test]
    async fn stop_without_running_timer_records_nothing() {
        let mut repo = repo_at(date(2024, 1, 3));
        assert!(repo.stop_timer().await.unwrap().is_none());
        assert_eq!(repo.load_view(date(2024, 1, 3)).await.today.minutes, 0);
    }

    #[tokio::test]
    async fn cancel_discards_session() {
        let mut repo = repo_at(date(2024, 1, 3));
        repo.start_timer().unwrap();
        assert!(repo.cancel_timer().unwrap().is_running());
        assert!(repo.stop_timer().await.unwrap().is_none());
    }
}
