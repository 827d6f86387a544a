//! # Studyhabit Core Library
//!
//! Core logic for the studyhabit tracker: a daily study-minutes goal, check-in
//! events, streaks and period totals. All operations are exposed through the
//! `studyhabit` CLI binary, which is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Record sources**: one async contract over the on-device SQLite
//!   key-value store and a remote, paginated document collection
//! - **Stats**: pure folds from raw events to per-day summaries, streaks and
//!   weekly/all-time totals
//! - **Repository**: picks the source once per session, falls back to the
//!   local store when the remote one fails, and composes view models
//! - **Storage**: SQLite key-value table and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`Repository`]: the API the presentation layer talks to
//! - [`RecordSource`]: trait implemented by [`LocalSource`] and [`RemoteSource`]
//! - [`Database`]: local key-value persistence
//! - [`Config`]: application configuration management

pub mod clock;
pub mod error;
pub mod model;
pub mod repository;
pub mod source;
pub mod stats;
pub mod stopwatch;
pub mod storage;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ConfigError, CoreError, DatabaseError, SourceError, ValidationError};
pub use model::{CheckinEvent, Goal, GoalView, DEFAULT_DAILY_MINUTES, DEFAULT_GOAL_TITLE};
pub use repository::{
    CheckinOutcome, Repository, SourceStatus, StatsView, StoppedSession, SubmissionState,
    ViewModel,
};
pub use source::{
    DocumentCollection, HttpCollection, LocalSource, RecordSource, RemoteSource, SourceKind,
    PAGE_SIZE,
};
pub use stats::{aggregate, period_totals, streak, week_start, DailyMap, DailySummary, PeriodTotals};
pub use stopwatch::{Stopwatch, StopwatchState, StopwatchStatus};
pub use storage::{Config, Database, GoalDefaults, RemoteConfig};
