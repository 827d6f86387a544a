//! Persisted record shapes: the study goal and check-in events.
//!
//! Both records serialize with camelCase field names so the same JSON
//! shape is used by the local key-value store and the remote collections.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::GoalDefaults;

/// Title shown when no goal has been saved yet.
pub const DEFAULT_GOAL_TITLE: &str = "Study goal";

/// Daily minutes target used when no goal has been saved yet.
pub const DEFAULT_DAILY_MINUTES: u32 = 60;

/// The user's single active study goal.
///
/// `id` is only present when the goal lives in the remote collection; the
/// local store keeps exactly one goal value and has no identifier concept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub daily_minutes: u32,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    /// Build a goal that has never been persisted.
    pub fn new(title: impl Into<String>, daily_minutes: u32, now: DateTime<Utc>) -> Self {
        Self {
            id: None,
            title: title.into(),
            daily_minutes,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Goal fields as presented to the user, defaults already applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalView {
    pub id: Option<String>,
    pub title: String,
    pub daily_minutes: u32,
}

impl GoalView {
    /// Present `goal`, falling back to `defaults` when no goal was saved, the
    /// title is blank or the daily target is zero.
    pub fn from_goal(goal: Option<&Goal>, defaults: &GoalDefaults) -> Self {
        let Some(goal) = goal else {
            return Self {
                id: None,
                title: defaults.default_title.clone(),
                daily_minutes: defaults.default_daily_minutes,
            };
        };

        let title = if goal.title.trim().is_empty() {
            defaults.default_title.clone()
        } else {
            goal.title.clone()
        };
        let daily_minutes = if goal.daily_minutes == 0 {
            defaults.default_daily_minutes
        } else {
            goal.daily_minutes
        };
        Self {
            id: goal.id.clone(),
            title,
            daily_minutes,
        }
    }
}

impl Default for GoalView {
    fn default() -> Self {
        Self::from_goal(None, &GoalDefaults::default())
    }
}

/// A single study event: an explicit check-in or a finished timed session.
///
/// Events are append-only. Several events may share a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckinEvent {
    /// Local calendar date, serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    #[serde(default)]
    pub minutes: u32,
    #[serde(default)]
    pub checked: bool,
    pub created_at: DateTime<Utc>,
}

impl CheckinEvent {
    pub fn new(date: NaiveDate, minutes: u32, checked: bool, created_at: DateTime<Utc>) -> Self {
        Self {
            date,
            minutes,
            checked,
            created_at,
        }
    }
}
