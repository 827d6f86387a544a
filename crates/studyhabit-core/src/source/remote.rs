use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::{RecordSource, SourceKind};
use crate::error::SourceError;
use crate::model::{CheckinEvent, Goal};

/// Fixed page size for every skip/limit query.
pub const PAGE_SIZE: usize = 50;

pub const COLLECTION_GOALS: &str = "goals";
pub const COLLECTION_CHECKINS: &str = "checkins";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Raw operations on a named remote document collection.
///
/// The store assigns `_id` and `createdAt` on insert.
#[async_trait]
pub trait DocumentCollection: Send + Sync {
    /// One page of documents ordered by `createdAt`, skipping `skip`.
    async fn page(
        &self,
        collection: &str,
        skip: usize,
        limit: usize,
        order: SortOrder,
    ) -> Result<Vec<Value>, SourceError>;

    /// Insert a document and return its assigned `_id`.
    async fn add(&self, collection: &str, data: Value) -> Result<String, SourceError>;

    /// Patch fields of an existing document.
    async fn update(&self, collection: &str, id: &str, data: Value) -> Result<(), SourceError>;
}

/// Check-in document as stored remotely.
///
/// `createdAt` is assigned by the server; `localCreatedAt` is the device's
/// clock in epoch milliseconds and is only used when the server value is
/// missing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckinDocument {
    date: NaiveDate,
    #[serde(default)]
    minutes: u32,
    #[serde(default)]
    checked: bool,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    local_created_at: Option<i64>,
}

impl From<CheckinDocument> for CheckinEvent {
    fn from(doc: CheckinDocument) -> Self {
        let created_at = doc
            .created_at
            .or_else(|| doc.local_created_at.and_then(DateTime::<Utc>::from_timestamp_millis))
            .unwrap_or_default();
        CheckinEvent::new(doc.date, doc.minutes, doc.checked, created_at)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewCheckinDocument {
    date: NaiveDate,
    minutes: u32,
    checked: bool,
    local_created_at: i64,
}

/// Record source backed by a remote document collection.
pub struct RemoteSource<C> {
    collection: C,
}

impl<C: DocumentCollection> RemoteSource<C> {
    pub fn new(collection: C) -> Self {
        Self { collection }
    }

    pub fn collection(&self) -> &C {
        &self.collection
    }

    /// Read every document of `name` in pages of [`PAGE_SIZE`].
    ///
    /// Pages are requested strictly one after another; the loop ends on the
    /// first page shorter than the page size, which may be empty.
    async fn fetch_pages(&self, name: &str) -> Result<Vec<Value>, SourceError> {
        let mut all = Vec::new();
        let mut skip = 0;

        loop {
            let page = self
                .collection
                .page(name, skip, PAGE_SIZE, SortOrder::Asc)
                .await?;
            let len = page.len();
            debug!(collection = name, skip, len, "fetched page");
            all.extend(page);

            if len < PAGE_SIZE {
                break;
            }
            skip += PAGE_SIZE;
        }

        Ok(all)
    }
}

#[async_trait]
impl<C: DocumentCollection> RecordSource for RemoteSource<C> {
    fn kind(&self) -> SourceKind {
        SourceKind::Remote
    }

    async fn fetch_all(&self) -> Result<Vec<CheckinEvent>, SourceError> {
        self.fetch_pages(COLLECTION_CHECKINS)
            .await?
            .into_iter()
            .map(|doc| {
                serde_json::from_value::<CheckinDocument>(doc)
                    .map(CheckinEvent::from)
                    .map_err(|e| SourceError::decode("check-in document", e))
            })
            .collect()
    }

    async fn fetch_goal(&self) -> Result<Option<Goal>, SourceError> {
        let latest = self
            .collection
            .page(COLLECTION_GOALS, 0, 1, SortOrder::Desc)
            .await?;

        latest
            .into_iter()
            .next()
            .map(|doc| {
                serde_json::from_value::<Goal>(doc).map_err(|e| SourceError::decode("goal document", e))
            })
            .transpose()
    }

    async fn upsert_goal(&self, goal: Goal) -> Result<Goal, SourceError> {
        match goal.id.as_deref() {
            Some(id) => {
                let data = json!({
                    "title": goal.title,
                    "dailyMinutes": goal.daily_minutes,
                    "updatedAt": goal.updated_at,
                });
                self.collection.update(COLLECTION_GOALS, id, data).await?;
                Ok(goal)
            }
            None => {
                let data = json!({
                    "title": goal.title,
                    "dailyMinutes": goal.daily_minutes,
                    "createdAt": goal.created_at,
                    "updatedAt": goal.updated_at,
                });
                let id = self.collection.add(COLLECTION_GOALS, data).await?;
                Ok(Goal {
                    id: Some(id),
                    ..goal
                })
            }
        }
    }

    async fn append_checkin(&self, event: CheckinEvent) -> Result<(), SourceError> {
        let doc = NewCheckinDocument {
            date: event.date,
            minutes: event.minutes,
            checked: event.checked,
            local_created_at: event.created_at.timestamp_millis(),
        };
        let data = serde_json::to_value(doc).map_err(|e| SourceError::decode("check-in", e))?;
        self.collection.add(COLLECTION_CHECKINS, data).await?;
        Ok(())
    }
}
