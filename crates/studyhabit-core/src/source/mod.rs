//! Record sources: a uniform async contract over where check-ins live.
//!
//! - [`LocalSource`]: the whole dataset as single values in the on-device
//!   key-value store. Never paginated; absence of data is an empty result.
//! - [`RemoteSource`]: a remote document collection read in fixed-size
//!   pages through a [`DocumentCollection`].
//!
//! The repository depends only on [`RecordSource`] and never on which
//! variant is active.

mod http;
mod local;
mod remote;

pub use http::HttpCollection;
pub use local::{LocalSource, STORAGE_CHECKINS, STORAGE_GOAL};
pub use remote::{
    DocumentCollection, RemoteSource, SortOrder, COLLECTION_CHECKINS, COLLECTION_GOALS, PAGE_SIZE,
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SourceError;
use crate::model::{CheckinEvent, Goal};

/// Which kind of store a source talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Local,
    Remote,
}

/// Every store the repository can read from and write to implements this
/// trait.
#[async_trait]
pub trait RecordSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// All check-in events, in no particular order.
    async fn fetch_all(&self) -> Result<Vec<CheckinEvent>, SourceError>;

    /// The current goal, if one was ever saved.
    async fn fetch_goal(&self) -> Result<Option<Goal>, SourceError>;

    /// Create or replace the goal. Returns the goal as stored, including
    /// any identifier the store assigned.
    async fn upsert_goal(&self, goal: Goal) -> Result<Goal, SourceError>;

    /// Append one check-in event.
    async fn append_checkin(&self, event: CheckinEvent) -> Result<(), SourceError>;
}
