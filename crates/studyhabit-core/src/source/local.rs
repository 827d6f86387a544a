use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{RecordSource, SourceKind};
use crate::error::{DatabaseError, SourceError};
use crate::model::{CheckinEvent, Goal};
use crate::storage::Database;

/// Key holding the single goal value.
pub const STORAGE_GOAL: &str = "study_goal";
/// Key holding the full list of check-in events.
pub const STORAGE_CHECKINS: &str = "study_checkins";

/// Check-ins and goal stored as whole JSON values in the local kv table.
#[derive(Clone)]
pub struct LocalSource {
    db: Arc<Mutex<Database>>,
}

impl LocalSource {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db }
    }

    fn db(&self) -> Result<MutexGuard<'_, Database>, SourceError> {
        self.db
            .lock()
            .map_err(|_| SourceError::Store(DatabaseError::QueryFailed("local store lock poisoned".into())))
    }

    fn read_checkins(db: &Database) -> Result<Vec<CheckinEvent>, SourceError> {
        Ok(db
            .kv_get_json::<Vec<CheckinEvent>>(STORAGE_CHECKINS)?
            .unwrap_or_default())
    }
}

#[async_trait]
impl RecordSource for LocalSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Local
    }

    async fn fetch_all(&self) -> Result<Vec<CheckinEvent>, SourceError> {
        let db = self.db()?;
        Self::read_checkins(&db)
    }

    async fn fetch_goal(&self) -> Result<Option<Goal>, SourceError> {
        let db = self.db()?;
        Ok(db.kv_get_json::<Goal>(STORAGE_GOAL)?)
    }

    async fn upsert_goal(&self, goal: Goal) -> Result<Goal, SourceError> {
        let db = self.db()?;
        let created_at = db
            .kv_get_json::<Goal>(STORAGE_GOAL)?
            .map(|existing| existing.created_at)
            .unwrap_or(goal.created_at);

        let stored = Goal {
            id: None,
            created_at,
            ..goal
        };
        db.kv_set_json(STORAGE_GOAL, &stored)?;
        Ok(stored)
    }

    async fn append_checkin(&self, event: CheckinEvent) -> Result<(), SourceError> {
        let db = self.db()?;
        let mut records = Self::read_checkins(&db)?;
        records.push(event);
        db.kv_set_json(STORAGE_CHECKINS, &records)?;
        Ok(())
    }
}
