pub mod checkin;
pub mod config;
pub mod goal;
pub mod stats;
pub mod timer;
pub mod view;

use serde::Serialize;
use tracing::debug;
use studyhabit_core::{Config, Database, Repository, SourceStatus, SubmissionState};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Open the local database and pick the record source for this run.
pub fn open_repository() -> Result<Repository, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;
    let repo = Repository::from_config(&config, db);
    debug!(source = ?repo.active_kind(), "repository ready");
    Ok(repo)
}

pub fn print_json<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Report a degraded source on stderr.
pub fn notice(status: &SourceStatus) {
    if let Some(message) = status.notice() {
        eprintln!("notice: {message}");
    }
}

/// Report where the last write landed, if it was not the active source.
pub fn notice_submission(state: &SubmissionState) {
    if let SubmissionState::Committed { source } = state {
        notice(source);
    }
}
