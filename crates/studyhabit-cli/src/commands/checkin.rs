use studyhabit_core::CheckinOutcome;

use super::{notice, notice_submission, open_repository, print_json, CliResult};

/// Explicit check-in. With `minutes`, the check-in also logs study time.
pub async fn run_checkin(minutes: Option<i64>) -> CliResult {
    let mut repo = open_repository()?;

    let Some(minutes) = minutes else {
        let outcome = repo.check_in_today().await?;
        if let CheckinOutcome::AlreadyCheckedIn(view) = &outcome {
            eprintln!("notice: already checked in for {}", view.today.date);
        } else {
            notice_submission(repo.submission_state());
        }
        notice(&outcome.view().source);
        return print_json(&outcome);
    };

    let view = repo.record_checkin(minutes, true).await?;
    notice_submission(repo.submission_state());
    print_json(&view)
}

pub async fn run_record(minutes: i64, checked: bool) -> CliResult {
    let mut repo = open_repository()?;
    let view = repo.record_checkin(minutes, checked).await?;
    notice_submission(repo.submission_state());
    print_json(&view)
}
