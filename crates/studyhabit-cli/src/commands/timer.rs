use clap::Subcommand;
use serde_json::json;

use super::{notice_submission, open_repository, print_json, CliResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start the stopwatch (no-op if already running)
    Start,
    /// Print elapsed time as JSON
    Status,
    /// Stop and log the session
    Stop,
    /// Discard the running session
    Cancel,
}

pub async fn run(action: TimerAction) -> CliResult {
    let mut repo = open_repository()?;

    match action {
        TimerAction::Start => print_json(&repo.start_timer()?),
        TimerAction::Status => print_json(&repo.timer_status()?),
        TimerAction::Stop => match repo.stop_timer().await? {
            Some(session) => {
                notice_submission(repo.submission_state());
                print_json(&session)
            }
            None => {
                eprintln!("notice: timer is not running");
                print_json(&json!({ "type": "timer_idle" }))
            }
        },
        TimerAction::Cancel => {
            let before = repo.cancel_timer()?;
            print_json(&json!({
                "type": "timer_cancelled",
                "discarded_secs": before.elapsed_secs,
            }))
        }
    }
}
