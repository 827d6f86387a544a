use clap::Subcommand;
use serde_json::json;

use super::{notice, notice_submission, open_repository, print_json, CliResult};

#[derive(Subcommand)]
pub enum GoalAction {
    /// Print the current goal as JSON
    Show,
    /// Create or update the goal
    Set {
        /// Goal title
        #[arg(long)]
        title: String,
        /// Daily target in minutes
        #[arg(long, allow_negative_numbers = true)]
        minutes: i64,
    },
}

pub async fn run(action: GoalAction) -> CliResult {
    let mut repo = open_repository()?;

    match action {
        GoalAction::Show => {
            let (goal, source) = repo.current_goal().await;
            notice(&source);
            print_json(&json!({ "goal": goal, "source": source }))
        }
        GoalAction::Set { title, minutes } => {
            let saved = repo.save_goal(&title, minutes).await?;
            notice_submission(repo.submission_state());
            print_json(&saved)
        }
    }
}
