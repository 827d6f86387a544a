use chrono::NaiveDate;

use super::{notice, open_repository, print_json, CliResult};

pub async fn run(date: Option<NaiveDate>) -> CliResult {
    let mut repo = open_repository()?;
    let date = date.unwrap_or_else(|| repo.today());
    let view = repo.load_view(date).await;
    notice(&view.source);
    print_json(&view)
}
