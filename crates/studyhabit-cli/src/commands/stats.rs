use super::{notice, open_repository, print_json, CliResult};

pub async fn run() -> CliResult {
    let repo = open_repository()?;
    let stats = repo.load_stats(repo.now_local()).await;
    notice(&stats.source);
    print_json(&stats)
}
