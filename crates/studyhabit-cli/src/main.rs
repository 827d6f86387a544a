use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "studyhabit", version, about = "Daily study goal, check-ins and streaks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Today's progress, goal and streak
    View {
        /// Reference date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<chrono::NaiveDate>,
    },
    /// All-time and current-week totals
    Stats,
    /// Study goal management
    Goal {
        #[command(subcommand)]
        action: commands::goal::GoalAction,
    },
    /// Check in for today
    Checkin {
        /// Study minutes to log together with the check-in
        #[arg(long, allow_negative_numbers = true)]
        minutes: Option<i64>,
    },
    /// Log a manual study entry for today
    Record {
        /// Study minutes
        #[arg(long, allow_negative_numbers = true)]
        minutes: i64,
        /// Also mark the day as checked
        #[arg(long)]
        checked: bool,
    },
    /// Study stopwatch
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        shell: Shell,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("STUDYHABIT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Commands::View { date } => commands::view::run(date).await,
        Commands::Stats => commands::stats::run().await,
        Commands::Goal { action } => commands::goal::run(action).await,
        Commands::Checkin { minutes } => commands::checkin::run_checkin(minutes).await,
        Commands::Record { minutes, checked } => commands::checkin::run_record(minutes, checked).await,
        Commands::Timer { action } => commands::timer::run(action).await,
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "studyhabit", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
