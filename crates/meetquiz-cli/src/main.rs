//! meetquiz CLI: drive the quiz engine against a local JSON state file.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use meetquiz_core::{QuizError, QuizType};

mod commands;

#[derive(Parser)]
#[command(
    name = "meetquiz",
    version,
    about = "Meeting comprehension quizzes and performance evaluations"
)]
struct Cli {
    /// Config file path (default: ./meetquiz.toml, then ~/.config/meetquiz/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// State file path (overrides `state_path` from the config)
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter meetquiz.toml
    Init,

    /// Load demo users, meetings, transcripts, and an intro quiz
    Seed,

    /// Get or generate a meeting's intro/outro quiz
    Quiz {
        meeting_id: i64,

        /// Quiz type: intro or outro
        #[arg(long = "type", default_value = "intro")]
        quiz_type: QuizType,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Get or generate a meeting's summary
    Summary { meeting_id: i64 },

    /// Show a stored quiz without its answers
    ShowQuiz {
        quiz_id: i64,

        #[arg(long)]
        json: bool,
    },

    /// Grade a submission against a quiz
    Submit {
        quiz_id: i64,

        #[arg(long)]
        user: String,

        /// Selected answer index per question, in question order (e.g. "0,2,1,3,0")
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
        answers: Vec<i64>,

        #[arg(long)]
        json: bool,
    },

    /// List a user's quiz attempts, newest first
    Attempts {
        #[arg(long)]
        user: String,

        /// Only attempts against this quiz
        #[arg(long)]
        quiz: Option<i64>,
    },

    /// Evaluate a user's performance in a meeting (one-shot)
    Evaluate {
        meeting_id: i64,

        #[arg(long)]
        user: String,

        #[arg(long)]
        json: bool,
    },

    /// Aggregate a meeting's evaluations into a team evaluation
    Team {
        meeting_id: i64,

        #[arg(long)]
        json: bool,
    },

    /// Show a user's score and credits
    User { username: String },

    /// Show a meeting's summary status
    Meeting { meeting_id: i64 },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("meetquiz=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let paths = commands::Paths {
        config: cli.config,
        state: cli.state,
    };

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Seed => commands::seed::execute(&paths).await,
        Commands::Quiz {
            meeting_id,
            quiz_type,
            json,
        } => commands::quiz::execute(&paths, meeting_id, quiz_type, json).await,
        Commands::Summary { meeting_id } => commands::summary::execute(&paths, meeting_id).await,
        Commands::ShowQuiz { quiz_id, json } => {
            commands::show_quiz::execute(&paths, quiz_id, json).await
        }
        Commands::Submit {
            quiz_id,
            user,
            answers,
            json,
        } => commands::submit::execute(&paths, quiz_id, &user, answers, json).await,
        Commands::Attempts { user, quiz } => {
            commands::attempts::execute(&paths, &user, quiz).await
        }
        Commands::Evaluate {
            meeting_id,
            user,
            json,
        } => commands::evaluate::execute(&paths, meeting_id, &user, json).await,
        Commands::Team { meeting_id, json } => {
            commands::team::execute(&paths, meeting_id, json).await
        }
        Commands::User { username } => commands::user::execute(&paths, &username).await,
        Commands::Meeting { meeting_id } => commands::meeting::execute(&paths, meeting_id).await,
    };

    if let Err(e) = result {
        if let Some(err) = e.downcast_ref::<QuizError>() {
            tracing::debug!(kind = err.kind(), "command failed");
        }
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
