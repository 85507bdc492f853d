//! tleap CLI - the user-facing command-line interface.

use std::process;

use clap::{Args, Parser, Subcommand};

use tleap_core::{Difficulty, Mode};

mod commands;

#[derive(Parser)]
#[command(
    name = "tleap",
    version,
    about = "Quiz question generator with history dedup and score logging"
)]
struct Cli {
    #[command(flatten)]
    global: commands::GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one example question set and log one example score
    Demo,

    /// Generate questions, skipping any already in the history
    Generate(GenerateArgs),

    /// Append a score record to the analysis CSV
    Log {
        /// Student identifier
        #[arg(long)]
        student_id: String,

        /// Questions answered correctly
        #[arg(long)]
        score: u32,

        /// Questions asked
        #[arg(long)]
        total: u32,

        /// Session mode: practice or test
        #[arg(long)]
        mode: Mode,

        /// Difficulty: easy, medium, hard (or beginner/intermediate/advanced)
        #[arg(long)]
        difficulty: Difficulty,
    },

    /// Show or clear the question history
    History {
        /// Remove every entry from the history file
        #[arg(long)]
        clear: bool,
    },

    /// Per-student score summary from the analysis CSV
    Summary,

    /// List available models
    ListModels {
        /// Filter to specific provider
        #[arg(long)]
        provider: Option<String>,
    },

    /// Create a starter tleap.toml
    Init,
}

#[derive(Args)]
struct GenerateArgs {
    /// School class, e.g. 10
    #[arg(long = "class")]
    class_level: String,

    #[arg(long)]
    subject: String,

    #[arg(long)]
    topic: String,

    /// Difficulty: easy, medium, hard (or beginner/intermediate/advanced)
    #[arg(long, default_value = "medium")]
    difficulty: Difficulty,

    /// Question type, e.g. MCQ, "Fill in the Blank", "True/False"
    #[arg(long, default_value = "MCQ")]
    qtype: String,

    #[arg(long, default_value = "English")]
    language: String,

    /// Number of questions to ask for
    #[arg(long, default_value = "5")]
    num: u32,

    /// Provider name from the config (defaults to default_provider)
    #[arg(long)]
    provider: Option<String>,

    /// Model identifier (defaults to default_model)
    #[arg(long)]
    model: Option<String>,

    /// Sampling temperature
    #[arg(long)]
    temperature: Option<f64>,

    /// Maximum output tokens
    #[arg(long)]
    max_tokens: Option<u32>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tleap=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let global = cli.global;

    let result = match cli.command {
        Commands::Demo => commands::demo::execute(&global).await,
        Commands::Generate(args) => {
            let request = tleap_core::QuestionRequest {
                class_level: args.class_level,
                subject: args.subject,
                topic: args.topic,
                difficulty: args.difficulty,
                question_type: args.qtype,
                language: args.language,
                count: args.num,
            };
            let overrides = commands::ModelOverrides {
                provider: args.provider,
                model: args.model,
                temperature: args.temperature,
                max_tokens: args.max_tokens,
            };
            commands::generate::execute(&global, request, overrides).await
        }
        Commands::Log {
            student_id,
            score,
            total,
            mode,
            difficulty,
        } => commands::log::execute(&global, student_id, score, total, mode, difficulty),
        Commands::History { clear } => commands::history::execute(&global, clear),
        Commands::Summary => commands::summary::execute(&global),
        Commands::ListModels { provider } => commands::list_models::execute(&global, provider).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
