use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use interview_coach::{
    create_router, AppState, Config, Difficulty, HttpQuestionClient, HttpScoringClient,
    QuestionRequest, QuestionSource,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "interview-coach", version, about = "Rehearse timed interview answers")]
struct Cli {
    /// Config file, without extension
    #[arg(long, default_value = "config/interview-coach")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API for the browser client
    Serve,

    /// Fetch a generated question list and print it
    Questions {
        #[arg(long)]
        role: String,
        /// Years of experience
        #[arg(long)]
        experience: String,
        /// Industry, domain or subject
        #[arg(long)]
        industry: String,
        #[arg(long, default_value = "intermediate")]
        difficulty: Difficulty,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    info!("Loaded config: {}", cfg.service.name);

    match cli.command {
        Command::Serve => serve(cfg).await,
        Command::Questions {
            role,
            experience,
            industry,
            difficulty,
        } => {
            let client = HttpQuestionClient::new(&cfg.questions.url, cfg.questions.timeout())?;
            let request = QuestionRequest {
                role,
                experience,
                domain: industry,
                difficulty,
            };

            let questions = client
                .generate(&request)
                .await
                .context("Failed to generate questions")?;

            for (i, question) in questions.iter().enumerate() {
                println!("{}. {}", i + 1, question);
            }
            Ok(())
        }
    }
}

async fn serve(cfg: Config) -> Result<()> {
    let scorer = HttpScoringClient::new(&cfg.scoring.url, cfg.scoring.timeout())
        .context("Invalid scoring service URL")?;
    let questions = HttpQuestionClient::new(&cfg.questions.url, cfg.questions.timeout())
        .context("Invalid question service URL")?;

    info!("Scoring service: {}", cfg.scoring.url);
    info!("Question service: {}", cfg.questions.url);
    info!(
        "Answer time limit: {}s",
        cfg.interview.answer_time_limit_secs
    );

    let state = AppState::new(
        Arc::new(scorer),
        Arc::new(questions),
        cfg.interview.session_config(),
    );
    let app = create_router(state);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
