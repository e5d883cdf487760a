//! Batch CLI: run a list of concept pairs through LLM-backed sessions
//! and write records plus a run summary to disk.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use undercover_agents::{ChatClient, LlmBinaryJudge, LlmPlayer, LlmScoreJudge, RunStore};
use undercover_core::batch::{BatchOrchestrator, BatchTask};
use undercover_core::{
    BatchConfig, BatchError, ConceptPair, EliminationPolicy, EvalDimension, GameSession,
    PlayerAgent, ScoreEvaluator, SessionConfig,
};

#[derive(Debug, Parser)]
#[command(name = "undercover-agents", about = "Batch runner for hidden-word deduction games")]
struct Args {
    /// JSON file with concept pairs: [{"majority": "...", "minority": "..."}]
    #[arg(long)]
    pairs: PathBuf,

    /// Output directory for game records and the run summary.
    #[arg(long, default_value = "results")]
    output: PathBuf,

    /// OpenAI-compatible API base URL.
    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    base_url: String,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Model backing the players.
    #[arg(long, default_value = "gpt-4o")]
    player_model: String,

    /// Model backing the score judge.
    #[arg(long, default_value = "gpt-4o")]
    judge_model: String,

    /// Seats at the table; the minority count is carved out of this.
    #[arg(long, default_value_t = 4)]
    players: usize,

    #[arg(long, default_value_t = 1)]
    minority: usize,

    /// Concurrently running sessions.
    #[arg(long, default_value_t = 3)]
    workers: usize,

    /// Sessions per concept pair.
    #[arg(long, default_value_t = 1)]
    rounds_per_pair: u32,

    /// Additional attempts after a failed session.
    #[arg(long, default_value_t = 2)]
    max_retries: u32,

    /// Base seed for reproducible shuffles and tie-breaks.
    #[arg(long)]
    seed: Option<u64>,

    /// Stop the whole batch once any task exhausts its retries.
    #[arg(long)]
    halt_on_error: bool,

    /// Judge with two per-dimension 0/1 verdicts instead of the
    /// score-threshold policy.
    #[arg(long)]
    binary_judges: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    if args.minority >= args.players {
        bail!("--minority must be smaller than --players");
    }

    let raw = fs::read_to_string(&args.pairs)
        .with_context(|| format!("reading pairs file {}", args.pairs.display()))?;
    let pairs: Vec<ConceptPair> =
        serde_json::from_str(&raw).context("pairs file must be a JSON array of concept pairs")?;
    if pairs.is_empty() {
        bail!("pairs file contains no concept pairs");
    }

    let player_client = Arc::new(ChatClient::new(
        &args.base_url,
        &args.api_key,
        &args.player_model,
    ));
    let judge_client = Arc::new(ChatClient::new(
        &args.base_url,
        &args.api_key,
        &args.judge_model,
    ));
    let policy = if args.binary_judges {
        EliminationPolicy::binary_judges(
            Arc::new(LlmBinaryJudge::new(
                Arc::clone(&judge_client),
                EvalDimension::Reasonableness,
            )),
            Arc::new(LlmBinaryJudge::new(
                Arc::clone(&judge_client),
                EvalDimension::Novelty,
            )),
        )
    } else {
        EliminationPolicy::score_threshold(vec![
            Arc::new(LlmScoreJudge::new(Arc::clone(&judge_client))) as Arc<dyn ScoreEvaluator>,
        ])
    };

    let session_config = SessionConfig {
        majority_count: args.players - args.minority,
        minority_count: args.minority,
        ..Default::default()
    };
    let batch_config = BatchConfig {
        max_workers: args.workers,
        rounds_per_pair: args.rounds_per_pair,
        max_retries: args.max_retries,
        continue_on_error: !args.halt_on_error,
        base_seed: args.seed,
        ..Default::default()
    };

    let seats = args.players;
    let provider = move |task: &BatchTask| {
        let players: Vec<Arc<dyn PlayerAgent>> = (0..seats)
            .map(|_| Arc::new(LlmPlayer::new(Arc::clone(&player_client))) as Arc<dyn PlayerAgent>)
            .collect();
        let mut session = GameSession::new(
            session_config.clone(),
            task.pair.clone(),
            players,
            policy.clone(),
        );
        if let Some(seed) = task.seed {
            session = session.with_seed(seed);
        }
        session
    };

    let orchestrator = BatchOrchestrator::new(batch_config, provider);
    let cancel = orchestrator.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received; finishing in-flight games and saving partial results");
            cancel.cancel();
        }
    });

    info!(pairs = pairs.len(), workers = args.workers, "starting batch run");
    let result = orchestrator.run(&pairs).await;

    // Whatever happened, persist everything that finished.
    let store = RunStore::new(&args.output)?;
    for game in orchestrator.aggregator().take_completed() {
        store.save_record(&game.record)?;
    }
    let summary = match result {
        Ok(summary) => summary,
        Err(BatchError::Halted(summary)) => *summary,
        Err(err) => return Err(err.into()),
    };
    store.save_summary(&summary)?;

    info!(
        completed = summary.completed,
        failed = summary.failed,
        duration = %summary.duration_formatted,
        games_per_minute = %format!("{:.2}", summary.games_per_minute),
        output = %store.dir().display(),
        "batch run finished"
    );
    if summary.halted {
        bail!("batch halted after a task exhausted its retries");
    }
    Ok(())
}
