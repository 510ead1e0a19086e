use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use cosmic_tracer::config::AppConfig;
use cosmic_tracer::game::GameEngine;
use cosmic_tracer::logging;
use cosmic_tracer::modes::{LeaderboardMode, PlayMode};
use cosmic_tracer::render::RenderOptions;
use cosmic_tracer::service::{HttpScoreService, ScoreService};
use cosmic_tracer::storage::BestScoreStore;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "cosmic_tracer")]
#[command(version, about = "Cosmic Tracer: snake with bombs, bonuses and a leaderboard")]
struct Cli {
    /// What to run
    #[arg(long, default_value = "play")]
    mode: Mode,

    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid width
    #[arg(long)]
    width: Option<usize>,

    /// Grid height
    #[arg(long)]
    height: Option<usize>,

    /// Leave one edge and come back in at the opposite one
    #[arg(long)]
    wrap: bool,

    /// Disable bombs
    #[arg(long)]
    no_hazards: bool,

    /// Disable power-ups
    #[arg(long)]
    no_bonuses: bool,

    /// Hide the background grid
    #[arg(long)]
    no_grid: bool,

    /// Seed for reproducible spawns
    #[arg(long)]
    seed: Option<u64>,

    /// Score service base URL
    #[arg(long)]
    server_url: Option<String>,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Where to keep the local best score
    #[arg(long)]
    best_score_file: Option<PathBuf>,

    /// Leaderboard rows to print
    #[arg(long, default_value = "10")]
    limit: usize,
}

#[derive(Clone, ValueEnum)]
enum Mode {
    /// Play in the terminal with keyboard controls
    Play,
    /// Print the top scores from the score service
    Leaderboard,
}

impl Cli {
    /// Layer command-line flags over the loaded config
    fn apply_to(&self, config: &mut AppConfig) {
        if let Some(width) = self.width {
            config.game.grid_width = width;
        }
        if let Some(height) = self.height {
            config.game.grid_height = height;
        }
        if self.wrap {
            config.game.wrap_around = true;
        }
        if self.no_hazards {
            config.game.hazards_enabled = false;
        }
        if self.no_bonuses {
            config.game.bonuses_enabled = false;
        }
        if let Some(url) = &self.server_url {
            config.service.base_url = Some(url.clone());
        }
        if let Some(path) = &self.log_file {
            config.log_file = Some(path.clone());
        }
        if let Some(path) = &self.best_score_file {
            config.best_score_path = Some(path.clone());
        }
    }
}

fn best_score_store(config: &AppConfig) -> Result<BestScoreStore> {
    match &config.best_score_path {
        Some(path) => Ok(BestScoreStore::new(path.clone())),
        None => BestScoreStore::default_location(),
    }
}

fn score_service(config: &AppConfig) -> Option<Arc<dyn ScoreService>> {
    let base_url = config.service.base_url.as_ref()?;
    Some(Arc::new(HttpScoreService::new(
        base_url.clone(),
        config.service.token.clone(),
        config.service.timeout(),
    )))
}

async fn run_play(cli: &Cli, config: AppConfig) -> Result<()> {
    if let Some(path) = &config.log_file {
        logging::init_file(path, config.log_level.as_deref())?;
    }

    let play = match cli.seed {
        Some(seed) => PlayMode::with_engine(GameEngine::with_seed(config.game.clone(), seed)),
        None => PlayMode::new(config.game.clone()),
    };
    let mut play = play.with_options(RenderOptions {
        show_grid: !cli.no_grid,
    });

    match best_score_store(&config) {
        Ok(store) => {
            info!(path = ?store.path(), "using best score store");
            play = play.with_store(store);
        }
        Err(err) => warn!(error = %err, "best score will not be saved"),
    }

    if let Some(service) = score_service(&config) {
        play = play.with_service(service);
    }

    play.run().await
}

async fn run_leaderboard(cli: &Cli, config: AppConfig) -> Result<()> {
    logging::init_stderr(config.log_level.as_deref())?;

    let service = score_service(&config)
        .context("No score service configured; pass --server-url or set [service] base_url")?;

    let mut mode = LeaderboardMode::new(service).with_limit(cli.limit);
    if let Ok(best) = best_score_store(&config).and_then(|store| store.load()) {
        mode = mode.with_local_best(best);
    }

    mode.run().await
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    }
    .with_token_from_env();
    cli.apply_to(&mut config);

    config
        .game
        .validate()
        .context("Invalid game configuration")?;

    // Dispatch to appropriate mode
    match cli.mode {
        Mode::Play => run_play(&cli, config).await,
        Mode::Leaderboard => run_leaderboard(&cli, config).await,
    }
}
