use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use snake_dqn::game::GameConfig;
use snake_dqn::modes::{PlayConfig, PlayMode, TrainConfig, TrainMode, prompt_resume};
use snake_dqn::rl::{AgentConfig, InferenceBackend, TrainingBackend, default_device};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "snake_dqn")]
#[command(version, about = "Snake game learned with deep Q-learning")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info", env = "SNAKE_LOG")]
    log_level: String,

    /// TOML file with [game] and [agent] tables
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Train the agent, saving the model on every new record
    Train(TrainArgs),
    /// Watch a saved model play greedily
    Play(PlayArgs),
}

#[derive(Args)]
struct TrainArgs {
    /// Start from fresh parameters
    #[arg(long, conflicts_with = "resume")]
    fresh: bool,

    /// Resume from the saved model
    #[arg(long)]
    resume: bool,

    /// Stop after this many episodes (default: run until interrupted)
    #[arg(long)]
    episodes: Option<usize>,

    /// Model path
    #[arg(long, default_value = "model/model.mpk")]
    model: PathBuf,

    /// Seed for the shared random source
    #[arg(long)]
    seed: Option<u64>,

    /// Log progress every N episodes
    #[arg(long, default_value_t = 1)]
    log_frequency: usize,
}

#[derive(Args)]
struct PlayArgs {
    /// Model path
    #[arg(long, default_value = "model/model.mpk")]
    model: PathBuf,

    /// Number of games to play
    #[arg(long, default_value_t = 10)]
    games: usize,

    /// Seed for food placement
    #[arg(long)]
    seed: Option<u64>,
}

/// Optional on-disk configuration
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    game: GameConfig,
    agent: AgentConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let file_config = load_file_config(cli.config.as_deref())?;

    match cli.command {
        Command::Train(args) => train(args, file_config),
        Command::Play(args) => play(args, file_config),
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn load_file_config(path: Option<&Path>) -> Result<FileConfig> {
    let Some(path) = path else {
        return Ok(FileConfig::default());
    };

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {:?}", path))?;
    let config: FileConfig =
        toml::from_str(&text).with_context(|| format!("Invalid config file {:?}", path))?;
    info!(path = %path.display(), "Loaded configuration");
    Ok(config)
}

fn train(args: TrainArgs, file_config: FileConfig) -> Result<()> {
    let resume = if args.resume {
        true
    } else if args.fresh {
        false
    } else {
        let stdin = std::io::stdin();
        prompt_resume(stdin.lock(), std::io::stdout())?
    };

    let mut agent_config = file_config.agent;
    if args.seed.is_some() {
        agent_config.seed = args.seed;
    }

    let config = TrainConfig {
        num_episodes: args.episodes,
        log_frequency: args.log_frequency,
        resume,
        game_config: file_config.game,
        agent_config,
        ..TrainConfig::new(args.model)
    };

    let mut train_mode = TrainMode::<TrainingBackend>::new(config, default_device())?;
    train_mode.run()?;
    Ok(())
}

fn play(args: PlayArgs, file_config: FileConfig) -> Result<()> {
    let config = PlayConfig {
        num_games: args.games,
        hidden_size: file_config.agent.hidden_size,
        seed: args.seed.or(file_config.agent.seed),
        game_config: file_config.game,
        ..PlayConfig::new(args.model)
    };

    let mut play_mode = PlayMode::<InferenceBackend>::new(config, default_device())?;
    play_mode.run()?;
    Ok(())
}
