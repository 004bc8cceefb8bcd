use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use plotters::style::{BLUE, RED};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tabular_sarsa::env::{make, Environment};
use tabular_sarsa::error::{Error, Result};
use tabular_sarsa::metrics::JsonLinesSink;
use tabular_sarsa::utils::{moving_average, plot_moving_average};
use tabular_sarsa::{evaluate, EpisodeRunner, NextActionSource, SarsaConfig};

extern crate structopt;

use structopt::StructOpt;

/// On-policy TD control with a tabular SARSA agent
#[derive(StructOpt, Debug)]
#[structopt(name = "RLRust - SARSA")]
struct Cli {
    /// Environment id (CliffWalking-v0, FrozenLake-v1, FrozenLake8x8-v1, FrozenLakeNotSlippery-v1)
    #[structopt(long = "env")]
    env: String,

    /// Step size
    #[structopt(long = "alpha", default_value = "0.1")]
    alpha: f64,

    /// Exploration rate
    #[structopt(long = "epsilon", default_value = "0.1")]
    epsilon: f64,

    /// Discount factor
    #[structopt(long = "gamma", default_value = "0.99")]
    gamma: f64,

    /// Number of training episodes
    #[structopt(long = "num_episodes", default_value = "100")]
    num_episodes: u64,

    /// Seed for every random source
    #[structopt(long = "seed", short = "s", default_value = "0")]
    seed: u64,

    /// Directory for experiment data
    #[structopt(long = "data_dir", default_value = "/tmp/exp/sarsa", parse(from_os_str))]
    data_dir: PathBuf,

    /// Maximum number of steps per episode
    #[structopt(long = "max_steps", default_value = "100")]
    max_steps: u64,

    /// Policy row the next action is drawn from: current_state or next_state
    #[structopt(long = "next_action", default_value = "current_state")]
    next_action: NextActionSource,

    /// Moving average window used on the return chart
    #[structopt(long = "moving_average_window", default_value = "10")]
    moving_average_window: usize,

    /// Episodes played with the learned policy after training
    #[structopt(long = "eval_episodes", default_value = "0")]
    eval_episodes: u64,

    /// Show a progress bar
    #[structopt(long = "progress")]
    progress: bool,
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = fs::File::create(path)
        .map_err(|e| Error::Io {
            operation: format!("create {}", path.display()),
            source: e,
        })?;
    serde_json::to_writer_pretty(file, value)?;
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config = SarsaConfig::new(
        cli.alpha,
        cli.epsilon,
        cli.gamma,
        cli.num_episodes,
        cli.seed,
    )
    .with_next_action_source(cli.next_action);
    config.validate()?;
    info!("ARG env {}", cli.env);
    info!("ARG data_dir {}", cli.data_dir.display());

    fs::create_dir_all(&cli.data_dir).map_err(|e| Error::Io {
        operation: format!("create directory {}", cli.data_dir.display()),
        source: e,
    })?;
    write_json(&cli.data_dir.join("config.json"), &config)?;

    let mut sink = JsonLinesSink::create(cli.data_dir.join("scalars.jsonl"))?;
    let now: Instant = Instant::now();
    let report = EpisodeRunner::new(config)?
        .with_progress(cli.progress)
        .train(|| make(&cli.env, cli.max_steps), Some(&mut sink))?;
    info!("trained {} episodes in {:.2?}", report.episodes.len(), now.elapsed());

    write_json(&cli.data_dir.join("q_table.json"), &report.q_table.to_rows())?;
    info!("greedy actions {:?}", report.q_table.greedy_actions());

    let returns: Vec<f64> = report.returns();
    let lengths: Vec<f64> = report.lengths().iter().map(|l| *l as f64).collect();
    let mean_return: f64 = returns.iter().sum::<f64>() / returns.len() as f64;
    info!("mean episode return {:.3}", mean_return);

    plot_moving_average(
        &cli.data_dir.join("episode_return.svg"),
        &[
            moving_average(cli.moving_average_window, &returns),
            moving_average(cli.moving_average_window, &lengths),
        ],
        &[&BLUE, &RED],
        &["episode_return", "episode_length"],
        "SARSA training",
    )?;

    if cli.eval_episodes > 0 {
        let mut env = make(&cli.env, cli.max_steps)?;
        env.seed(cli.seed);
        let mut rng: StdRng = StdRng::seed_from_u64(cli.seed);
        let stats = evaluate(&mut env, &report.policy, cli.eval_episodes, &mut rng)?;
        let mean: f64 = stats.iter().map(|s| s.ret).sum::<f64>() / stats.len() as f64;
        info!("evaluation over {} episodes: mean return {:.3}", stats.len(), mean);
        println!("{}", env.render());
        env.close()?;
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli: Cli = Cli::from_args();
    if let Err(e) = run(cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}
