use kdam::{tqdm, Bar, BarExt};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::config::{NextActionSource, SarsaConfig};
use crate::env::{EnvError, Environment};
use crate::error::{Error, Result};
use crate::metrics::{MetricsSink, NoopSink};
use crate::policy::PolicyTable;
use crate::q_table::QTable;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeStats {
    pub index: u64,
    /// Number of transitions
    pub length: u64,
    /// Undiscounted sum of rewards
    pub ret: f64,
}

#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub q_table: QTable,
    pub policy: PolicyTable,
    pub episodes: Vec<EpisodeStats>,
}

impl TrainingReport {
    pub fn returns(&self) -> Vec<f64> {
        self.episodes.iter().map(|e| e.ret).collect()
    }

    pub fn lengths(&self) -> Vec<u64> {
        self.episodes.iter().map(|e| e.length).collect()
    }
}

fn checked_state(state: usize, num_states: usize) -> Result<usize> {
    if state < num_states {
        Ok(state)
    } else {
        Err(Error::StateOutOfRange { state, num_states })
    }
}

fn check_space<E: Environment + ?Sized>(env: &E) -> Result<(usize, usize)> {
    let num_states: usize = env.num_states();
    let num_actions: usize = env.num_actions();
    if num_states == 0 || num_actions == 0 {
        return Err(Error::EmptySpace {
            num_states,
            num_actions,
        });
    }
    Ok((num_states, num_actions))
}

fn progress_error(e: std::io::Error) -> Error {
    Error::Progress {
        message: e.to_string(),
    }
}

/// Runs SARSA episodes against an environment.
///
/// The configuration is validated on construction, so a runner that exists
/// can always start.
#[derive(Debug, Clone)]
pub struct EpisodeRunner {
    config: SarsaConfig,
    progress: bool,
}

impl EpisodeRunner {
    pub fn new(config: SarsaConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            progress: false,
        })
    }

    /// Shows a console progress bar while training.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Seeds the environment and a fresh random stream from the configured
    /// seed, then trains. An empty state or action space is rejected before
    /// the environment is seeded.
    pub fn run<E: Environment + ?Sized>(
        &self,
        env: &mut E,
        sink: Option<&mut dyn MetricsSink>,
    ) -> Result<TrainingReport> {
        check_space(env)?;
        let mut rng: StdRng = StdRng::seed_from_u64(self.config.seed);
        env.seed(self.config.seed);
        self.run_with_rng(env, &mut rng, sink)
    }

    /// Trains using `rng` for every action sample and tie-break.
    pub fn run_with_rng<E: Environment + ?Sized, R: Rng + ?Sized>(
        &self,
        env: &mut E,
        rng: &mut R,
        sink: Option<&mut dyn MetricsSink>,
    ) -> Result<TrainingReport> {
        let (num_states, num_actions) = check_space(env)?;

        info!("ARG alpha {}", self.config.alpha);
        info!("ARG epsilon {}", self.config.epsilon);
        info!("ARG gamma {}", self.config.gamma);
        info!("ARG num_episodes {}", self.config.num_episodes);
        info!("ARG seed {}", self.config.seed);
        info!("ARG next_action_source {}", self.config.next_action_source);

        let mut noop = NoopSink;
        let sink: &mut dyn MetricsSink = match sink {
            Some(sink) => sink,
            None => &mut noop,
        };

        let mut q_table = QTable::new(
            num_states,
            num_actions,
            self.config.alpha,
            self.config.gamma,
        );
        let mut policy = PolicyTable::new(num_states, num_actions, self.config.epsilon);
        let mut episodes: Vec<EpisodeStats> = Vec::new();

        let mut pb: Option<Bar> = if self.progress {
            let total: usize = usize::try_from(self.config.num_episodes).unwrap_or(usize::MAX);
            Some(tqdm!(total = total, desc = "Episode"))
        } else {
            None
        };

        for episode in 0..self.config.num_episodes {
            let stats: EpisodeStats = self
                .run_episode(env, episode, &mut q_table, &mut policy, rng)
                .map_err(|e| {
                    warn!(episode, error = %e, "episode aborted");
                    e
                })?;
            debug!(episode, length = stats.length, ret = stats.ret, "episode finished");

            sink.scalar("episode_length", stats.length as f64, episode)?;
            sink.scalar("episode_return", stats.ret, episode)?;

            if let Some(pb) = pb.as_mut() {
                pb.set_postfix(format!("length={}, return={}", stats.length, stats.ret));
                pb.update(1).map_err(progress_error)?;
            }
            episodes.push(stats);
        }
        sink.flush()?;

        Ok(TrainingReport {
            q_table,
            policy,
            episodes,
        })
    }

    /// Creates an environment with `env_fn`, trains on it and closes it.
    ///
    /// The environment is closed even when training fails; the training
    /// error wins over a close error.
    pub fn train<E, F>(&self, env_fn: F, sink: Option<&mut dyn MetricsSink>) -> Result<TrainingReport>
    where
        E: Environment,
        F: FnOnce() -> std::result::Result<E, EnvError>,
    {
        let mut env: E = env_fn()?;
        match self.run(&mut env, sink) {
            Ok(report) => {
                env.close()?;
                Ok(report)
            }
            Err(e) => {
                if let Err(close_error) = env.close() {
                    warn!(error = %close_error, "failed to close environment");
                }
                Err(e)
            }
        }
    }

    fn run_episode<E: Environment + ?Sized, R: Rng + ?Sized>(
        &self,
        env: &mut E,
        index: u64,
        q_table: &mut QTable,
        policy: &mut PolicyTable,
        rng: &mut R,
    ) -> Result<EpisodeStats> {
        let num_states: usize = q_table.num_states();
        let mut length: u64 = 0;
        let mut ret: f64 = 0.0;

        let mut state: usize = checked_state(env.reset()?, num_states)?;
        let mut action: usize = policy.sample(state, rng);
        loop {
            let (next_state, reward, done, _info) = env.step(action)?;
            let next_state: usize = checked_state(next_state, num_states)?;

            let next_action: usize = match self.config.next_action_source {
                NextActionSource::CurrentState => policy.sample(state, rng),
                NextActionSource::NextState => policy.sample(next_state, rng),
            };

            let target: f64 = q_table.td_target(reward, next_state, next_action);
            q_table.update(state, action, target);
            policy.derive(state, q_table, rng);

            state = next_state;
            action = next_action;
            length += 1;
            ret += reward;
            if done {
                break;
            }
        }
        Ok(EpisodeStats { index, length, ret })
    }
}

/// Creates an environment with `env_fn` and trains with a runner built from
/// `config`.
pub fn sarsa<E, F>(
    env_fn: F,
    config: &SarsaConfig,
    sink: Option<&mut dyn MetricsSink>,
) -> Result<TrainingReport>
where
    E: Environment,
    F: FnOnce() -> std::result::Result<E, EnvError>,
{
    EpisodeRunner::new(config.clone())?.train(env_fn, sink)
}

/// Plays `n_episodes` following `policy` without learning.
pub fn evaluate<E: Environment + ?Sized, R: Rng + ?Sized>(
    env: &mut E,
    policy: &PolicyTable,
    n_episodes: u64,
    rng: &mut R,
) -> Result<Vec<EpisodeStats>> {
    let num_states: usize = policy.probs().nrows();
    let mut results: Vec<EpisodeStats> = vec![];
    for index in 0..n_episodes {
        let mut length: u64 = 0;
        let mut ret: f64 = 0.0;
        let mut state: usize = checked_state(env.reset()?, num_states)?;
        loop {
            let action: usize = policy.sample(state, rng);
            let (next_state, reward, done, _info) = env.step(action)?;
            state = checked_state(next_state, num_states)?;
            length += 1;
            ret += reward;
            if done {
                break;
            }
        }
        results.push(EpisodeStats { index, length, ret });
    }
    Ok(results)
}
