mod cliff_walking;
mod frozen_lake;

use enum_dispatch::enum_dispatch;
use thiserror::Error;

pub use cliff_walking::CliffWalkingEnv;
pub use frozen_lake::FrozenLakeEnv;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvError {
    #[error("environment is not ready, call reset first")]
    NotReady,

    #[error("action {action} is outside of 0..{num_actions}")]
    InvalidAction { action: usize, num_actions: usize },

    #[error("unknown environment '{id}'")]
    UnknownEnvironment { id: String },

    #[error("environment was closed")]
    Closed,
}

/// Extra data returned by [`Environment::step`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepInfo {
    /// The episode ended because it hit its step limit, not a terminal state.
    pub truncated: bool,
}

/// Discrete environment driven through blocking reset/step calls.
///
/// States are indices in `0..num_states()` and actions indices in
/// `0..num_actions()`. Bounding episode length is the environment's job.
#[enum_dispatch]
pub trait Environment {
    fn reset(&mut self) -> Result<usize, EnvError>;
    fn step(&mut self, action: usize) -> Result<(usize, f64, bool, StepInfo), EnvError>;
    fn seed(&mut self, seed: u64);
    fn close(&mut self) -> Result<(), EnvError>;
    fn num_states(&self) -> usize;
    fn num_actions(&self) -> usize;
    fn render(&self) -> String;
}

#[derive(Debug, Clone)]
#[enum_dispatch(Environment)]
pub enum EnvironmentKind {
    CliffWalking(CliffWalkingEnv),
    FrozenLake(FrozenLakeEnv),
}

pub const ENVIRONMENT_IDS: [&str; 4] = [
    "CliffWalking-v0",
    "FrozenLake-v1",
    "FrozenLake8x8-v1",
    "FrozenLakeNotSlippery-v1",
];

/// Builds a registered environment by id, capping episodes at `max_steps`.
pub fn make(id: &str, max_steps: u64) -> Result<EnvironmentKind, EnvError> {
    match id {
        "CliffWalking-v0" => Ok(CliffWalkingEnv::new(max_steps).into()),
        "FrozenLake-v1" => Ok(FrozenLakeEnv::new(&FrozenLakeEnv::MAP_4X4, true, max_steps).into()),
        "FrozenLake8x8-v1" => {
            Ok(FrozenLakeEnv::new(&FrozenLakeEnv::MAP_8X8, true, max_steps).into())
        }
        "FrozenLakeNotSlippery-v1" => {
            Ok(FrozenLakeEnv::new(&FrozenLakeEnv::MAP_4X4, false, max_steps).into())
        }
        _ => Err(EnvError::UnknownEnvironment { id: id.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_knows_every_registered_id() {
        for id in ENVIRONMENT_IDS {
            let env = make(id, 10).unwrap();
            assert_eq!(env.num_actions(), 4);
            assert!(env.num_states() >= 16);
        }
        assert_eq!(
            make("GridWorld-v0", 10).unwrap_err(),
            EnvError::UnknownEnvironment {
                id: "GridWorld-v0".to_string()
            }
        );
    }

    #[test]
    fn dispatch_reaches_the_variant() {
        let mut env = make("CliffWalking-v0", 10).unwrap();
        assert_eq!(env.reset(), Ok(36));
        assert_eq!(env.num_states(), 48);
        assert!(env.render().contains('@'));
    }
}
