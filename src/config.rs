use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which policy row the follow-up action is drawn from after a step.
///
/// `CurrentState` samples from the row of the state being left. This is the
/// historical behaviour of the training loop and stays the default so that
/// seeded runs reproduce earlier results. `NextState` samples from the row of
/// the state just entered, which is textbook SARSA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextActionSource {
    #[default]
    CurrentState,
    NextState,
}

impl FromStr for NextActionSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "current_state" => Ok(Self::CurrentState),
            "next_state" => Ok(Self::NextState),
            other => Err(format!(
                "unknown next action source '{}' (expected current_state or next_state)",
                other
            )),
        }
    }
}

impl Display for NextActionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CurrentState => write!(f, "current_state"),
            Self::NextState => write!(f, "next_state"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SarsaConfig {
    /// Step size, in (0, 1]
    pub alpha: f64,
    /// Exploration rate, in [0, 1]
    pub epsilon: f64,
    /// Discount factor, in [0, 1]
    pub gamma: f64,
    pub num_episodes: u64,
    pub seed: u64,
    #[serde(default)]
    pub next_action_source: NextActionSource,
}

impl Default for SarsaConfig {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            epsilon: 0.1,
            gamma: 0.99,
            num_episodes: 100,
            seed: 0,
            next_action_source: NextActionSource::CurrentState,
        }
    }
}

fn invalid(parameter: &'static str, value: impl Display, expected: &'static str) -> Error {
    Error::InvalidConfiguration {
        parameter,
        value: value.to_string(),
        expected,
    }
}

impl SarsaConfig {
    pub fn new(alpha: f64, epsilon: f64, gamma: f64, num_episodes: u64, seed: u64) -> Self {
        Self {
            alpha,
            epsilon,
            gamma,
            num_episodes,
            seed,
            next_action_source: NextActionSource::default(),
        }
    }

    pub fn with_next_action_source(mut self, source: NextActionSource) -> Self {
        self.next_action_source = source;
        self
    }

    /// Checks every bound, reporting the first one violated. Comparisons are
    /// written so that NaN fails them.
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(invalid("alpha", self.alpha, "a value in (0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(invalid("epsilon", self.epsilon, "a value in [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(invalid("gamma", self.gamma, "a value in [0, 1]"));
        }
        if self.num_episodes == 0 {
            return Err(invalid("num_episodes", self.num_episodes, "a positive count"));
        }
        Ok(())
    }
}
