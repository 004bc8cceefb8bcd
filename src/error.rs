use thiserror::Error;

use crate::env::EnvError;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid configuration: {parameter} = {value} (expected {expected})")]
    InvalidConfiguration {
        parameter: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("environment reports an empty space: {num_states} states, {num_actions} actions")]
    EmptySpace {
        num_states: usize,
        num_actions: usize,
    },

    #[error("environment error: {0}")]
    Environment(#[from] EnvError),

    #[error("environment produced state {state} outside of 0..{num_states}")]
    StateOutOfRange { state: usize, num_states: usize },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to draw chart: {message}")]
    Plot { message: String },

    #[error("progress bar error: {message}")]
    Progress { message: String },
}

impl Error {
    /// True for errors raised while validating parameters, before any
    /// environment interaction.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::InvalidConfiguration { .. } | Error::EmptySpace { .. }
        )
    }

    pub(crate) fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            operation: operation.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
