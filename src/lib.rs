pub mod config;
pub mod env;
pub mod error;
pub mod metrics;
pub mod policy;
pub mod q_table;
pub mod runner;
pub mod utils;

pub use config::{NextActionSource, SarsaConfig};
pub use error::{Error, Result};
pub use policy::{derive_row, PolicyTable};
pub use q_table::QTable;
pub use runner::{evaluate, sarsa, EpisodeRunner, EpisodeStats, TrainingReport};
