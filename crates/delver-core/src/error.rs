//! Generation errors.

use delver_logic::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    #[error("invalid configuration: {}", join(.0))]
    InvalidConfig(Vec<ConfigError>),
    #[error("a dungeon is already generated; clear it first")]
    AlreadyGenerated,
}

fn join(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
