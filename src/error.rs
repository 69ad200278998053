use thiserror::Error;

/// User-input failures raised by the dashboard actions.
///
/// Missing or null data fields are never errors; they fall back to the
/// neutral values documented on each engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoutError {
    #[error("please select {0}")]
    MissingSelection(&'static str),
    #[error("player not found: {0}")]
    PlayerNotFound(String),
    #[error("count must be a positive integer (got {0})")]
    InvalidCount(usize),
}
