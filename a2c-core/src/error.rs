//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug)]
pub enum A2cError {
    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Action index out of the range of the action dimension.
    #[error("Action index {index} is out of range for {num_actions} actions")]
    ActionIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of action dimensions.
        num_actions: usize,
    },

    /// Width of an action vector differs from the number of actions.
    #[error("Action vector has {got} elements, expected {expected}")]
    ActionWidthMismatch {
        /// Width of the given vector.
        got: usize,
        /// Number of action dimensions.
        expected: usize,
    },

    /// Length of a state vector differs from the state dimension.
    #[error("State has {got} elements, expected {expected}")]
    StateDimMismatch {
        /// Length of the given state.
        got: usize,
        /// State dimension of the environment.
        expected: usize,
    },

    /// The agent's networks have been released.
    #[error("Agent has been disposed")]
    Disposed,
}
