//! Error type and integer status codes for the stream engine.

use thiserror::Error;

use crate::session::SessionState;

/// Integer status code returned to C-style callers.
pub type StatusCode = i32;

/// Operation succeeded.
pub const OK: StatusCode = 0;
/// Unspecified driver failure.
pub const ERROR: StatusCode = -1;
/// Operation not valid in the current session state.
pub const ERROR_STATE: StatusCode = -2;
/// `initialize` called on an initialized stream.
pub const ERROR_ALREADY_INITIALIZED: StatusCode = -3;
/// `release_block` called without a held block.
pub const ERROR_NO_BLOCK: StatusCode = -4;
/// Invalid argument or argument combination.
pub const ERROR_PARAMETER: StatusCode = -5;

/// Errors returned by stream operations.
///
/// Every variant is recoverable: the engine is left in a well-defined state
/// after any of them is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StreamError {
    /// Invalid size, block size or argument combination.
    #[error("invalid parameter: {0}")]
    Parameter(&'static str),

    /// The operation is not defined in the current session state.
    #[error("operation not valid in {0:?} state")]
    InvalidState(SessionState),

    /// `initialize` was called while the stream was already initialized.
    #[error("stream already initialized")]
    AlreadyInitialized,

    /// `release_block` was called without a block held.
    #[error("no block is currently held")]
    NoActiveBlock,

    /// Driver-internal failure.
    #[error("driver operation failed")]
    Operation,
}

impl StreamError {
    /// The integer status code for this error.
    pub const fn code(&self) -> StatusCode {
        match self {
            StreamError::Parameter(_) => ERROR_PARAMETER,
            StreamError::InvalidState(_) => ERROR_STATE,
            StreamError::AlreadyInitialized => ERROR_ALREADY_INITIALIZED,
            StreamError::NoActiveBlock => ERROR_NO_BLOCK,
            StreamError::Operation => ERROR,
        }
    }
}

/// Collapse an operation result into its integer status code.
pub fn status_code<T>(result: Result<T, StreamError>) -> StatusCode {
    match result {
        Ok(_) => OK,
        Err(e) => e.code(),
    }
}
