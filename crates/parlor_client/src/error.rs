//! Client-side error types.

use derive_more::{Display, Error};
use parlor_server::ErrorCode;
use parlor_tictactoe::MoveError;

/// Why a client operation failed.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum ClientError {
    /// The server validated the request and refused it.
    #[display("{message}")]
    Rejected {
        /// Machine-readable code from the server.
        code: ErrorCode,
        /// Human-readable message from the server.
        message: String,
    },
    /// Network, HTTP or decoding failure.
    #[display("Transport failure: {reason}")]
    Transport {
        /// What failed.
        reason: String,
    },
    /// Refused locally before any request was sent.
    #[display("{error}")]
    Local {
        /// Rule the move broke on the last authoritative board.
        error: MoveError,
    },
}

impl ClientError {
    /// Builds a transport failure from anything displayable.
    pub fn transport(reason: impl std::fmt::Display) -> Self {
        Self::Transport {
            reason: reason.to_string(),
        }
    }

    /// Server code, if the server answered with one.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            ClientError::Rejected { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::transport(err)
    }
}

impl From<MoveError> for ClientError {
    fn from(error: MoveError) -> Self {
        Self::Local { error }
    }
}
