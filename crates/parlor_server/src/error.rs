//! Registry error types.

use derive_more::{Display, Error, From};
use parlor_tictactoe::MoveError;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// What went wrong in a registry or state-machine operation.
#[derive(Debug, Clone, PartialEq, Eq, Display, From)]
pub enum RegistryErrorKind {
    /// The room id is not in the fixed pool.
    #[display("Room not found: {_0}")]
    RoomNotFound(String),
    /// Both seats are taken by other players.
    #[display("Room {_0} is full")]
    RoomFull(String),
    /// A required request field was absent or empty.
    #[display("Missing field: {_0}")]
    MissingField(&'static str),
    /// The game state machine refused the move.
    #[display("{_0}")]
    #[from]
    Move(MoveError),
}

/// Registry error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Registry error: {} at {}:{}", kind, file, line)]
pub struct RegistryError {
    /// What went wrong.
    pub kind: RegistryErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl RegistryError {
    /// Creates a new registry error with caller location tracking.
    #[track_caller]
    #[instrument(skip(kind))]
    pub fn new(kind: impl Into<RegistryErrorKind>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind: kind.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Shorthand for [`RegistryErrorKind::RoomNotFound`].
    #[track_caller]
    pub fn room_not_found(room_id: &str) -> Self {
        Self::new(RegistryErrorKind::RoomNotFound(room_id.to_string()))
    }

    /// Shorthand for [`RegistryErrorKind::MissingField`].
    #[track_caller]
    pub fn missing_field(field: &'static str) -> Self {
        Self::new(RegistryErrorKind::MissingField(field))
    }

    /// Returns the machine-readable code for this error.
    pub fn code(&self) -> ErrorCode {
        match &self.kind {
            RegistryErrorKind::RoomNotFound(_) => ErrorCode::RoomNotFound,
            RegistryErrorKind::RoomFull(_) => ErrorCode::RoomFull,
            RegistryErrorKind::MissingField(_) => ErrorCode::MissingField,
            RegistryErrorKind::Move(MoveError::CellOutOfRange { .. }) => ErrorCode::CellOutOfRange,
            RegistryErrorKind::Move(MoveError::AlreadyTerminal) => ErrorCode::AlreadyTerminal,
            RegistryErrorKind::Move(MoveError::InvalidTurn) => ErrorCode::InvalidTurn,
            RegistryErrorKind::Move(MoveError::CellOccupied { .. }) => ErrorCode::CellOccupied,
        }
    }
}

impl From<MoveError> for RegistryError {
    #[track_caller]
    fn from(err: MoveError) -> Self {
        Self::new(err)
    }
}

/// Wire code carried next to every error message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
pub enum ErrorCode {
    /// Unknown room id.
    RoomNotFound,
    /// Both seats taken.
    RoomFull,
    /// Required field absent.
    MissingField,
    /// Not the caller's turn, or caller not seated.
    InvalidTurn,
    /// Target cell already holds a symbol.
    CellOccupied,
    /// Game already won or drawn.
    AlreadyTerminal,
    /// Cell index off the board.
    CellOutOfRange,
}

impl ErrorCode {
    /// Checks if the code means the resource does not exist.
    pub fn is_not_found(self) -> bool {
        matches!(self, ErrorCode::RoomNotFound)
    }
}
