//! The public error type.
//!
//! Internally the crate works with `anyhow` results (`Res`) and adds context as it goes. At the
//! public boundary those results are tagged with an `ErrorType` using `IntoResult::pub_result` so
//! that callers can react to the kind of failure without parsing messages.

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// The crate-internal result type.
pub(crate) type Res<T> = anyhow::Result<T>;

/// The public result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Categorizes an `Error` by what went wrong.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// Input for a new transaction was rejected. Nothing was mutated.
    Validation,
    /// The stored ledger could not be parsed as a transaction sequence.
    CorruptState,
    /// The key-value store failed to read or write.
    Storage,
    /// The configuration file is missing, unreadable or invalid.
    Config,
    /// The logging subscriber could not be installed.
    Logging,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// An error with an `ErrorType` and the full `anyhow` context chain that produced it.
pub struct Error {
    error_type: ErrorType,
    source: anyhow::Error,
}

impl Error {
    pub(crate) fn new(error_type: ErrorType, source: impl Into<anyhow::Error>) -> Self {
        Self {
            error_type,
            source: source.into(),
        }
    }

    /// Creates a `Validation` error with `message`.
    pub(crate) fn validation(message: impl Display + Debug + Send + Sync + 'static) -> Self {
        Self::new(ErrorType::Validation, anyhow::Error::msg(message))
    }

    /// Creates a `CorruptState` error with `message`.
    pub(crate) fn corrupt(message: impl Display + Debug + Send + Sync + 'static) -> Self {
        Self::new(ErrorType::CorruptState, anyhow::Error::msg(message))
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    pub fn is_validation(&self) -> bool {
        self.error_type == ErrorType::Validation
    }

    pub fn is_corrupt_state(&self) -> bool {
        self.error_type == ErrorType::CorruptState
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:?}", self.error_type, self.source)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}", self.source)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.source)
    }
}

/// Converts internal results into public `Result`s tagged with an `ErrorType`.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| Error::new(error_type, e))
    }
}
