use thiserror::Error;

/// Broad classification of a [`Error`], for callers that only need to know
/// which class of check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing, empty or malformed caller input.
    Argument,
    /// The buffer is not a readable 2fae container.
    Format,
    /// Authentication failed or a primitive reported an error.
    Crypto,
}

/// Error type of the container codec and its cipher providers.
///
/// Every variant carries a message keyed to the exact validation that
/// failed, so the text can be shown to users as-is.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Argument(String),

    #[error("{0}")]
    Format(String),

    #[error("{0}")]
    Crypto(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Argument(_) => ErrorKind::Argument,
            Error::Format(_) => ErrorKind::Format,
            Error::Crypto(_) => ErrorKind::Crypto,
        }
    }

    pub(crate) fn argument(msg: impl Into<String>) -> Self {
        Error::Argument(msg.into())
    }

    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Error::Format(msg.into())
    }

    pub(crate) fn crypto(msg: impl Into<String>) -> Self {
        Error::Crypto(msg.into())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
