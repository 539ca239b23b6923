use std::fmt;

use epinet_core::NetworkError;
use thiserror::Error;

/// Errors raised while reading or writing edge lists.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EdgeListError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line} is malformed: `{content}`")]
    MalformedLine { line: usize, content: String },
    #[error("node label `{label}` cannot be written with separator `{separator}`")]
    UnwritableLabel { label: String, separator: char },
    #[error("separator `{separator}` is not usable")]
    InvalidSeparator { separator: char },
    #[error("network rejected the edge list: {0}")]
    Network(#[from] NetworkError),
}

/// Stable machine-readable codes for [`EdgeListError`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum EdgeListErrorCode {
    Io,
    MalformedLine,
    UnwritableLabel,
    InvalidSeparator,
    Network,
}

impl EdgeListErrorCode {
    /// Return the stable machine-readable representation of this error code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Io => "EDGELIST_IO",
            Self::MalformedLine => "EDGELIST_MALFORMED_LINE",
            Self::UnwritableLabel => "EDGELIST_UNWRITABLE_LABEL",
            Self::InvalidSeparator => "EDGELIST_INVALID_SEPARATOR",
            Self::Network => "EDGELIST_NETWORK",
        }
    }
}

impl fmt::Display for EdgeListErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl EdgeListError {
    /// Retrieve the stable [`EdgeListErrorCode`] for this error.
    #[must_use]
    pub const fn code(&self) -> EdgeListErrorCode {
        match self {
            Self::Io(_) => EdgeListErrorCode::Io,
            Self::MalformedLine { .. } => EdgeListErrorCode::MalformedLine,
            Self::UnwritableLabel { .. } => EdgeListErrorCode::UnwritableLabel,
            Self::InvalidSeparator { .. } => EdgeListErrorCode::InvalidSeparator,
            Self::Network(_) => EdgeListErrorCode::Network,
        }
    }
}
