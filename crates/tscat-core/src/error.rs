use alloc::string::String;
use core::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    InvalidInput(&'static str),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::InvalidInput(message) => write!(f, "invalid input: {message}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CoreError {}

/// Failure to turn a catalog document into a [`Catalog`](crate::Catalog).
///
/// Both variants carry the 1-based line and column where the problem was
/// detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Structural problem: bad markup, unbalanced tags, missing names or sources.
    Format {
        message: String,
        line: u32,
        column: u32,
    },
    /// The bytes are not valid text: bad UTF-8, unknown entity, bad character reference.
    Encoding {
        message: String,
        line: u32,
        column: u32,
    },
}

impl ParseError {
    pub fn format(message: impl Into<String>, line: u32, column: u32) -> Self {
        ParseError::Format {
            message: message.into(),
            line,
            column,
        }
    }

    pub fn encoding(message: impl Into<String>, line: u32, column: u32) -> Self {
        ParseError::Encoding {
            message: message.into(),
            line,
            column,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ParseError::Format { message, .. } | ParseError::Encoding { message, .. } => message,
        }
    }

    pub fn line(&self) -> u32 {
        match self {
            ParseError::Format { line, .. } | ParseError::Encoding { line, .. } => *line,
        }
    }

    pub fn column(&self) -> u32 {
        match self {
            ParseError::Format { column, .. } | ParseError::Encoding { column, .. } => *column,
        }
    }

    pub fn is_encoding(&self) -> bool {
        matches!(self, ParseError::Encoding { .. })
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Format {
                message,
                line,
                column,
            } => write!(f, "format error at {line}:{column}: {message}"),
            ParseError::Encoding {
                message,
                line,
                column,
            } => write!(f, "encoding error at {line}:{column}: {message}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseError {}
