use thiserror::Error;
use tscat_core::ParseError;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("invalid locale: {0}")]
    InvalidLocale(String),
    #[error("invalid hash format")]
    InvalidHash,
    #[error("catalog hash mismatch: {0}")]
    HashMismatch(String),
    #[error("catalog loader panicked: {0}")]
    LoaderPanicked(String),
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;
