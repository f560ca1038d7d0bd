//! Error handling and custom error types
//!
//! Every failure the relay can report falls into one of a small, closed set of
//! kinds. Handlers convert an [`Error`] into a JSON envelope based on
//! [`Error::kind`].

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Decode(String),

    #[error("Image decoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("{0}")]
    AiProvider(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Machine-distinguishable failure category reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Decode,
    Upstream,
    Internal,
}

impl ErrorKind {
    pub fn is_client_error(self) -> bool {
        matches!(self, ErrorKind::Validation | ErrorKind::Decode)
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::Decode(_) | Error::Image(_) => ErrorKind::Decode,
            Error::AiProvider(_) | Error::Http(_) | Error::Serialization(_) => {
                ErrorKind::Upstream
            }
            Error::Config(_) | Error::Io(_) => ErrorKind::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
