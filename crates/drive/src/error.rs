use std::{io, path::PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriveError {
    #[error("Service account file '{}' not found", .0.display())]
    MissingCredentials(PathBuf),

    #[error("Invalid service account credentials: {0}")]
    InvalidCredentials(String),

    #[error("Token exchange failed: {0}")]
    Token(String),

    #[error("Drive API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Cannot upload '{}': no usable file name", .0.display())]
    InvalidPath(PathBuf),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
