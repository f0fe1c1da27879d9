//! Errors raised at the JSON interchange boundary.
//!
//! The geometry core itself never fails; degenerate input yields empty
//! or `None` results instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid visibility params JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid observer: {0}")]
    InvalidObserver(String),

    #[error("invalid obstacle {index}: {reason}")]
    InvalidShape { index: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
