//! Errors surfaced by the generation pipeline.
//!
//! Missing optional metadata is never an error: extraction falls back to the
//! documented defaults. What remains is I/O, unparseable input, and the one
//! condition the generator cannot resolve on its own, two services deriving
//! the same identifier in the generated code.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
    #[error("invalid library manifest {}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error(
        "services `{first}` and `{second}` both generate the identifier `{identifier}`; rename one of them"
    )]
    InstanceCollision {
        identifier: String,
        first: String,
        second: String,
    },
    #[error("`{text}` is not a valid {what}")]
    InvalidTokens { what: &'static str, text: String },
}

impl GenerateError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, GenerateError>;
