//! Errors that abort a generation run.
//!
//! Every variant is fatal: one malformed file fails the whole run and no
//! partial output is produced. Shapes that are merely uninteresting
//! (unannotated members, unknown supertypes, ...) are skipped by the readers
//! and never surface here.

use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Walk(#[from] walkdir::Error),

    #[error("tree-sitter init: {0}")]
    Language(String),

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("runner class `{0}` not found")]
    RunnerClassNotFound(String),

    #[error("method `{method}` not found in class `{class}`")]
    InitMethodNotFound { class: String, method: String },

    #[error("no class or interface declaration in {}", path.display())]
    NoDeclaration { path: PathBuf },

    #[error("binding `{binding}` registers `{field}`, which is not a reference-typed field")]
    UnknownEntryField { binding: String, field: String },

    #[error("sized array dimension `[{0}]` is not supported")]
    SizedArrayDimension(String),

    #[error("unsupported type syntax `{text}`{}", located(.path))]
    UnsupportedType { path: PathBuf, text: String },
}

impl Error {
    /// Attach a file path to a reader failure raised without one.
    pub(crate) fn at(self, path: impl Into<PathBuf>) -> Self {
        match self {
            Error::Parse { message, .. } => Error::Parse {
                path: path.into(),
                message,
            },
            Error::NoDeclaration { .. } => Error::NoDeclaration { path: path.into() },
            Error::UnsupportedType { text, .. } => Error::UnsupportedType {
                path: path.into(),
                text,
            },
            other => other,
        }
    }
}

/// ` in <path>`, or nothing before a path is known.
fn located(path: &Path) -> String {
    if path.as_os_str().is_empty() {
        String::new()
    } else {
        format!(" in {}", path.display())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
