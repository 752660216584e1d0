//! Fact loading and classification errors.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors reading analyzer output.
#[derive(Debug, Error)]
pub enum FactError {
    /// Analyzer output could not be read.
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Analyzer output is not a valid facts document.
    #[error("Invalid facts document {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A facts directory contained no `*.facts.json` documents.
    #[error("No facts documents found under {}", .0.display())]
    NoFacts(PathBuf),

    /// Walking a facts directory failed.
    #[error("Failed to walk {}: {message}", path.display())]
    Walk { path: PathBuf, message: String },
}

impl FactError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FactError::Io {
            path: path.into(),
            source,
        }
    }
}

/// A single fact that was dropped during normalization. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassificationError {
    #[error("Unknown element kind '{kind}' for {name}")]
    UnknownKind { kind: String, name: String },

    #[error("Duplicate package path: {0}")]
    DuplicatePackage(String),

    #[error("Duplicate file path: {0}")]
    DuplicateFile(String),

    #[error("Package {package} references unknown file scope {scope}")]
    UnknownScope { package: String, scope: String },
}
