//! Error types for configuration operations.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::validation::ValidationError;

fn describe(path: Option<&Path>) -> String {
    path.map(|p| format!(" in '{}'", p.display()))
        .unwrap_or_default()
}

/// Everything that can go wrong loading, saving or checking a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read configuration '{}': {source}", path.display())]
    Read {
        /// File that was opened.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file could not be written.
    #[error("cannot write configuration '{}': {source}", path.display())]
    Write {
        /// File that was written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A parent directory for the configuration could not be created.
    #[error("cannot create directory '{}': {source}", path.display())]
    CreateDir {
        /// Directory that was created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid TOML or does not match the schema.
    #[error("invalid configuration{}: {source}", describe(path.as_deref()))]
    Parse {
        /// File the document came from, if any.
        path: Option<PathBuf>,
        /// Deserializer error with line and column.
        #[source]
        source: toml::de::Error,
    },

    /// The configuration could not be rendered as TOML.
    #[error("cannot serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Values parsed but are out of range.
    #[error("configuration rejected: {0}")]
    Validation(#[from] ValidationError),
}

impl ConfigError {
    pub(crate) fn read(path: &Path, source: std::io::Error) -> Self {
        Self::Read {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn write(path: &Path, source: std::io::Error) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn create_dir(path: &Path, source: std::io::Error) -> Self {
        Self::CreateDir {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn parse(path: Option<&Path>, source: toml::de::Error) -> Self {
        Self::Parse {
            path: path.map(Path::to_path_buf),
            source,
        }
    }

    /// File the error concerns, when there is one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Read { path, .. } | Self::Write { path, .. } | Self::CreateDir { path, .. } => {
                Some(path)
            }
            Self::Parse { path, .. } => path.as_deref(),
            Self::Serialize(_) | Self::Validation(_) => None,
        }
    }
}
