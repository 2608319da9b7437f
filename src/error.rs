//! Error types shared by the assembler and the flattener.

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A filesystem operation failed on `path`.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading or writing YAML failed.
    #[error("YAML error at {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The training executable could not be started.
    #[error("Failed to start trainer '{program}': {source}")]
    TrainerSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Trainer '{program}' exited with {status}")]
    TrainerFailed { program: String, status: ExitStatus },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
