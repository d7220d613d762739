//! Error types returned while parsing descriptors and opening handles

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The descriptor is empty, or a prefix is not followed by a path or command
    #[error("invalid descriptor: {0:?}")]
    InvalidDescriptor(String),
    /// The command text could not be split into arguments
    #[error("invalid command: {0:?}")]
    InvalidCommand(String),
    /// A file could not be opened
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A child process could not be spawned
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    /// Errors while flushing or waiting on a handle
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = ::std::result::Result<T, E>;
