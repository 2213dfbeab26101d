//! Loader and launcher error types.

use std::io;
use std::path::PathBuf;

use crate::bootstrap::Stage;

/// Errors raised while locating or streaming an embedded payload.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The executable could not be opened for reading.
    #[error("cannot open {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },

    /// Seeking to the trailer or to the payload failed.
    #[error("cannot seek {}: {source}", path.display())]
    Seek { path: PathBuf, source: io::Error },

    /// Reading the trailer or a payload chunk failed.
    #[error("cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    /// The file is readable but was never composed with a payload.
    #[error("no Lua program found in {}", path.display())]
    NoPayload { path: PathBuf },

    /// The trailer points outside the region that precedes it.
    #[error(
        "corrupt payload trailer in {}: {length} bytes at offset {offset} exceed {limit}",
        path.display()
    )]
    OutOfRange {
        path: PathBuf,
        offset: u64,
        length: u64,
        limit: u64,
    },
}

/// Errors that end a launch. Every variant is fatal to the process.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    /// The platform could not tell us where the running executable lives.
    #[error("cannot locate this executable: {0}")]
    SelfPathUnresolved(#[source] io::Error),

    /// Locating or streaming the payload failed.
    #[error(transparent)]
    Payload(#[from] LoadError),

    /// The engine could not be created or its libraries failed to open.
    #[error("{0}")]
    EngineInit(String),

    /// The payload failed to compile.
    #[error("{0}")]
    EngineLoad(String),

    /// The payload raised an error while running.
    #[error("{0}")]
    EngineRuntime(String),

    /// A bootstrap step was called from a stage it does not start from.
    #[error("cannot {step} while launch is {stage}")]
    OutOfOrder { step: &'static str, stage: Stage },
}
