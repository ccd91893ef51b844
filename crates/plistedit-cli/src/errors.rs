use plistedit_core::PListError;
use thiserror::Error;

/// Errors reported by CLI commands.
#[derive(Error, Debug)]
pub enum CliError {
    /// Reading the input failed.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Input file, or `stdin`.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Writing the output failed.
    #[error("failed to write {path}: {source}")]
    Write {
        /// Output file.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The input is not a decodable property list.
    #[error("invalid property list: {0}")]
    Decode(#[from] PListError),
    /// The node path could not be parsed.
    #[error("invalid node path '{0}'")]
    InvalidPath(String),
    /// No node exists at the requested path.
    #[error("node not found at {0}")]
    NotFound(String),
}
