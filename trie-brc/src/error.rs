use std::path::{Path, PathBuf};

/// Errors returned while reading and aggregating a measurements file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Open or read failure on the input file.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    /// The bytes after `;` did not parse as a decimal number.
    #[error("invalid measurement value {text:?}")]
    InvalidValue { text: String },

    #[error("invalid configuration option '{option}': {message}")]
    InvalidConfig {
        option: &'static str,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn io(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Self::Io {
            source,
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn invalid_value(bytes: &[u8]) -> Self {
        Self::InvalidValue {
            text: String::from_utf8_lossy(bytes).into_owned(),
        }
    }

    pub fn invalid_config(option: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            option,
            message: message.into(),
        }
    }
}
