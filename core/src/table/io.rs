//! Reading and writing of configuration tables.

use std::{fmt, io};

use crate::config::Config;

pub mod read;

pub mod text;

pub mod write;

/// An error associated with reading configuration tables.
#[derive(Debug)]
pub enum Error {
    /// I/O error.
    Io(io::Error),
    /// A configuration occurs more than once.
    DuplicateConfig {
        /// Line number, starting at one.
        line: usize,
        /// The duplicated configuration.
        config: Config,
    },
    /// A configuration differs in length from the first configuration.
    InconsistentLength {
        /// Line number, starting at one.
        line: usize,
        /// Length of the first configuration.
        expected: usize,
        /// Length of the configuration.
        found: usize,
    },
    /// A line could not be parsed.
    Parse {
        /// Line number, starting at one.
        line: usize,
        /// The line content.
        content: String,
    },
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "{e}"),
            Error::DuplicateConfig { line, config } => {
                write!(f, "duplicate configuration {config} on line {line}")
            }
            Error::InconsistentLength {
                line,
                expected,
                found,
            } => write!(
                f,
                "configuration on line {line} has {found} classes, expected {expected}"
            ),
            Error::Parse { line, content } => write!(
                f,
                "failed to parse '{content}' on line {line} as '(config): value'"
            ),
        }
    }
}

impl std::error::Error for Error {}
