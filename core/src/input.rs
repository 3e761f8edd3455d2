//! Input for creating spectra.

use std::{
    env,
    fs::File,
    io::{self, BufRead, IsTerminal as _},
    path::PathBuf,
};

use flate2::bufread::MultiGzDecoder;

/// A status when trying to read an element from a reader.
#[derive(Debug)]
pub enum ReadStatus<T, E = io::Error> {
    /// Element was succesfully read.
    Read(T),
    /// An error was encountered.
    Error(E),
    /// The reader has finished.
    Done,
}

impl<T, E> ReadStatus<T, E> {
    /// Converts the status into an optional result, with `None` when done.
    pub fn into_option(self) -> Option<Result<T, E>> {
        match self {
            ReadStatus::Read(t) => Some(Ok(t)),
            ReadStatus::Error(e) => Some(Err(e)),
            ReadStatus::Done => None,
        }
    }
}

/// An input source for reading.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Input {
    /// A path from which to read a file.
    Path(PathBuf),
    /// Stdin.
    Stdin,
}

impl Input {
    /// By default, reading an `Input` checks that either a path is provided, or that input is
    /// available via stdin, instead of hanging.
    ///
    /// In some contexts, e.g. testing, this can cause issues, and so it may be disabled by setting
    /// this environment variable, or by using [`Input::new_unchecked`].
    pub const ENV_KEY_DISABLE_CHECK: &'static str = "BSFS_ALLOW_STDIN";

    /// Creates a new input source.
    pub fn new(input: Option<PathBuf>) -> io::Result<Self> {
        let check = env::var(Self::ENV_KEY_DISABLE_CHECK).is_err();

        if input.is_some() && !io::stdin().is_terminal() && check {
            Err(io::Error::new(
                io::ErrorKind::Other,
                "received input both via file and stdin",
            ))
        } else if input.is_none() && io::stdin().is_terminal() && check {
            Err(io::Error::new(
                io::ErrorKind::Other,
                "received no input via file or stdin",
            ))
        } else {
            Ok(Self::new_unchecked(input))
        }
    }

    /// Creates inputs from a list of paths, using stdin as the single input if the list is empty.
    pub fn from_paths(paths: Vec<PathBuf>) -> io::Result<Vec<Self>> {
        if paths.is_empty() {
            Self::new(None).map(|input| vec![input])
        } else {
            paths.into_iter().map(|path| Self::new(Some(path))).collect()
        }
    }

    /// Creates a new input source without checking that any data is available.
    pub fn new_unchecked(input: Option<PathBuf>) -> Self {
        if let Some(path) = input {
            Self::Path(path)
        } else {
            Self::Stdin
        }
    }

    /// Open the input for reading.
    ///
    /// Gzip-compressed input is detected and decompressed transparently.
    pub fn open(&self) -> io::Result<Box<dyn BufRead>> {
        let reader: Box<dyn BufRead> = match self {
            Input::Path(path) => Box::new(io::BufReader::new(File::open(path)?)),
            Input::Stdin => Box::new(io::stdin().lock()),
        };

        decompress(reader)
    }
}

fn decompress<'a>(mut reader: Box<dyn BufRead + 'a>) -> io::Result<Box<dyn BufRead + 'a>> {
    const GZIP_MAGIC_NUMBER: [u8; 2] = [0x1f, 0x8b];

    let src = reader.fill_buf()?;

    if src.get(..GZIP_MAGIC_NUMBER.len()) == Some(&GZIP_MAGIC_NUMBER[..]) {
        log::debug!("Detected gzip compressed input");

        Ok(Box::new(io::BufReader::new(MultiGzDecoder::new(reader))))
    } else {
        Ok(reader)
    }
}

impl std::fmt::Display for Input {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Input::Path(path) => write!(f, "'{}'", path.display()),
            Input::Stdin => f.write_str("stdin"),
        }
    }
}
