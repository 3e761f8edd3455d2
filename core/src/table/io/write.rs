//! Utilities for writing configuration tables.

use std::{fs, io, path::Path};

use crate::table::Frequencies;

use super::text;

/// A builder to write a configuration table.
#[derive(Debug)]
pub struct Builder {
    precision: usize,
}

impl Builder {
    /// Set precision.
    ///
    /// If unset, a precision of six digits will be used.
    pub fn set_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Write table to writer.
    pub fn write<W>(&self, writer: &mut W, frequencies: &Frequencies) -> io::Result<()>
    where
        W: io::Write,
    {
        text::write_frequencies(writer, frequencies, self.precision)
    }

    /// Write table to stdout.
    pub fn write_to_stdout(&self, frequencies: &Frequencies) -> io::Result<()> {
        self.write(&mut io::stdout().lock(), frequencies)
    }

    /// Write table to path.
    ///
    /// If path already exists, it will be overwritten.
    pub fn write_to_path<P>(&self, path: P, frequencies: &Frequencies) -> io::Result<()>
    where
        P: AsRef<Path>,
    {
        let mut writer = io::BufWriter::new(fs::File::create(path)?);
        self.write(&mut writer, frequencies)?;
        io::Write::flush(&mut writer)
    }
}

impl Default for Builder {
    fn default() -> Self {
        Builder { precision: 6 }
    }
}
