//! Utilities for reading configuration tables.

use std::io;

use crate::{
    input::Input,
    table::{Datasets, Frequencies},
};

use super::{text, Error};

/// A builder to read configuration tables.
#[derive(Debug, Default)]
pub struct Builder {
    kmax: Option<usize>,
}

impl Builder {
    /// Read a single table from reader.
    pub fn read<R>(&self, reader: &mut R) -> Result<Frequencies, Error>
    where
        R: io::BufRead,
    {
        text::read_frequencies(reader)
    }

    /// Read a single table from input.
    pub fn read_from_input(&self, input: &Input) -> Result<Frequencies, Error> {
        let mut reader = input.open()?;
        let frequencies = self.read(&mut reader)?;

        log::debug!("Read {} configurations from {input}", frequencies.len());

        Ok(frequencies)
    }

    /// Read one table per input, in order, into a collection of datasets.
    ///
    /// The maximum mutation class is taken from the builder if set, and otherwise derived from
    /// the tables.
    pub fn read_datasets(self, inputs: &[Input]) -> Result<Datasets, Error> {
        let tables = inputs
            .iter()
            .map(|input| self.read_from_input(input))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Datasets::new(tables, self.kmax))
    }

    /// Set the maximum mutation class.
    ///
    /// If unset or zero, the class will be derived from the data when reading datasets.
    pub fn set_kmax(mut self, kmax: Option<usize>) -> Self {
        self.kmax = kmax;
        self
    }
}
