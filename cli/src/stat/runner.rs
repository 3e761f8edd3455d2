use std::{fmt, io};

use anyhow::Error;

use bsfs_core::Datasets;

use super::Statistic;

#[derive(Debug)]
pub struct Runner<W> {
    writer: W,
    datasets: Datasets,
    statistics: Vec<Statistic>,
    precision: usize,
    header: bool,
    delimiter: char,
}

impl<W> Runner<W>
where
    W: io::Write,
{
    pub fn new(
        writer: W,
        datasets: Datasets,
        statistics: Vec<Statistic>,
        precision: usize,
        header: bool,
        delimiter: char,
    ) -> Self {
        Self {
            writer,
            datasets,
            statistics,
            precision,
            header,
            delimiter,
        }
    }

    pub fn run(&mut self) -> Result<(), Error> {
        if self.header {
            self.write_header()?;
        }

        self.write_statistics()
    }

    fn write_header(&mut self) -> Result<(), Error> {
        let header_names = self
            .statistics
            .iter()
            .map(Statistic::header_name)
            .collect::<Vec<_>>();

        self.write_with_delimiter(header_names)
    }

    fn write_statistics(&mut self) -> Result<(), Error> {
        let statistics = self
            .statistics
            .iter()
            .map(|s| s.calculate(&self.datasets, self.precision))
            .collect::<Vec<_>>();

        self.write_with_delimiter(statistics)
    }

    fn write_with_delimiter<I>(&mut self, items: I) -> Result<(), Error>
    where
        I: IntoIterator,
        I::Item: fmt::Display,
    {
        for (i, x) in items.into_iter().enumerate() {
            if i > 0 {
                write!(self.writer, "{}", self.delimiter)?;
            }
            write!(self.writer, "{x}")?;
        }
        writeln!(self.writer)?;

        Ok(())
    }
}
