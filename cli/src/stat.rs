use std::path::PathBuf;

use anyhow::Error;

use clap::{Parser, ValueEnum};

use bsfs_core::{table::io::read, Datasets, Input};

mod runner;
use runner::Runner;

/// Calculate summary statistics from configuration tables.
#[derive(Debug, Parser)]
pub struct Stat {
    /// Input configuration tables, one per dataset.
    ///
    /// If no file is provided, a single table will be read from stdin.
    #[arg(value_name = "FILE")]
    pub inputs: Vec<PathBuf>,

    /// Delimiter between statistics.
    #[arg(short = 'd', long, default_value_t = ',', value_name = "CHAR")]
    pub delimiter: char,

    /// Include a header with the names of statistics.
    #[arg(short = 'H', long)]
    pub header: bool,

    /// Maximum mutation class.
    ///
    /// By default, the maximum class is derived as the largest class count of any configuration
    /// in any dataset.
    #[arg(long, default_value_t = 0, value_name = "INT")]
    pub kmax: usize,

    /// Precision to use when printing the log-likelihood.
    #[arg(short = 'p', long, default_value_t = 6, value_name = "INT")]
    pub precision: usize,

    /// Statistics to calculate.
    ///
    /// Use comma to separate statistics. Statistics are printed in the order given.
    #[arg(
        short = 's',
        long,
        value_enum,
        value_delimiter = ',',
        default_values_t = [Statistic::Kmax, Statistic::Configs, Statistic::LogLikelihood],
        value_name = "STAT,..."
    )]
    pub statistics: Vec<Statistic>,
}

#[derive(ValueEnum, Clone, Copy, Debug, Eq, PartialEq)]
pub enum Statistic {
    /// The maximum mutation class.
    Kmax,
    /// The number of distinct configurations, summed over datasets.
    Configs,
    /// The number of datasets.
    Datasets,
    /// The log-likelihood of the data under its own frequencies, summed over datasets.
    LogLikelihood,
}

impl Statistic {
    pub fn calculate(self, datasets: &Datasets, precision: usize) -> String {
        match self {
            Statistic::Kmax => datasets.kmax().to_string(),
            Statistic::Configs => datasets
                .tables()
                .iter()
                .map(|table| table.len())
                .sum::<usize>()
                .to_string(),
            Statistic::Datasets => datasets.len().to_string(),
            Statistic::LogLikelihood => format!("{:.precision$}", datasets.log_likelihood()),
        }
    }

    pub fn header_name(&self) -> &'static str {
        match self {
            Statistic::Kmax => "kmax",
            Statistic::Configs => "configs",
            Statistic::Datasets => "datasets",
            Statistic::LogLikelihood => "log_likelihood",
        }
    }
}

impl Stat {
    pub fn run(self) -> Result<(), Error> {
        let inputs = Input::from_paths(self.inputs)?;

        let datasets = read::Builder::default()
            .set_kmax(Some(self.kmax))
            .read_datasets(&inputs)?;

        let mut runner = Runner::new(
            std::io::stdout().lock(),
            datasets,
            self.statistics,
            self.precision,
            self.header,
            self.delimiter,
        );
        runner.run()
    }
}
