//! Configuration tables.
//!
//! A table maps each observed [`Config`] to the number of times it was emitted ([`Counts`]), or
//! to its frequency ([`Frequencies`]). Tables of several datasets analysed jointly are collected
//! in [`Datasets`].

use std::collections::{btree_map, BTreeMap};

use crate::config::Config;

pub mod io;

/// Configuration emission counts.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Counts(BTreeMap<Config, u64>);

impl Counts {
    /// Adds a single emission of a configuration.
    pub fn add(&mut self, config: Config) {
        *self.0.entry(config).or_insert(0) += 1;
    }

    /// Returns the emission count of a configuration, or zero if never emitted.
    pub fn get(&self, config: &Config) -> u64 {
        self.0.get(config).copied().unwrap_or(0)
    }

    /// Returns an iterator over configurations and counts in configuration order.
    pub fn iter(&self) -> btree_map::Iter<'_, Config, u64> {
        self.0.iter()
    }

    /// Returns `true` if no configurations have been emitted.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of distinct configurations.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Merges two tables by summing counts.
    ///
    /// Merging is associative and commutative.
    pub fn merge(self, other: Self) -> Self {
        let (mut larger, smaller) = if self.len() >= other.len() {
            (self, other)
        } else {
            (other, self)
        };

        for (config, count) in smaller.0 {
            *larger.0.entry(config).or_insert(0) += count;
        }

        larger
    }

    /// Returns the sum of all counts.
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    /// Converts counts to frequencies by dividing by the number of blocks times the subsampling
    /// multiplicity, i.e. the expected total of the counts.
    pub fn into_frequencies(self, blocks: usize, multiplicity: u64) -> Frequencies {
        let denominator = blocks as f64 * multiplicity as f64;

        Frequencies(
            self.0
                .into_iter()
                .map(|(config, count)| (config, count as f64 / denominator))
                .collect(),
        )
    }
}

impl FromIterator<Config> for Counts {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Config>,
    {
        let mut counts = Self::default();
        iter.into_iter().for_each(|config| counts.add(config));
        counts
    }
}

/// Configuration frequencies.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frequencies(BTreeMap<Config, f64>);

impl Frequencies {
    /// Returns the frequency of a configuration, if present.
    pub fn get(&self, config: &Config) -> Option<f64> {
        self.0.get(config).copied()
    }

    /// Inserts a configuration frequency, returning the previous frequency if present.
    pub fn insert(&mut self, config: Config, frequency: f64) -> Option<f64> {
        self.0.insert(config, frequency)
    }

    /// Returns `true` if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over configurations and frequencies in configuration order.
    pub fn iter(&self) -> btree_map::Iter<'_, Config, f64> {
        self.0.iter()
    }

    /// Returns the number of configurations.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `Σ f ln f` over all configurations.
    ///
    /// Configurations with zero frequency contribute zero.
    pub fn log_likelihood(&self) -> f64 {
        self.0
            .values()
            .filter(|&&f| f > 0.0)
            .map(|&f| f * f.ln())
            .sum()
    }

    /// Returns the largest entry of any configuration, or zero if empty.
    pub fn max_class(&self) -> usize {
        self.0.keys().map(Config::max_entry).max().unwrap_or(0)
    }

    /// Returns the sum of all frequencies.
    pub fn sum(&self) -> f64 {
        self.0.values().sum()
    }
}

impl FromIterator<(Config, f64)> for Frequencies {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (Config, f64)>,
    {
        Self(BTreeMap::from_iter(iter))
    }
}

impl<'a> IntoIterator for &'a Frequencies {
    type Item = (&'a Config, &'a f64);
    type IntoIter = btree_map::Iter<'a, Config, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Frequency tables of one or more datasets, with their maximum mutation class.
#[derive(Clone, Debug, PartialEq)]
pub struct Datasets {
    tables: Vec<Frequencies>,
    kmax: usize,
}

impl Datasets {
    /// Creates a new collection of datasets.
    ///
    /// If `kmax` is `None` or zero, it is derived as the largest configuration entry observed
    /// across all datasets.
    pub fn new(tables: Vec<Frequencies>, kmax: Option<usize>) -> Self {
        let kmax = match kmax {
            Some(kmax) if kmax > 0 => kmax,
            _ => tables.iter().map(Frequencies::max_class).max().unwrap_or(0),
        };

        Self { tables, kmax }
    }

    /// Returns the table of a dataset.
    pub fn get(&self, dataset: usize) -> Option<&Frequencies> {
        self.tables.get(dataset)
    }

    /// Returns the tables in dataset order.
    pub fn tables(&self) -> &[Frequencies] {
        &self.tables
    }

    /// Returns the maximum mutation class.
    pub fn kmax(&self) -> usize {
        self.kmax
    }

    /// Returns the number of datasets.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns `true` if there are no datasets.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Returns the log-likelihood of the data under its own frequencies, summed over datasets.
    ///
    /// This is the best attainable composite log-likelihood and serves as a baseline.
    pub fn log_likelihood(&self) -> f64 {
        self.tables.iter().map(Frequencies::log_likelihood).sum()
    }
}
