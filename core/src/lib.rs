#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Tools for creating blockwise joint site frequency spectra.
//!
//! This serves as the core library implementation for the `bsfs` CLI, but can also be used as a
//! free-standing library.
//!
//! # Overview
//!
//! Sequence data is read as [`Block`]s of aligned rows, one row per sampled haplotype. Under
//! every choice of subsamples from each population, every column of a block is classified, and
//! the bi-allelic columns are tallied by their branch class. The tally of a block under one
//! choice is a [`Config`], and the [`Aggregator`] counts configurations across choices and
//! blocks to obtain the frequency table of a dataset.
//!
//! All options are collected in immutable [`Settings`], which are shared between workers.
//!
//! # Example
//!
//! ```
//! use std::num::NonZeroUsize;
//!
//! use bsfs_core::{block::AlleleType, Aggregator, Block, Config, SampleSpec, Settings};
//!
//! // One population of four haplotypes, subsampled to pairs
//! let spec = SampleSpec::new(vec![4], Some(vec![2]), 1)?;
//! let settings = Settings::builder()
//!     .set_allele_type(AlleleType::Binary)
//!     .build(spec)?;
//!
//! // Only the first column is segregating, with a single derived allele
//! let blocks = vec![Block::try_from(["001", "101", "001", "001"])?];
//!
//! let aggregator = Aggregator::new(&settings, NonZeroUsize::MIN)?;
//! let frequencies = aggregator.frequencies(&blocks)?;
//!
//! // Half of the six pairs include the derived allele
//! assert_eq!(frequencies.get(&Config::from([1])), Some(0.5));
//! assert_eq!(frequencies.get(&Config::from([0])), Some(0.5));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#[cfg(test)]
#[macro_use]
pub(crate) mod approx;

pub mod aggregate;
pub use aggregate::Aggregator;

pub mod block;
pub use block::Block;

pub mod branch;

pub mod classify;

pub mod combination;

pub mod config;
pub use config::Config;

pub mod counter;

pub mod input;
pub use input::Input;

pub mod sample;
pub use sample::SampleSpec;

pub mod settings;
pub use settings::Settings;

pub mod table;
pub use table::{Counts, Datasets, Frequencies};
