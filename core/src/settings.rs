//! Immutable settings for creating spectra from sequence blocks.

use std::fmt;

use crate::{
    block::AlleleType,
    branch::{self, BranchClasses},
    classify::Tally,
    config::Config,
    sample::{self, SampleSpec, Subsamples},
};

/// Settings for turning sequence blocks into configurations.
///
/// All derived lookup tables are computed once on construction, and the settings are shared
/// read-only between workers.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Settings {
    spec: SampleSpec,
    subsamples: Subsamples,
    classes: BranchClasses,
    allele_type: AlleleType,
    fold: bool,
    kmax: Option<usize>,
}

impl Settings {
    /// Returns a builder with default options.
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Returns the allele type of the input blocks.
    pub fn allele_type(&self) -> AlleleType {
        self.allele_type
    }

    /// Returns the branch classes.
    pub fn classes(&self) -> &BranchClasses {
        &self.classes
    }

    /// Returns the configuration of a tally after folding and capping.
    ///
    /// A tally without bi-allelic sites gives the all-zero configuration.
    pub fn config(&self, tally: &Tally) -> Config {
        if tally.biallelic() == 0 {
            return Config::from_zeros(self.config_len());
        }

        let mut config = Config::from_raw(tally.classes(), &self.classes, self.fold);
        if let Some(kmax) = self.kmax {
            config.cap(kmax);
        }
        config
    }

    /// Returns the number of entries in a configuration.
    pub fn config_len(&self) -> usize {
        if self.fold {
            self.classes.folded_len()
        } else {
            self.classes.len()
        }
    }

    /// Returns the configured maximum mutation class, or `None` if it should be derived from data.
    pub fn kmax(&self) -> Option<usize> {
        self.kmax
    }

    /// Returns the sample specification.
    pub fn spec(&self) -> &SampleSpec {
        &self.spec
    }

    /// Returns the precomputed subsample choices.
    pub fn subsamples(&self) -> &Subsamples {
        &self.subsamples
    }
}

/// A builder for [`Settings`].
#[derive(Debug, Default)]
pub struct Builder {
    allele_type: AlleleType,
    fold: bool,
    kmax: Option<usize>,
}

impl Builder {
    /// Builds the settings for the provided sample specification.
    ///
    /// # Errors
    ///
    /// If subsamples cannot be enumerated, or if the subsample sizes give no branch classes.
    pub fn build(self, spec: SampleSpec) -> Result<Settings, Error> {
        let subsamples = Subsamples::new(&spec)?;
        let classes = BranchClasses::new(spec.effective_sizes().to_vec())?;

        Ok(Settings {
            spec,
            subsamples,
            classes,
            allele_type: self.allele_type,
            fold: self.fold,
            kmax: self.kmax,
        })
    }

    /// Sets the allele type.
    ///
    /// By default, nucleotides are expected.
    pub fn set_allele_type(mut self, allele_type: AlleleType) -> Self {
        self.allele_type = allele_type;
        self
    }

    /// Sets whether to fold configurations.
    ///
    /// By default, configurations are not folded.
    pub fn set_fold(mut self, fold: bool) -> Self {
        self.fold = fold;
        self
    }

    /// Sets the maximum mutation class.
    ///
    /// A value of `None` or zero means the class is derived from the data after processing.
    pub fn set_kmax(mut self, kmax: Option<usize>) -> Self {
        self.kmax = kmax.filter(|&kmax| kmax > 0);
        self
    }
}

/// An error associated with building settings.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// Invalid branch classes.
    Branch(branch::Error),
    /// Invalid sample specification.
    Sample(sample::Error),
}

impl From<branch::Error> for Error {
    fn from(e: branch::Error) -> Self {
        Self::Branch(e)
    }
}

impl From<sample::Error> for Error {
    fn from(e: sample::Error) -> Self {
        Self::Sample(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Branch(e) => write!(f, "{e}"),
            Error::Sample(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {}
