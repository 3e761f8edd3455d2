//! Sample specification and subsampling.

use std::fmt;

use crate::{
    combination::{self, combinations},
    counter::MixedRadix,
};

/// The sampling scheme of a set of populations.
///
/// Sizes are given in haplotypes, i.e. rows in a sequence block. Populations occupy consecutive
/// rows in the order given, so the rows of population `i` start after the rows of all preceding
/// populations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SampleSpec {
    sizes: Vec<usize>,
    subsample_sizes: Option<Vec<usize>>,
    ploidy: usize,
}

impl SampleSpec {
    /// Creates a new sample specification.
    ///
    /// If subsample sizes are provided, spectra are averaged over every way of drawing the
    /// subsample from each population, in units of `ploidy` consecutive rows.
    ///
    /// # Errors
    ///
    /// If no populations are provided, if any population is empty, if the ploidy is zero, or if
    /// the subsample sizes do not match the populations.
    pub fn new(
        sizes: Vec<usize>,
        subsample_sizes: Option<Vec<usize>>,
        ploidy: usize,
    ) -> Result<Self, Error> {
        if sizes.is_empty() {
            return Err(Error::NoPopulations);
        }
        if ploidy == 0 {
            return Err(Error::ZeroPloidy);
        }
        if let Some(population) = sizes.iter().position(|&size| size == 0) {
            return Err(Error::EmptyPopulation { population });
        }

        if let Some(subsample_sizes) = &subsample_sizes {
            if subsample_sizes.len() != sizes.len() {
                return Err(Error::SubsampleCount {
                    expected: sizes.len(),
                    found: subsample_sizes.len(),
                });
            }

            for (population, (&size, &subsample_size)) in
                sizes.iter().zip(subsample_sizes).enumerate()
            {
                if subsample_size == 0 {
                    return Err(Error::EmptySubsample { population });
                } else if subsample_size > size {
                    return Err(Error::SubsampleTooLarge {
                        population,
                        size,
                        subsample_size,
                    });
                }
            }
        }

        Ok(Self {
            sizes,
            subsample_sizes,
            ploidy,
        })
    }

    /// Returns the number of populations.
    pub fn populations(&self) -> usize {
        self.sizes.len()
    }

    /// Returns the sampled size of each population.
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Returns the number of haplotypes considered for each population at a time.
    ///
    /// This is the subsample size if subsampling, and the sampled size otherwise.
    pub fn effective_sizes(&self) -> &[usize] {
        self.subsample_sizes.as_deref().unwrap_or(&self.sizes)
    }

    /// Returns the total number of rows required in a sequence block.
    pub fn rows(&self) -> usize {
        self.sizes.iter().sum()
    }
}

/// The precomputed subsample choices for each population.
///
/// This is computed once and shared read-only between workers.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Subsamples {
    choices: Vec<Vec<Vec<usize>>>,
    offsets: Vec<usize>,
    multiplicity: u64,
}

impl Subsamples {
    /// Computes every subsample choice of each population.
    ///
    /// Populations that are not subsampled have a single choice containing every row.
    ///
    /// # Errors
    ///
    /// If a sampled or subsampled size is not a multiple of the ploidy when subsampling, or if
    /// there are too many choices to hold in memory.
    pub fn new(spec: &SampleSpec) -> Result<Self, Error> {
        let choices = match &spec.subsample_sizes {
            Some(subsample_sizes) => spec
                .sizes
                .iter()
                .zip(subsample_sizes)
                .map(|(&n, &k)| combinations(n, k, spec.ploidy))
                .collect::<Result<Vec<_>, _>>()?,
            None => spec
                .sizes
                .iter()
                .map(|&n| combinations(n, n, 1))
                .collect::<Result<Vec<_>, _>>()?,
        };

        Self::from_choices(choices, spec)
    }

    /// Returns the single choice of every row of every population.
    pub fn full(spec: &SampleSpec) -> Self {
        let choices = spec
            .sizes
            .iter()
            .map(|&n| vec![(0..n).collect()])
            .collect();

        Self {
            choices,
            offsets: offsets(&spec.sizes),
            multiplicity: 1,
        }
    }

    fn from_choices(choices: Vec<Vec<Vec<usize>>>, spec: &SampleSpec) -> Result<Self, Error> {
        let multiplicity = choices
            .iter()
            .try_fold(1u64, |acc, population| acc.checked_mul(population.len() as u64))
            .ok_or(Error::TooManySubsamples)?;

        Ok(Self {
            choices,
            offsets: offsets(&spec.sizes),
            multiplicity,
        })
    }

    /// Returns a fresh counter over every combination of subsample choices across populations.
    ///
    /// Each yielded digit vector holds one choice index per population, see [`Self::select`].
    pub fn counter(&self) -> MixedRadix {
        MixedRadix::new(self.choices.iter().map(Vec::len).collect())
    }

    /// Returns the number of subsample choices of each population.
    pub fn counts(&self) -> Vec<usize> {
        self.choices.iter().map(Vec::len).collect()
    }

    /// Returns the total number of subsampling configurations, i.e. the product of the number
    /// of choices of each population.
    pub fn multiplicity(&self) -> u64 {
        self.multiplicity
    }

    /// Returns the number of populations.
    pub fn populations(&self) -> usize {
        self.choices.len()
    }

    /// Resolves one choice index per population into a selection of block rows.
    ///
    /// # Panics
    ///
    /// If `digits` does not contain exactly one valid choice index per population.
    pub fn select<'a>(&'a self, digits: &'a [usize]) -> Selection<'a> {
        assert_eq!(digits.len(), self.populations());

        Selection {
            subsamples: self,
            digits,
        }
    }
}

fn offsets(sizes: &[usize]) -> Vec<usize> {
    sizes
        .iter()
        .scan(0, |offset, &size| {
            let start = *offset;
            *offset += size;
            Some(start)
        })
        .collect()
}

/// One subsample choice for every population.
#[derive(Clone, Copy, Debug)]
pub struct Selection<'a> {
    subsamples: &'a Subsamples,
    digits: &'a [usize],
}

impl<'a> Selection<'a> {
    /// Returns the block rows selected for a population.
    pub fn rows(&self, population: usize) -> impl Iterator<Item = usize> + 'a {
        let offset = self.subsamples.offsets[population];

        self.subsamples.choices[population][self.digits[population]]
            .iter()
            .map(move |&index| offset + index)
    }

    /// Returns the number of populations.
    pub fn populations(&self) -> usize {
        self.digits.len()
    }
}

/// An error associated with a sample specification.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// Subsample enumeration failed.
    Combination(combination::Error),
    /// A population has no samples.
    EmptyPopulation {
        /// Population index.
        population: usize,
    },
    /// A population has a subsample size of zero.
    EmptySubsample {
        /// Population index.
        population: usize,
    },
    /// No populations were provided.
    NoPopulations,
    /// The number of subsample sizes does not match the number of populations.
    SubsampleCount {
        /// Number of populations.
        expected: usize,
        /// Number of subsample sizes.
        found: usize,
    },
    /// A subsample size is greater than the sample size.
    SubsampleTooLarge {
        /// Population index.
        population: usize,
        /// Sample size.
        size: usize,
        /// Subsample size.
        subsample_size: usize,
    },
    /// The number of subsampling configurations does not fit in 64 bits.
    TooManySubsamples,
    /// Ploidy is zero.
    ZeroPloidy,
}

impl From<combination::Error> for Error {
    fn from(e: combination::Error) -> Self {
        Self::Combination(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Combination(e) => write!(f, "{e}"),
            Error::EmptyPopulation { population } => {
                write!(f, "population {population} has sample size zero")
            }
            Error::EmptySubsample { population } => {
                write!(f, "population {population} has subsample size zero")
            }
            Error::NoPopulations => f.write_str("no populations provided"),
            Error::SubsampleCount { expected, found } => write!(
                f,
                "expected one subsample size for each of {expected} populations, found {found}"
            ),
            Error::SubsampleTooLarge {
                population,
                size,
                subsample_size,
            } => write!(
                f,
                "subsample size {subsample_size} exceeds sample size {size} \
                in population {population}"
            ),
            Error::TooManySubsamples => f.write_str("too many subsampling configurations"),
            Error::ZeroPloidy => f.write_str("ploidy must be positive"),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_validation() {
        assert_eq!(SampleSpec::new(vec![], None, 1), Err(Error::NoPopulations));
        assert_eq!(SampleSpec::new(vec![2], None, 0), Err(Error::ZeroPloidy));
        assert_eq!(
            SampleSpec::new(vec![2, 0], None, 1),
            Err(Error::EmptyPopulation { population: 1 })
        );
        assert_eq!(
            SampleSpec::new(vec![2, 4], Some(vec![2]), 1),
            Err(Error::SubsampleCount {
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            SampleSpec::new(vec![2, 4], Some(vec![2, 5]), 1),
            Err(Error::SubsampleTooLarge {
                population: 1,
                size: 4,
                subsample_size: 5
            })
        );
        assert_eq!(
            SampleSpec::new(vec![2, 4], Some(vec![0, 2]), 1),
            Err(Error::EmptySubsample { population: 0 })
        );
    }

    #[test]
    fn test_effective_sizes() {
        let spec = SampleSpec::new(vec![4, 6], None, 2).unwrap();
        assert_eq!(spec.effective_sizes(), &[4, 6]);
        assert_eq!(spec.rows(), 10);

        let spec = SampleSpec::new(vec![4, 6], Some(vec![2, 4]), 2).unwrap();
        assert_eq!(spec.effective_sizes(), &[2, 4]);
    }

    #[test]
    fn test_no_subsampling_has_multiplicity_one() {
        let spec = SampleSpec::new(vec![3, 2], None, 1).unwrap();
        let subsamples = Subsamples::new(&spec).unwrap();

        assert_eq!(subsamples.multiplicity(), 1);
        assert_eq!(subsamples.counter().count(), 1);
    }

    #[test]
    fn test_multiplicity() {
        let spec = SampleSpec::new(vec![4, 5], Some(vec![2, 3]), 1).unwrap();
        let subsamples = Subsamples::new(&spec).unwrap();

        assert_eq!(subsamples.counts(), vec![6, 10]);
        assert_eq!(subsamples.multiplicity(), 60);
        assert_eq!(subsamples.counter().count(), 60);
    }

    #[test]
    fn test_ploidy_mismatch() {
        let spec = SampleSpec::new(vec![4, 5], Some(vec![2, 2]), 2).unwrap();

        assert_eq!(
            Subsamples::new(&spec),
            Err(Error::Combination(combination::Error::PloidyMismatch {
                n: 5,
                k: 2,
                group: 2
            }))
        );
    }

    #[test]
    fn test_ploidy_ignored_without_subsampling() {
        let spec = SampleSpec::new(vec![3], None, 2).unwrap();
        assert!(Subsamples::new(&spec).is_ok());
    }

    #[test]
    fn test_select_rows_with_offsets() {
        let spec = SampleSpec::new(vec![2, 3], Some(vec![2, 1]), 1).unwrap();
        let subsamples = Subsamples::new(&spec).unwrap();

        let mut second = subsamples
            .counter()
            .map(|digits| subsamples.select(&digits).rows(1).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        second.sort();

        assert_eq!(second, vec![vec![2], vec![3], vec![4]]);

        let digits = vec![0, 0];
        assert_eq!(
            subsamples.select(&digits).rows(0).collect::<Vec<_>>(),
            vec![0, 1]
        );
    }

    #[test]
    fn test_full() {
        let spec = SampleSpec::new(vec![2, 3], Some(vec![1, 1]), 1).unwrap();
        let full = Subsamples::full(&spec);

        assert_eq!(full.multiplicity(), 1);
        let digits = vec![0, 0];
        let selection = full.select(&digits);
        assert_eq!(selection.rows(0).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(selection.rows(1).collect::<Vec<_>>(), vec![2, 3, 4]);
    }
}
