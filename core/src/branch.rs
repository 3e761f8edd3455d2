//! Branch classes of the joint derived-allele-count spectrum.

use std::fmt;

/// The mapping between per-population derived allele counts and branch classes.
///
/// With per-population sizes `n₁, .., nₚ`, a count tuple `c` with `0 ≤ cᵢ ≤ nᵢ` is a cell of an
/// array of shape `(n₁ + 1, .., nₚ + 1)`. The all-zero and all-derived cells correspond to
/// monomorphic sites and have no class; every other cell has class equal to its row-major flat
/// index minus one. The complement of the class of `c` is the class of `n - c`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BranchClasses {
    sizes: Vec<usize>,
    strides: Vec<usize>,
    classes: usize,
}

impl BranchClasses {
    /// Creates the branch classes for the provided per-population haplotype counts.
    ///
    /// # Errors
    ///
    /// If no sizes are provided, if all sizes are zero, or if the number of classes overflows.
    pub fn new(sizes: Vec<usize>) -> Result<Self, Error> {
        if sizes.is_empty() {
            return Err(Error::Empty);
        }

        let cells = sizes
            .iter()
            .try_fold(1usize, |acc, &n| acc.checked_mul(n + 1))
            .ok_or(Error::Overflow)?;

        if cells < 3 {
            return Err(Error::Monomorphic);
        }

        let mut strides = vec![1; sizes.len()];
        for (i, n) in sizes.iter().enumerate().skip(1).rev() {
            strides.iter_mut().take(i).for_each(|stride| *stride *= n + 1);
        }

        Ok(Self {
            sizes,
            strides,
            classes: cells - 2,
        })
    }

    /// Returns the class of the provided derived allele counts.
    ///
    /// Returns `None` if the counts have the wrong dimensions, exceed the population sizes, or
    /// correspond to a monomorphic site.
    pub fn class(&self, counts: &[usize]) -> Option<usize> {
        if counts.len() != self.sizes.len()
            || counts.iter().zip(&self.sizes).any(|(&c, &n)| c > n)
        {
            return None;
        }

        let flat = counts
            .iter()
            .zip(&self.strides)
            .map(|(c, stride)| c * stride)
            .sum::<usize>();

        (1..=self.classes).contains(&flat).then(|| flat - 1)
    }

    /// Returns the derived allele counts of the provided class.
    pub fn counts(&self, class: usize) -> Option<Vec<usize>> {
        if class >= self.classes {
            return None;
        }

        let mut flat = class + 1;
        Some(
            self.strides
                .iter()
                .map(|stride| {
                    let count = flat / stride;
                    flat %= stride;
                    count
                })
                .collect(),
        )
    }

    /// Returns the class with the polarity of all alleles swapped.
    pub fn complement(&self, class: usize) -> usize {
        self.classes - 1 - class
    }

    /// Returns the number of classes.
    pub fn len(&self) -> usize {
        self.classes
    }

    /// Returns `true` if there are no classes, which is never the case for a valid instance.
    pub fn is_empty(&self) -> bool {
        self.classes == 0
    }

    /// Returns the number of classes after folding.
    pub fn folded_len(&self) -> usize {
        (self.classes + 1) / 2
    }

    /// Returns the per-population haplotype counts.
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }
}

/// An error associated with constructing branch classes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// No populations.
    Empty,
    /// Every site is necessarily monomorphic.
    Monomorphic,
    /// Too many classes.
    Overflow,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Empty => f.write_str("cannot create branch classes without populations"),
            Error::Monomorphic => {
                f.write_str("cannot create branch classes for zero haplotypes")
            }
            Error::Overflow => f.write_str("too many branch classes"),
        }
    }
}

impl std::error::Error for Error {}
