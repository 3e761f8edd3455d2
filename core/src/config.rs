//! Mutation configurations.

use std::{
    fmt,
    ops::{Deref, Index},
};

use crate::branch::BranchClasses;

/// A mutation configuration.
///
/// This is the number of sites falling into each branch class in a block, after folding and
/// capping, and serves as the key of a configuration table.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Config(pub Vec<usize>);

impl Config {
    /// Creates a configuration from raw per-class site counts.
    ///
    /// When folding, class `i` is combined with its complement, and the result has
    /// [`BranchClasses::folded_len`] entries. A self-complementary class is not double counted.
    /// Otherwise, the raw counts are used as they are.
    ///
    /// # Panics
    ///
    /// If the number of raw counts does not match the number of classes.
    pub fn from_raw(raw: &[usize], classes: &BranchClasses, fold: bool) -> Self {
        assert_eq!(raw.len(), classes.len());

        if !fold {
            return Self(raw.to_vec());
        }

        Self(
            (0..classes.folded_len())
                .map(|class| {
                    let complement = classes.complement(class);

                    if class == complement {
                        (raw[class] + raw[complement]) / 2
                    } else {
                        raw[class] + raw[complement]
                    }
                })
                .collect(),
        )
    }

    /// Creates a configuration with all classes set to zero.
    pub fn from_zeros(len: usize) -> Self {
        Self(vec![0; len])
    }

    /// Caps all entries so that they fall in `{0, 1, .., kmax - 1}`.
    ///
    /// Entries greater than `kmax - 2` are set to `kmax - 1`. A `kmax` of zero disables capping.
    pub fn cap(&mut self, kmax: usize) {
        if kmax == 0 {
            return;
        }

        self.0
            .iter_mut()
            .filter(|x| **x + 2 > kmax)
            .for_each(|x| *x = kmax - 1);
    }

    /// Returns the largest entry, or zero if empty.
    pub fn max_entry(&self) -> usize {
        self.0.iter().copied().max().unwrap_or(0)
    }
}

impl AsRef<[usize]> for Config {
    fn as_ref(&self) -> &[usize] {
        self
    }
}

impl Deref for Config {
    type Target = [usize];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<usize>> for Config {
    fn from(vec: Vec<usize>) -> Self {
        Self(vec)
    }
}

impl<const N: usize> From<[usize; N]> for Config {
    fn from(array: [usize; N]) -> Self {
        Self(array.to_vec())
    }
}

impl Index<usize> for Config {
    type Output = usize;

    fn index(&self, index: usize) -> &Self::Output {
        self.0.index(index)
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, x) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{x}")?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unfolded_is_raw() {
        let classes = BranchClasses::new(vec![4]).unwrap();
        let config = Config::from_raw(&[1, 0, 4], &classes, false);

        assert_eq!(config, Config::from([1, 0, 4]));
    }

    #[test]
    fn test_fold_without_diagonal() {
        // Four haplotypes: classes are derived counts 1, 2, 3, with 2 self-complementary
        let classes = BranchClasses::new(vec![4]).unwrap();
        let config = Config::from_raw(&[1, 5, 2], &classes, true);

        assert_eq!(config, Config::from([3, 5]));
    }

    #[test]
    fn test_fold_self_complementary_not_double_counted() {
        let classes = BranchClasses::new(vec![2, 2]).unwrap();
        let raw = [1, 0, 2, 7, 0, 0, 3];
        let config = Config::from_raw(&raw, &classes, true);

        assert_eq!(config.len(), 4);
        assert_eq!(config[3], 7);
        assert_eq!(config, Config::from([4, 0, 2, 7]));
    }

    #[test]
    fn test_fold_even_number_of_classes() {
        let classes = BranchClasses::new(vec![5]).unwrap();
        let config = Config::from_raw(&[1, 2, 3, 4], &classes, true);

        assert_eq!(config, Config::from([5, 5]));
    }

    #[test]
    fn test_cap() {
        let mut config = Config::from([0, 1, 2, 3, 7]);
        config.cap(3);
        assert_eq!(config, Config::from([0, 1, 2, 2, 2]));

        let mut config = Config::from([0, 1, 2]);
        config.cap(1);
        assert_eq!(config, Config::from([0, 0, 0]));
    }

    #[test]
    fn test_cap_bounds_entries() {
        for kmax in 1..6 {
            let mut config = Config::from([0, 1, 2, 3, 4, 5, 6, 7, 8]);
            config.cap(kmax);
            assert!(config.iter().all(|&x| x < kmax));
        }
    }

    #[test]
    fn test_cap_zero_disabled() {
        let mut config = Config::from([0, 9, 2]);
        config.cap(0);
        assert_eq!(config, Config::from([0, 9, 2]));
    }

    #[test]
    fn test_max_entry() {
        assert_eq!(Config::from([0, 4, 2]).max_entry(), 4);
        assert_eq!(Config(Vec::new()).max_entry(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Config::from([0, 1, 12]).to_string(), "(0,1,12)");
        assert_eq!(Config::from([3]).to_string(), "(3)");
    }
}
