//! Binomial coefficients and k-subset enumeration.
//!
//! Subsets are produced by combinadic unranking: every rank in `0..binomial(n, k)` is mapped
//! directly to its subset, without walking through an index space of size `n^k`.

use std::fmt;

/// Returns the binomial coefficient, i.e. the number of `k`-subsets of an `n`-set.
///
/// # Errors
///
/// If `k > n`, or if the coefficient does not fit in a `u64`.
pub fn binomial(n: usize, k: usize) -> Result<u64, Error> {
    if k > n {
        return Err(Error::InvalidBinomial { n, k });
    }

    let k = k.min(n - k);

    // After step i the accumulator holds binomial(n - k + i, i), which is always integral
    (1..=k as u64).try_fold(1u64, |acc, i| {
        let numerator = (n - k) as u128 + i as u128;
        let next = acc as u128 * numerator / i as u128;
        u64::try_from(next).map_err(|_| Error::Overflow { n, k })
    })
}

/// Returns every `k`-subset of `{0, .., n - 1}`, each as an increasing vector of indices.
///
/// If `group` is greater than one, indices are chosen in units of `group` consecutive indices:
/// `n` and `k` must then both be multiples of `group`, and `binomial(n / group, k / group)`
/// subsets are returned, each the union of `k / group` whole units. This is used to subsample
/// whole individuals rather than separate haplotypes.
///
/// Callers should not rely on the order of the subsets.
///
/// # Errors
///
/// If `group` is zero, if `n` or `k` are not multiples of `group`, if `k > n`, or if the
/// subsets cannot be allocated.
pub fn combinations(n: usize, k: usize, group: usize) -> Result<Vec<Vec<usize>>, Error> {
    if group == 0 {
        return Err(Error::ZeroGroup);
    }
    if n % group != 0 || k % group != 0 {
        return Err(Error::PloidyMismatch { n, k, group });
    }

    let (units, chosen) = (n / group, k / group);
    let total = binomial(units, chosen)?;

    if chosen == 0 {
        return Ok(vec![Vec::new()]);
    }

    let mut subsets = Vec::new();
    usize::try_from(total)
        .ok()
        .and_then(|total| subsets.try_reserve_exact(total).ok())
        .ok_or(Error::TooManySubsets { n, k })?;

    let mut subset = Vec::with_capacity(chosen);

    for rank in 0..total {
        unrank(rank, total, units, chosen, &mut subset);

        subsets.push(
            subset
                .iter()
                .flat_map(|&unit| unit * group..unit * group + group)
                .collect(),
        );
    }

    Ok(subsets)
}

/// Writes the subset with the provided rank into `subset`.
///
/// `total` must be `binomial(n, k)` and `k` must be non-zero.
fn unrank(rank: u64, total: u64, n: usize, k: usize, subset: &mut Vec<usize>) {
    subset.clear();

    let (mut rank, mut remaining, mut left) = (rank as u128, k as u128, n as u128);

    // Number of subsets of the remaining elements that contain the current element
    let mut with_current = total as u128 * remaining / left;

    for element in 0..n {
        if rank < with_current {
            subset.push(element);
            remaining -= 1;
            if remaining == 0 {
                break;
            }
            with_current = with_current * remaining / (left - 1);
        } else {
            rank -= with_current;
            with_current = with_current * (left - remaining) / (left - 1);
        }
        left -= 1;
    }
}

/// An error associated with binomial coefficients or subset enumeration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// Binomial coefficient requested with `k > n`.
    InvalidBinomial {
        /// Set size.
        n: usize,
        /// Subset size.
        k: usize,
    },
    /// Binomial coefficient does not fit in 64 bits.
    Overflow {
        /// Set size.
        n: usize,
        /// Subset size.
        k: usize,
    },
    /// The number of subsets is too large to hold in memory.
    TooManySubsets {
        /// Set size.
        n: usize,
        /// Subset size.
        k: usize,
    },
    /// Set or subset size is not a multiple of the group size.
    PloidyMismatch {
        /// Set size.
        n: usize,
        /// Subset size.
        k: usize,
        /// Group size.
        group: usize,
    },
    /// Group size is zero.
    ZeroGroup,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidBinomial { n, k } => {
                write!(f, "binomial coefficient requires n >= k (found n={n}, k={k})")
            }
            Error::Overflow { n, k } => {
                write!(f, "binomial coefficient for n={n}, k={k} overflows")
            }
            Error::TooManySubsets { n, k } => {
                write!(f, "too many subsets of size {k} from {n} samples")
            }
            Error::PloidyMismatch { n, k, group } => write!(
                f,
                "sample size {n} and subsample size {k} must both be multiples of the ploidy {group}"
            ),
            Error::ZeroGroup => f.write_str("group size must be positive"),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;

    #[test]
    fn test_binomial() {
        assert_eq!(binomial(5, 2), Ok(10));
        assert_eq!(binomial(10, 3), Ok(120));
        assert_eq!(binomial(52, 5), Ok(2_598_960));
        assert_eq!(binomial(0, 0), Ok(1));
    }

    #[test]
    fn test_binomial_edges_and_symmetry() {
        for n in 0..30 {
            assert_eq!(binomial(n, 0), Ok(1));
            assert_eq!(binomial(n, n), Ok(1));

            for k in 0..=n {
                assert_eq!(binomial(n, k), binomial(n, n - k));
            }
        }
    }

    #[test]
    fn test_binomial_k_greater_than_n() {
        assert_eq!(binomial(2, 3), Err(Error::InvalidBinomial { n: 2, k: 3 }));
    }

    #[test]
    fn test_binomial_overflow() {
        assert!(matches!(binomial(200, 100), Err(Error::Overflow { .. })));
    }

    fn assert_all_subsets(n: usize, k: usize) {
        let subsets = combinations(n, k, 1).unwrap();

        assert_eq!(subsets.len() as u64, binomial(n, k).unwrap());
        assert!(subsets.iter().all(|s| s.len() == k));
        assert!(subsets.iter().all(|s| s.windows(2).all(|w| w[0] < w[1])));
        assert!(subsets.iter().flatten().all(|&i| i < n));

        let distinct = subsets.iter().collect::<HashSet<_>>();
        assert_eq!(distinct.len(), subsets.len());
    }

    #[test]
    fn test_combinations_complete_and_unique() {
        for n in 0..9 {
            for k in 0..=n {
                assert_all_subsets(n, k);
            }
        }
    }

    #[test]
    fn test_combinations_4_choose_2() {
        let mut subsets = combinations(4, 2, 1).unwrap();
        subsets.sort();

        assert_eq!(
            subsets,
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3],
            ]
        );
    }

    #[test]
    fn test_combinations_choose_none() {
        assert_eq!(combinations(3, 0, 1).unwrap(), vec![Vec::<usize>::new()]);
    }

    #[test]
    fn test_combinations_grouped() {
        let subsets = combinations(6, 4, 2).unwrap();

        assert_eq!(subsets.len(), 3);
        for subset in subsets.iter() {
            assert_eq!(subset.len(), 4);
            for unit in subset.chunks(2) {
                assert_eq!(unit[0] % 2, 0);
                assert_eq!(unit[1], unit[0] + 1);
            }
        }

        let mut subsets = subsets;
        subsets.sort();
        assert_eq!(
            subsets,
            vec![vec![0, 1, 2, 3], vec![0, 1, 4, 5], vec![2, 3, 4, 5]]
        );
    }

    #[test]
    fn test_combinations_grouped_full() {
        assert_eq!(combinations(4, 4, 2).unwrap(), vec![vec![0, 1, 2, 3]]);
    }

    #[test]
    fn test_combinations_ploidy_mismatch() {
        assert_eq!(
            combinations(5, 2, 2),
            Err(Error::PloidyMismatch { n: 5, k: 2, group: 2 })
        );
        assert_eq!(
            combinations(6, 3, 2),
            Err(Error::PloidyMismatch { n: 6, k: 3, group: 2 })
        );
    }

    #[test]
    fn test_combinations_zero_group() {
        assert_eq!(combinations(4, 2, 0), Err(Error::ZeroGroup));
    }

    #[test]
    fn test_combinations_k_greater_than_n() {
        assert_eq!(combinations(2, 3, 1), Err(Error::InvalidBinomial { n: 2, k: 3 }));
    }

    #[test]
    fn test_combinations_too_many_subsets() {
        assert!(binomial(64, 32).is_ok());
        assert_eq!(
            combinations(64, 32, 1),
            Err(Error::TooManySubsets { n: 64, k: 32 })
        );
    }
}
