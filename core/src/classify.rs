//! Classification of sequence block columns.

use crate::{
    block::{AlleleType, Block},
    branch::BranchClasses,
    sample::Selection,
};

/// The classification of a single column under a subsample choice.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Site {
    /// At least one selected row has missing data.
    Masked,
    /// A single allele.
    Monomorphic,
    /// Two alleles, with the derived allele counts falling into the branch class.
    Biallelic(usize),
    /// Two alleles, none of which can be taken as derived.
    Unpolarized,
    /// More than two alleles.
    Multiallelic,
}

/// Classifies a column of a block under the selected rows.
///
/// # Panics
///
/// If the selection refers to rows outside the block, or the column is out of bounds.
pub fn classify(
    block: &Block,
    column: usize,
    selection: &Selection<'_>,
    allele_type: AlleleType,
    classes: &BranchClasses,
) -> Site {
    let mut alleles: [Option<u8>; 2] = [None, None];
    let mut multiallelic = false;

    for population in 0..selection.populations() {
        for row in selection.rows(population) {
            let allele = block.allele(row, column);

            if allele == AlleleType::MISSING {
                return Site::Masked;
            }

            match (alleles[0], alleles[1]) {
                (Some(a), _) if a == allele => (),
                (_, Some(b)) if b == allele => (),
                (None, _) => alleles[0] = Some(allele),
                (_, None) => alleles[1] = Some(allele),
                _ => multiallelic = true,
            }
        }
    }

    let (first, second) = match alleles {
        _ if multiallelic => return Site::Multiallelic,
        [Some(first), Some(second)] => (first, second),
        _ => return Site::Monomorphic,
    };

    let Some(derived) = allele_type.derived(first, second) else {
        return Site::Unpolarized;
    };

    let counts = (0..selection.populations())
        .map(|population| {
            selection
                .rows(population)
                .filter(|&row| block.allele(row, column) == derived)
                .count()
        })
        .collect::<Vec<_>>();

    classes
        .class(&counts)
        .map(Site::Biallelic)
        .unwrap_or(Site::Monomorphic)
}

/// Returns the number of segregating columns of a block under the selected rows.
///
/// A column is segregating if it has no missing data and more than one allele. Unlike
/// [`classify`], this does not depend on branch classes, and so may be used with selections
/// larger than the subsample sizes.
pub fn segregating_sites(block: &Block, selection: &Selection<'_>) -> usize {
    (0..block.columns())
        .filter(|&column| {
            let mut first = None;
            let mut segregating = false;

            let rows = (0..selection.populations()).flat_map(|p| selection.rows(p));

            for row in rows {
                let allele = block.allele(row, column);

                if allele == AlleleType::MISSING {
                    return false;
                }

                match first {
                    None => first = Some(allele),
                    Some(first) if first != allele => segregating = true,
                    Some(_) => (),
                }
            }

            segregating
        })
        .count()
}

/// Raw per-class site counts for one block under one subsample choice.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Tally {
    classes: Vec<usize>,
    biallelic: usize,
}

impl Tally {
    /// Creates a new, empty tally.
    pub fn new(classes: usize) -> Self {
        Self {
            classes: vec![0; classes],
            biallelic: 0,
        }
    }

    /// Adds every column of a block under the selected rows to the tally.
    pub fn add_block(
        &mut self,
        block: &Block,
        selection: &Selection<'_>,
        allele_type: AlleleType,
        classes: &BranchClasses,
    ) {
        for column in 0..block.columns() {
            self.add(classify(block, column, selection, allele_type, classes));
        }
    }

    /// Adds a site to the tally.
    pub fn add(&mut self, site: Site) {
        if let Site::Biallelic(class) = site {
            self.classes[class] += 1;
            self.biallelic += 1;
        }
    }

    /// Returns the number of bi-allelic sites.
    pub fn biallelic(&self) -> usize {
        self.biallelic
    }

    /// Returns the raw per-class site counts.
    pub fn classes(&self) -> &[usize] {
        &self.classes
    }

    /// Resets the tally to zero.
    pub fn reset(&mut self) {
        self.classes.iter_mut().for_each(|x| *x = 0);
        self.biallelic = 0;
    }
}
