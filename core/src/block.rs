//! Sequence blocks.

use std::{fmt, io, str::FromStr};

pub mod reader;
pub use reader::Reader;

/// The encoding of alleles in sequence blocks.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum AlleleType {
    /// Nucleotides `A`, `T`, `G`, `C`.
    #[default]
    Genotype,
    /// Ancestral `0` and derived `1`.
    Binary,
}

impl AlleleType {
    /// The missing data symbol, shared by all encodings.
    pub const MISSING: u8 = b'N';

    /// Returns `true` if a line starting with the provided byte is a sample row.
    pub fn is_row_start(&self, byte: u8) -> bool {
        match self {
            AlleleType::Genotype => matches!(byte, b'A' | b'T' | b'G' | b'C' | Self::MISSING),
            AlleleType::Binary => matches!(byte, b'0' | b'1' | Self::MISSING),
        }
    }

    /// Returns the allele considered derived at a site with exactly the two provided alleles.
    ///
    /// For nucleotides, the polarity is unknown and the greater byte is chosen consistently.
    /// For binary data, the derived allele is `1`, and `None` is returned if it is absent.
    pub fn derived(&self, first: u8, second: u8) -> Option<u8> {
        match self {
            AlleleType::Genotype => Some(first.max(second)),
            AlleleType::Binary => (first == b'1' || second == b'1').then_some(b'1'),
        }
    }
}

impl fmt::Display for AlleleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlleleType::Genotype => f.write_str("genotype"),
            AlleleType::Binary => f.write_str("binary"),
        }
    }
}

impl FromStr for AlleleType {
    type Err = ParseAlleleTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "genotype" => Ok(Self::Genotype),
            "binary" => Ok(Self::Binary),
            _ => Err(ParseAlleleTypeError(s.to_string())),
        }
    }
}

/// An error associated with parsing an allele type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseAlleleTypeError(String);

impl fmt::Display for ParseAlleleTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown allele type '{}', expected 'genotype' or 'binary'",
            self.0
        )
    }
}

impl std::error::Error for ParseAlleleTypeError {}

/// A block of aligned sample sequences.
///
/// Rows are samples and columns are positions. All rows have the same length.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Block {
    rows: Vec<Vec<u8>>,
    columns: usize,
}

impl Block {
    /// Creates a new block from rows.
    ///
    /// # Errors
    ///
    /// If rows differ in length.
    pub fn new(rows: Vec<Vec<u8>>) -> Result<Self, Error> {
        let columns = rows.first().map(Vec::len).unwrap_or(0);

        if let Some((row, found)) = rows
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|&(_, len)| len != columns)
        {
            return Err(Error::RaggedRow {
                row,
                expected: columns,
                found,
            });
        }

        Ok(Self { rows, columns })
    }

    /// Returns the allele at the provided row and column.
    ///
    /// # Panics
    ///
    /// If the row or column is out of bounds.
    #[inline]
    pub fn allele(&self, row: usize, column: usize) -> u8 {
        self.rows[row][column]
    }

    /// Returns the number of columns.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Returns `true` if the block has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the number of rows.
    pub fn rows(&self) -> usize {
        self.rows.len()
    }
}

impl<const R: usize> TryFrom<[&str; R]> for Block {
    type Error = Error;

    fn try_from(rows: [&str; R]) -> Result<Self, Self::Error> {
        Self::new(rows.iter().map(|row| row.as_bytes().to_vec()).collect())
    }
}

/// An error associated with sequence blocks.
#[derive(Debug)]
pub enum Error {
    /// I/O error.
    Io(io::Error),
    /// A row differs in length from the first row.
    RaggedRow {
        /// Row index.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the row.
        found: usize,
    },
    /// An error in a specific block of an input.
    InBlock {
        /// Block index.
        block: usize,
        /// Underlying error.
        error: Box<Error>,
    },
}

impl Error {
    pub(crate) fn in_block(self, block: usize) -> Self {
        match self {
            Error::Io(e) => Error::Io(e),
            e => Error::InBlock {
                block,
                error: Box::new(e),
            },
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "{e}"),
            Error::RaggedRow {
                row,
                expected,
                found,
            } => write!(
                f,
                "row {row} has length {found}, but the first row has length {expected}"
            ),
            Error::InBlock { block, error } => write!(f, "in block {block}: {error}"),
        }
    }
}

impl std::error::Error for Error {}
