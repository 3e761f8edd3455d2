//! Block reader.
//!
//! A block starts on a line beginning with `/`. Lines following the start marker whose first
//! byte belongs to the allele alphabet are sample rows. Lines before the first row that are
//! neither rows nor blank are treated as block headers and skipped, including further start
//! markers. After the first row, a blank line, a non-allele line, a new start marker, or the end
//! of input ends the block.

use std::io;

use crate::input::ReadStatus;

use super::{AlleleType, Block, Error};

const START: u8 = b'/';

/// A reader of sequence blocks.
pub struct Reader<R> {
    inner: R,
    allele_type: AlleleType,
    buf: String,
    // Set when a block was ended by the start marker of the next block
    started: bool,
    blocks: usize,
}

impl<R> Reader<R>
where
    R: io::BufRead,
{
    /// Creates a new reader.
    pub fn new(inner: R, allele_type: AlleleType) -> Self {
        Self {
            inner,
            allele_type,
            buf: String::new(),
            started: false,
            blocks: 0,
        }
    }

    fn next_line(&mut self) -> io::Result<bool> {
        self.buf.clear();
        Ok(self.inner.read_line(&mut self.buf)? > 0)
    }

    fn seek_start(&mut self) -> io::Result<bool> {
        if self.started {
            self.started = false;
            return Ok(true);
        }

        while self.next_line()? {
            if self.buf.as_bytes().first() == Some(&START) {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn read_rows(&mut self) -> io::Result<Vec<Vec<u8>>> {
        let mut rows = Vec::new();

        while self.next_line()? {
            let line = self.buf.trim_end();

            match line.as_bytes().first() {
                Some(&START) if !rows.is_empty() => {
                    self.started = true;
                    break;
                }
                Some(&byte) if self.allele_type.is_row_start(byte) => {
                    rows.push(line.as_bytes().to_vec());
                }
                None => break,
                Some(_) if !rows.is_empty() => break,
                Some(_) => (),
            }
        }

        Ok(rows)
    }

    /// Reads the next block.
    pub fn read_block(&mut self) -> ReadStatus<Block, Error> {
        match self.seek_start() {
            Ok(true) => (),
            Ok(false) => return ReadStatus::Done,
            Err(e) => return ReadStatus::Error(e.into()),
        }

        let block = self
            .read_rows()
            .map_err(Error::from)
            .and_then(Block::new)
            .map_err(|e| e.in_block(self.blocks));

        self.blocks += 1;

        match block {
            Ok(block) => ReadStatus::Read(block),
            Err(e) => ReadStatus::Error(e),
        }
    }

    /// Reads all remaining blocks.
    pub fn read_blocks(&mut self) -> Result<Vec<Block>, Error> {
        std::iter::from_fn(|| self.read_block().into_option()).collect()
    }
}
