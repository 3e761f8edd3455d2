//! Parallel aggregation of sequence blocks into configuration tables.

use std::{fmt, io, num::NonZeroUsize};

use rayon::prelude::*;

use crate::{
    block::{self, Block},
    classify::{segregating_sites, Tally},
    input::Input,
    sample::Subsamples,
    settings::Settings,
    table::{Counts, Datasets, Frequencies},
};

/// An aggregator of sequence blocks into configuration counts.
///
/// Blocks are processed in parallel on a dedicated thread pool. Each worker accumulates counts
/// privately, and the partial counts are merged when all blocks are processed.
#[derive(Debug)]
pub struct Aggregator<'a> {
    settings: &'a Settings,
    pool: rayon::ThreadPool,
    threads: usize,
}

impl<'a> Aggregator<'a> {
    /// Creates a new aggregator using the provided number of threads.
    pub fn new(settings: &'a Settings, threads: NonZeroUsize) -> Result<Self, Error> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.get())
            .build()?;

        Ok(Self {
            settings,
            pool,
            threads: threads.get(),
        })
    }

    /// Counts the configurations emitted by every subsample choice of every block.
    ///
    /// The total of the returned counts is the number of blocks times the subsampling
    /// multiplicity.
    ///
    /// # Errors
    ///
    /// If a non-empty block has fewer rows than the total sample size.
    pub fn count(&self, blocks: &[Block]) -> Result<Counts, Error> {
        check_rows(blocks, self.settings.spec().rows())?;

        let classes = self.settings.classes().len();

        let counts = self.pool.install(|| {
            blocks
                .par_iter()
                .fold(
                    || (Counts::default(), Tally::new(classes)),
                    |(mut counts, mut tally), block| {
                        self.count_block(block, &mut tally, &mut counts);
                        (counts, tally)
                    },
                )
                .map(|(counts, _)| counts)
                .reduce(Counts::default, Counts::merge)
        });

        Ok(counts)
    }

    fn count_block(&self, block: &Block, tally: &mut Tally, counts: &mut Counts) {
        let subsamples = self.settings.subsamples();
        let mut counter = subsamples.counter();

        while let Some(digits) = counter.advance() {
            tally.reset();
            tally.add_block(
                block,
                &subsamples.select(digits),
                self.settings.allele_type(),
                self.settings.classes(),
            );
            counts.add(self.settings.config(tally));
        }
    }

    /// Counts configurations and normalizes the counts to frequencies.
    pub fn frequencies(&self, blocks: &[Block]) -> Result<Frequencies, Error> {
        let counts = self.count(blocks)?;

        Ok(counts.into_frequencies(blocks.len(), self.settings.subsamples().multiplicity()))
    }

    /// Returns the number of segregating sites of each block on the full sample.
    ///
    /// # Errors
    ///
    /// If a non-empty block has fewer rows than the total sample size.
    pub fn segregating_sites(&self, blocks: &[Block]) -> Result<Vec<usize>, Error> {
        check_rows(blocks, self.settings.spec().rows())?;

        let full = Subsamples::full(self.settings.spec());
        let digits = vec![0; full.populations()];
        let selection = full.select(&digits);

        Ok(blocks
            .iter()
            .map(|block| segregating_sites(block, &selection))
            .collect())
    }

    /// Reads the blocks of one dataset from input.
    pub fn read_blocks(&self, input: &Input) -> Result<Vec<Block>, Error> {
        let reader = input.open()?;
        let blocks = block::Reader::new(reader, self.settings.allele_type()).read_blocks()?;

        log::info!("Processing {} sequence blocks from {input}", blocks.len());

        Ok(blocks)
    }

    /// Reads and aggregates every dataset.
    ///
    /// Segregating sites are counted per block only if requested with `snps`, and then only
    /// for a single dataset processed on a single thread. Otherwise a warning is logged and no
    /// counts are returned.
    pub fn run(&self, inputs: &[Input], snps: bool) -> Result<Output, Error> {
        let multiplicity = self.settings.subsamples().multiplicity();
        if multiplicity > 1 {
            log::info!("Processing {multiplicity} subsampling configurations per block");
        }

        let snps = match snps {
            true if self.threads > 1 => {
                log::warn!("Segregating sites cannot be exported with multiple threads, skipping");
                false
            }
            true if inputs.len() > 1 => {
                log::warn!("Segregating sites cannot be exported with multiple datasets, skipping");
                false
            }
            snps => snps,
        };

        let mut tables = Vec::with_capacity(inputs.len());
        let mut sites = None;

        for input in inputs {
            let blocks = self.read_blocks(input)?;

            if snps {
                sites = Some(self.segregating_sites(&blocks)?);
            }

            tables.push(self.frequencies(&blocks)?);
        }

        Ok(Output {
            datasets: Datasets::new(tables, self.settings.kmax()),
            segregating_sites: sites,
        })
    }
}

fn check_rows(blocks: &[Block], expected: usize) -> Result<(), Error> {
    match blocks
        .iter()
        .enumerate()
        .find(|(_, block)| !block.is_empty() && block.rows() < expected)
    {
        Some((i, block)) => Err(Error::TooFewRows {
            block: i,
            rows: block.rows(),
            expected,
        }),
        None => Ok(()),
    }
}

/// The result of aggregating datasets.
#[derive(Clone, Debug, PartialEq)]
pub struct Output {
    /// The frequency tables and maximum mutation class.
    pub datasets: Datasets,
    /// The number of segregating sites per block, if exported.
    pub segregating_sites: Option<Vec<usize>>,
}

/// An error associated with aggregation.
#[derive(Debug)]
pub enum Error {
    /// Invalid sequence block.
    Block(block::Error),
    /// I/O error.
    Io(io::Error),
    /// Failed to build thread pool.
    ThreadPool(rayon::ThreadPoolBuildError),
    /// A non-empty block has fewer rows than the total sample size.
    TooFewRows {
        /// Block index.
        block: usize,
        /// Number of rows in block.
        rows: usize,
        /// Total sample size.
        expected: usize,
    },
}

impl From<block::Error> for Error {
    fn from(e: block::Error) -> Self {
        Self::Block(e)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<rayon::ThreadPoolBuildError> for Error {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        Self::ThreadPool(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Block(e) => write!(f, "{e}"),
            Error::Io(e) => write!(f, "{e}"),
            Error::ThreadPool(e) => write!(f, "failed to build thread pool: {e}"),
            Error::TooFewRows {
                block,
                rows,
                expected,
            } => write!(
                f,
                "block {block} has {rows} rows, but the total sample size is {expected}"
            ),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    use std::{env, fs, process};

    use crate::{block::AlleleType, config::Config, sample::SampleSpec};

    fn settings(
        sizes: Vec<usize>,
        subsample_sizes: Option<Vec<usize>>,
        allele_type: AlleleType,
        fold: bool,
    ) -> Settings {
        Settings::builder()
            .set_allele_type(allele_type)
            .set_fold(fold)
            .build(SampleSpec::new(sizes, subsample_sizes, 1).unwrap())
            .unwrap()
    }

    fn threads(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn blocks(src: &str, allele_type: AlleleType) -> Vec<Block> {
        block::Reader::new(src.as_bytes(), allele_type)
            .read_blocks()
            .unwrap()
    }

    #[test]
    fn test_subsampled_binary_block() {
        let settings = settings(vec![4], Some(vec![2]), AlleleType::Binary, false);
        let aggregator = Aggregator::new(&settings, threads(1)).unwrap();
        let blocks = blocks("//\n001\n101\n001\n001\n", AlleleType::Binary);

        let counts = aggregator.count(&blocks).unwrap();

        // Only the first column is bi-allelic, and only in the three pairs containing row 1
        assert_eq!(counts.total(), 6);
        assert_eq!(counts.get(&Config::from([1])), 3);
        assert_eq!(counts.get(&Config::from([0])), 3);

        let frequencies = aggregator.frequencies(&blocks).unwrap();
        assert_approx_eq!(frequencies.sum(), 1.0, epsilon = 1e-12);
        assert_approx_eq!(
            frequencies.get(&Config::from([1])).unwrap(),
            0.5,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_missing_data_masks_column() {
        let settings = settings(vec![2, 2], None, AlleleType::Genotype, false);
        let aggregator = Aggregator::new(&settings, threads(1)).unwrap();

        let masked = blocks("//\nAA\nAC\nNA\nAA\n", AlleleType::Genotype);
        let unmasked = blocks("//\nAA\nAC\nGA\nAA\n", AlleleType::Genotype);

        // Derived counts (1, 0) have class 2 and (0, 1) have class 0
        let mut expected = Config::from_zeros(7);
        expected.0[2] = 1;
        assert_eq!(aggregator.count(&masked).unwrap().get(&expected), 1);

        expected.0[0] = 1;
        assert_eq!(aggregator.count(&unmasked).unwrap().get(&expected), 1);
    }

    #[test]
    fn test_total_is_blocks_times_multiplicity() {
        let settings = settings(vec![3, 2], Some(vec![2, 1]), AlleleType::Genotype, true);
        let aggregator = Aggregator::new(&settings, threads(2)).unwrap();
        let blocks = blocks(
            "//\nACGT\nACGA\nTCGA\nACCT\nAGGT\n//\nAAAA\nAAAA\nAAAA\nAAAA\nAAAA\n//\n",
            AlleleType::Genotype,
        );

        assert_eq!(settings.subsamples().multiplicity(), 6);
        assert_eq!(aggregator.count(&blocks).unwrap().total(), 18);
    }

    #[test]
    fn test_thread_count_does_not_change_counts() {
        let settings = settings(vec![3, 3], Some(vec![2, 2]), AlleleType::Binary, true);
        let src = (0..20)
            .map(|i| {
                let rows = (0..6)
                    .map(|r| {
                        (0..5)
                            .map(|c| if (i * 7 + r * 3 + c) % 4 == 0 { '1' } else { '0' })
                            .collect::<String>()
                    })
                    .collect::<Vec<_>>();
                format!("//\n{}\n", rows.join("\n"))
            })
            .collect::<String>();
        let blocks = blocks(&src, AlleleType::Binary);
        assert_eq!(blocks.len(), 20);

        let expected = Aggregator::new(&settings, threads(1))
            .unwrap()
            .count(&blocks)
            .unwrap();
        assert_eq!(expected.total(), 20 * 9);

        for n in [2, 4] {
            let counts = Aggregator::new(&settings, threads(n))
                .unwrap()
                .count(&blocks)
                .unwrap();
            assert_eq!(counts, expected);
        }

        let (left, right) = blocks.split_at(7);
        let aggregator = Aggregator::new(&settings, threads(1)).unwrap();
        let left = aggregator.count(left).unwrap();
        let right = aggregator.count(right).unwrap();
        assert_eq!(right.merge(left), expected);
    }

    #[test]
    fn test_empty_block_gives_zero_config() {
        let settings = settings(vec![2], None, AlleleType::Binary, false);
        let aggregator = Aggregator::new(&settings, threads(1)).unwrap();
        let blocks = blocks("//\n\n//\n01\n11\n", AlleleType::Binary);

        let counts = aggregator.count(&blocks).unwrap();

        assert_eq!(counts.get(&Config::from([0])), 1);
        assert_eq!(counts.get(&Config::from([1])), 1);
    }

    #[test]
    fn test_too_few_rows() {
        let settings = settings(vec![2, 2], None, AlleleType::Binary, false);
        let aggregator = Aggregator::new(&settings, threads(1)).unwrap();
        let blocks = blocks("//\n01\n11\n01\n11\n//\n01\n11\n00\n", AlleleType::Binary);

        assert!(matches!(
            aggregator.count(&blocks),
            Err(Error::TooFewRows {
                block: 1,
                rows: 3,
                expected: 4
            })
        ));
    }

    #[test]
    fn test_segregating_sites_use_full_sample() {
        let settings = settings(vec![4], Some(vec![2]), AlleleType::Binary, false);
        let aggregator = Aggregator::new(&settings, threads(1)).unwrap();
        let blocks = blocks(
            "//\n001\n011\n101\n111\n//\n000\n000\n000\n001\n",
            AlleleType::Binary,
        );

        assert_eq!(aggregator.segregating_sites(&blocks).unwrap(), vec![2, 1]);
    }

    #[test]
    fn test_subsample_individuals_with_ploidy() {
        let spec = SampleSpec::new(vec![4], Some(vec![2]), 2).unwrap();
        let settings = Settings::builder()
            .set_allele_type(AlleleType::Binary)
            .build(spec)
            .unwrap();
        let aggregator = Aggregator::new(&settings, threads(1)).unwrap();
        let blocks = blocks("//\n10\n10\n00\n01\n", AlleleType::Binary);

        // Rows 0 and 1 form the first individual and rows 2 and 3 the second, so only the
        // second column is bi-allelic, and only when drawing the second individual
        let counts = aggregator.count(&blocks).unwrap();
        assert_eq!(settings.subsamples().multiplicity(), 2);
        assert_eq!(counts.total(), 2);
        assert_eq!(counts.get(&Config::from([0])), 1);
        assert_eq!(counts.get(&Config::from([1])), 1);
    }

    #[test]
    fn test_run_single_dataset_exports_segregating_sites() {
        let settings = settings(vec![4], Some(vec![2]), AlleleType::Binary, false);
        let aggregator = Aggregator::new(&settings, threads(1)).unwrap();

        let dir = env::temp_dir().join(format!("bsfs-aggregate-single-{}", process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("blocks.txt");
        fs::write(&path, "//\n011\n101\n001\n001\n//\n001\n101\n001\n001\n").unwrap();

        let output = aggregator.run(&[Input::Path(path)], true).unwrap();

        assert_eq!(output.segregating_sites, Some(vec![2, 1]));
        assert_eq!(output.datasets.len(), 1);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_run_multiple_datasets_skips_segregating_sites() {
        let settings = settings(vec![2], None, AlleleType::Binary, false);
        let aggregator = Aggregator::new(&settings, threads(1)).unwrap();

        let dir = env::temp_dir().join(format!("bsfs-aggregate-multiple-{}", process::id()));
        fs::create_dir_all(&dir).unwrap();
        let first = dir.join("first.txt");
        let second = dir.join("second.txt");
        fs::write(&first, "//\n01\n11\n").unwrap();
        fs::write(&second, "//\n00\n00\n//\n01\n10\n").unwrap();

        let output = aggregator
            .run(&[Input::Path(first), Input::Path(second)], true)
            .unwrap();

        assert_eq!(output.segregating_sites, None);
        assert_eq!(output.datasets.len(), 2);
        assert_eq!(
            output.datasets.get(1).and_then(|t| t.get(&Config::from([0]))),
            Some(0.5)
        );

        fs::remove_dir_all(&dir).unwrap();
    }
}
