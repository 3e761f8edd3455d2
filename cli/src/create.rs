use std::{
    fs,
    io::{self, Write as _},
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Error};

use clap::Parser;

use bsfs_core::{
    block::AlleleType, table::io::write, Aggregator, Input, SampleSpec, Settings,
};

const DEFAULT_SNPS_PATH: &str = "block_SNPs.txt";

/// Create blockwise joint SFS from sequence blocks.
#[derive(Debug, Parser)]
pub struct Create {
    /// Input sequence block files, one per dataset.
    ///
    /// If no file is provided, a single dataset will be read from stdin. Gzip-compressed input is
    /// supported.
    #[arg(value_name = "FILE")]
    inputs: Vec<PathBuf>,

    /// Number of sampled haplotypes in each population.
    ///
    /// Populations occupy consecutive rows of each block in the order given. Use comma to separate
    /// populations.
    #[arg(
        short = 's',
        long,
        required = true,
        value_delimiter = ',',
        value_name = "INT,..."
    )]
    samples: Vec<usize>,

    /// Number of haplotypes to subsample from each population.
    ///
    /// If provided, the spectrum of each block is averaged over every way of drawing the
    /// subsamples. One value must be given for each population.
    #[arg(
        short = 'k',
        long,
        value_delimiter = ',',
        value_name = "INT,..."
    )]
    subsamples: Option<Vec<usize>>,

    /// Ploidy of sampled individuals.
    ///
    /// When subsampling, the haplotypes of an individual are drawn together, so that sample and
    /// subsample sizes must be multiples of the ploidy.
    #[arg(long, default_value_t = 1, value_name = "INT")]
    ploidy: usize,

    /// Allele encoding of sequence blocks.
    ///
    /// Use 'genotype' for nucleotides, or 'binary' for ancestral '0' and derived '1'. In both
    /// cases, 'N' denotes missing data.
    #[arg(short = 'a', long, default_value_t = AlleleType::Genotype, value_name = "TYPE")]
    allele_type: AlleleType,

    /// Fold the spectrum.
    #[arg(long)]
    fold: bool,

    /// Maximum mutation class.
    ///
    /// Class counts greater than `kmax - 2` are set to `kmax - 1`. By default, no classes are
    /// capped, and the maximum class is derived from the data.
    #[arg(long, default_value_t = 0, value_name = "INT")]
    kmax: usize,

    /// Number of threads to use.
    #[arg(short = 't', long, default_value_t = NonZeroUsize::MIN, value_name = "INT")]
    threads: NonZeroUsize,

    /// Write the number of segregating sites of each block to a file.
    ///
    /// Each line holds the count of a single block, in input order. Requires a single dataset and
    /// a single thread. If no path is given, 'block_SNPs.txt' will be used.
    #[arg(
        long,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = DEFAULT_SNPS_PATH,
        value_name = "PATH"
    )]
    snps: Option<PathBuf>,

    /// Output paths, one per dataset.
    ///
    /// If a single dataset is read and no output is provided, the spectrum is written to stdout.
    #[arg(short = 'o', long, value_name = "PATH")]
    output: Vec<PathBuf>,

    /// Output precision.
    #[arg(short = 'p', long, default_value_t = 6, value_name = "INT")]
    precision: usize,
}

impl Create {
    pub fn run(self) -> Result<(), Error> {
        let inputs = Input::from_paths(self.inputs)?;

        if self.output.is_empty() && inputs.len() > 1 {
            return Err(anyhow!(
                "an output path must be provided for each of {} datasets",
                inputs.len()
            ));
        } else if !self.output.is_empty() && self.output.len() != inputs.len() {
            return Err(anyhow!(
                "found {} output paths for {} datasets",
                self.output.len(),
                inputs.len()
            ));
        }

        let spec = SampleSpec::new(self.samples, self.subsamples, self.ploidy)?;
        let settings = Settings::builder()
            .set_allele_type(self.allele_type)
            .set_fold(self.fold)
            .set_kmax(Some(self.kmax))
            .build(spec)?;

        let aggregator = Aggregator::new(&settings, self.threads)?;
        let output = aggregator.run(&inputs, self.snps.is_some())?;

        let datasets = output.datasets;
        log::info!("Using maximum mutation class {}", datasets.kmax());
        log::info!("Log-likelihood baseline {}", datasets.log_likelihood());

        let writer = write::Builder::default().set_precision(self.precision);
        if self.output.is_empty() {
            for table in datasets.tables() {
                writer.write_to_stdout(table)?;
            }
        } else {
            for (path, table) in self.output.iter().zip(datasets.tables()) {
                writer
                    .write_to_path(path, table)
                    .with_context(|| format!("failed to write spectrum to '{}'", path.display()))?;
            }
        }

        if let (Some(path), Some(sites)) = (self.snps, output.segregating_sites) {
            write_segregating_sites(&path, &sites)
                .with_context(|| format!("failed to write SNP counts to '{}'", path.display()))?;
        }

        Ok(())
    }
}

fn write_segregating_sites(path: &Path, sites: &[usize]) -> io::Result<()> {
    let mut writer = io::BufWriter::new(fs::File::create(path)?);

    for count in sites {
        writeln!(writer, "{count}")?;
    }

    writer.flush()
}
