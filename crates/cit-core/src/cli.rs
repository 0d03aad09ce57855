//! `cit-reduce` command line.
//!
//! ```bash
//! cit-reduce --snapshot /tmp/vt.json --filter type_specific.io-github-autotest-qemu.block_hotplug
//! cit-reduce --snapshot /tmp/vt.json --filter t.hotplug --strength 2 --json
//! ```

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;

use crate::config::{ConfigError, ReductionConfig};
use cit_explore::coverage::{CoveringArrayGenerator, GreedyGenerator};

use crate::pipeline::{reduce_with, Outcome, ReduceError};
use crate::snapshot::{Snapshot, SnapshotError};

#[derive(Debug, Parser)]
#[command(
    name = "cit-reduce",
    about = "Select a covering subset of real test variants from a snapshot"
)]
pub struct Cli {
    /// JSON snapshot of the test listing.
    #[arg(long)]
    pub snapshot: PathBuf,

    /// Family prefix to reduce.
    #[arg(long)]
    pub filter: String,

    /// JSON reduction config; flags below override it.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Interaction strength.
    #[arg(long)]
    pub strength: Option<usize>,

    /// Name component separator.
    #[arg(long)]
    pub separator: Option<char>,

    /// Placeholder for categories a shorter variant does not have.
    #[arg(long)]
    pub absent: Option<String>,

    /// Seed for covering-array tie-breaking.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print the full reduction report as JSON instead of a name list.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Reduce(#[from] ReduceError),

    #[error("cannot write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot encode report: {0}")]
    Json(#[from] serde_json::Error),
}

impl Cli {
    /// Effective configuration: file (or defaults) with flag overrides.
    pub fn reduction_config(&self) -> Result<ReductionConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => ReductionConfig::from_path(path)?,
            None => ReductionConfig::default(),
        };
        if let Some(strength) = self.strength {
            config.strength = strength;
        }
        if let Some(separator) = self.separator {
            config.separator = separator;
        }
        if let Some(absent) = &self.absent {
            config.absent = absent.clone();
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Run a reduction and print its result.
///
/// Returns `Ok(false)` when the reduction ran but produced no usable list.
pub fn run(cli: &Cli, out: &mut impl Write) -> Result<bool, CliError> {
    let config = cli.reduction_config()?;
    run_with(cli, &config, &GreedyGenerator::new(config.seed), out)
}

/// [`run`] with an already resolved config and a caller-supplied generator.
pub fn run_with<G>(
    cli: &Cli,
    config: &ReductionConfig,
    generator: &G,
    out: &mut impl Write,
) -> Result<bool, CliError>
where
    G: CoveringArrayGenerator + ?Sized,
{
    let index = Snapshot::from_path(&cli.snapshot)?.variant_index(config.separator)?;
    let reduction = reduce_with(&index, &cli.filter, config, generator)?;

    if cli.json {
        serde_json::to_writer_pretty(&mut *out, &reduction)?;
        writeln!(out)?;
        return Ok(reduction.is_valid());
    }

    match &reduction.outcome {
        Outcome::Reduced { names } => {
            writeln!(out, "{}", names.join("\n"))?;
            Ok(true)
        }
        Outcome::Spurious { spurious } => {
            writeln!(
                out,
                "reduction of '{}' failed: {} generated names are not real tests",
                cli.filter,
                spurious.len()
            )?;
            Ok(false)
        }
        Outcome::Empty => {
            writeln!(out, "reduction of '{}' produced no tests", cli.filter)?;
            Ok(false)
        }
    }
}
