//! Call command - the older reconciliation with `ref`/`var`/`err` tags only.
//!
//! Kept for pipelines that still parse `INFO/VM`. Genotypes involving other
//! alleles and position/allele disagreements are both reported as `err`, and
//! missing values are written as zeros.

use clap::Args;
use tracing::warn;

use crate::cli::genotype::{reconcile_files, IoArgs};
use crate::cli::OutputFormat;
use crate::core::types::TagPlacement;
use crate::matching::engine::EngineConfig;

/// Arguments for the call command
#[derive(Args, Debug)]
pub struct CallArgs {
    #[command(flatten)]
    pub io: IoArgs,
}

/// Execute the call command
///
/// # Errors
///
/// Returns an error if an input cannot be read, a region fails the gVCF
/// enclosure check, or the output cannot be written.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: CallArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    warn!(
        "`call` is deprecated; use `genotype --tag-in-info --gt-missing0 --pl-missing0` for \
         similar output"
    );
    reconcile_files(
        &args.io,
        EngineConfig::legacy(),
        TagPlacement::Info,
        format,
        verbose,
    )
}
