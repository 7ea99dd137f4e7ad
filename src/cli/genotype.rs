use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::{debug, info};

use crate::cli::summary::RunSummary;
use crate::cli::OutputFormat;
use crate::core::region::Region;
use crate::core::types::{MissingValues, TagPlacement};
use crate::core::variant::{ConfidenceRecord, PanelVariant};
use crate::matching::engine::{EngineConfig, ReconcileError, ReconciliationEngine};
use crate::output::header::synthesize_header;
use crate::output::writer::{OutputSink, VcfRecordWriter};
use crate::parsing::reader::VcfSource;

/// Inputs and output shared by both commands
#[derive(Args, Debug)]
pub struct IoArgs {
    /// VCF of reference panel sites (plain or BGZF)
    #[arg(required = true)]
    pub panel: PathBuf,

    /// gVCF of the genotyped sample (plain or BGZF)
    #[arg(required = true)]
    pub gvcf: PathBuf,

    /// Output VCF; a .gz or .bgz suffix writes BGZF [default: stdout]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Suppress the header in VCF output
    #[arg(short = 'H', long)]
    pub no_header: bool,

    /// Query regions as comma-delimited <chr>, <chr>:<beg> or <chr>:<beg>-<end>
    #[arg(short, long)]
    pub regions: Option<String>,

    /// Print per-category counts to stderr when done
    #[arg(long)]
    pub summary: bool,
}

#[derive(Args, Debug)]
pub struct GenotypeArgs {
    #[command(flatten)]
    pub io: IoArgs,

    /// Use 0 or 0/0 for missing genotypes
    #[arg(long = "gt-missing0", alias = "gt_missing0")]
    pub gt_missing0: bool,

    /// Use a 0-array for missing PLs
    #[arg(long = "pl-missing0", alias = "pl_missing0")]
    pub pl_missing0: bool,

    /// Accept variant genotypes even when a called allele has zero depth in AD
    #[arg(long)]
    pub no_depth_check: bool,

    /// Report haploid calls as homozygous diploid genotypes with a missing 0/1 PL
    #[arg(long)]
    pub haploid_as_diploid: bool,

    /// Write the genotype call tag as INFO/VM instead of FORMAT/GC
    #[arg(long)]
    pub tag_in_info: bool,
}

impl GenotypeArgs {
    #[must_use]
    pub fn placement(&self) -> TagPlacement {
        if self.tag_in_info {
            TagPlacement::Info
        } else {
            TagPlacement::Format
        }
    }

    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            ploidy_aware: !self.haploid_as_diploid,
            depth_check: !self.no_depth_check,
            missing: MissingValues {
                gt_zero: self.gt_missing0,
                pl_zero: self.pl_missing0,
            },
            collapse_errors: false,
        }
    }
}

/// Execute genotype subcommand
///
/// # Errors
///
/// Returns an error if an input cannot be read, a region fails the gVCF
/// enclosure check, or the output cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: GenotypeArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let config = args.engine_config();
    reconcile_files(&args.io, config, args.placement(), format, verbose)
}

/// Reconcile the panel against the gVCF region by region and write the result
///
/// # Errors
///
/// See [`run`].
pub fn reconcile_files(
    io: &IoArgs,
    config: EngineConfig,
    placement: TagPlacement,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let panel = VcfSource::open(&io.panel)
        .with_context(|| format!("Failed to read panel {}", io.panel.display()))?;
    let gvcf = VcfSource::open(&io.gvcf)
        .with_context(|| format!("Failed to read gVCF {}", io.gvcf.display()))?;

    let regions = match &io.regions {
        Some(regions) => Region::parse_list(regions)?,
        None => panel
            .body_chromosomes()
            .with_context(|| format!("Failed to scan panel {}", panel.path().display()))?
            .into_iter()
            .map(Region::whole)
            .collect(),
    };

    if verbose {
        eprintln!(
            "Reconciling {} region(s) of {} against {}",
            regions.len(),
            panel.path().display(),
            gvcf.path().display()
        );
    }
    debug!(?config, ?placement, "Engine configuration");

    let header = if io.no_header {
        None
    } else {
        Some(synthesize_header(panel.header(), gvcf.header(), placement)?)
    };

    let sink = OutputSink::create(io.output.as_deref()).context("Failed to open output")?;
    let mut writer = VcfRecordWriter::new(sink, config.missing, placement);
    let engine = ReconciliationEngine::new(config);

    if let Some(header) = header {
        if let Err(e) = writer.write_header(&header) {
            writer.abandon().discard();
            return Err(e).context("Failed to write header");
        }
    }

    let mut run_summary = RunSummary::default();
    for region in &regions {
        info!(region = %region, "Reconciling region");

        let result = panel
            .query::<PanelVariant>(region)
            .map_err(ReconcileError::from)
            .and_then(|sites| {
                let records = gvcf.query::<ConfidenceRecord>(region)?;
                engine.reconcile(sites, records, |r| writer.write_record(r))
            })
            .and_then(|summary| {
                // Bound buffered output to one region
                writer.flush().map_err(ReconcileError::Write)?;
                Ok(summary)
            });

        match result {
            Ok(summary) => {
                info!(
                    region = %region,
                    sites = summary.sites,
                    "Finished region"
                );
                run_summary.add(region, summary);
            }
            Err(e) => {
                writer.abandon().discard();
                return Err(e).with_context(|| format!("Failed to reconcile region {region}"));
            }
        }
    }

    writer
        .finish()
        .context("Failed to flush output")?
        .finish()
        .context("Failed to finish output")?;

    if io.summary {
        run_summary.print(format)?;
    }

    Ok(())
}
