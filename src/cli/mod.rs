//! Command-line interface for gvcf-panel.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **genotype**: Reconcile panel sites against a gVCF with the full tag set
//! - **call**: The older single-tag reconciliation (deprecated)
//!
//! ## Usage
//!
//! ```text
//! # Genotype panel sites, writing VCF to stdout
//! gvcf-panel genotype panel.vcf.gz sample.g.vcf.gz > sample.panel.vcf
//!
//! # Restrict to regions and write BGZF output
//! gvcf-panel genotype -r chr20,chr21:1-5000000 -o sample.panel.vcf.gz panel.vcf.gz sample.g.vcf.gz
//!
//! # Print per-category counts as JSON on stderr
//! gvcf-panel --format json genotype --summary panel.vcf.gz sample.g.vcf.gz > /dev/null
//! ```

use clap::{Parser, Subcommand};

pub mod call;
pub mod genotype;
pub mod summary;

#[derive(Parser)]
#[command(name = "gvcf-panel")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Genotype reference-panel sites from a single-sample gVCF")]
#[command(
    long_about = "gvcf-panel pairs every site of a reference panel with the gVCF record that covers it and reports a biallelic genotype and PL for the panel's alternate allele.\n\nEach output record is tagged with how the two inputs relate:\n- ref: site lies in a reference block\n- var: site matches a called variant\n- err: called genotype contradicted by allele depths\n- pra: position, REF or ALT disagree\n- npa: genotype involves a non-panel allele\n- mpl: gVCF record has no PL"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Format of the run summary
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Genotype panel sites from a gVCF
    Genotype(genotype::GenotypeArgs),

    /// Genotype panel sites with the legacy ref/var/err tags (deprecated)
    Call(call::CallArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Whether an error was caused by the output consumer going away
#[must_use]
pub fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|e| e.downcast_ref::<std::io::Error>())
        .any(|e| e.kind() == std::io::ErrorKind::BrokenPipe)
}
