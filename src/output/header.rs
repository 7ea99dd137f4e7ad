//! Output header synthesis.
//!
//! The header is built from the panel's contig declarations (falling back to
//! the gVCF's), a fixed set of field declarations, and a `#CHROM` line naming
//! the gVCF's first sample.

use thiserror::Error;

use crate::core::types::TagPlacement;
use crate::parsing::vcf::InputHeader;

/// VCF version declared by the output
pub const FILE_FORMAT: &str = "VCFv4.1";

const GT_LINE: &str = r#"##FORMAT=<ID=GT,Number=1,Type=String,Description="Genotype">"#;
const GC_LINE: &str = r#"##FORMAT=<ID=GC,Number=1,Type=String,Description="Genotype call {ref,err,var,pra,npa,mpl}">"#;
const PL_LINE: &str = r#"##FORMAT=<ID=PL,Number=G,Type=Integer,Description="Phred-scaled genotype likelihoods rounded to integer">"#;
const VM_LINE: &str = r#"##INFO=<ID=VM,Number=1,Type=String,Description="GVCF variant match {ref,err,var,pra,npa,mpl}">"#;

const CHROM_LINE: &str = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum HeaderError {
    #[error("gVCF header declares no samples")]
    NoSample,
}

/// Build the output header text, including the trailing newline
///
/// # Errors
///
/// Returns `HeaderError::NoSample` if the gVCF header names no sample.
pub fn synthesize_header(
    panel: &InputHeader,
    gvcf: &InputHeader,
    placement: TagPlacement,
) -> Result<String, HeaderError> {
    let sample = gvcf.sample_names.first().ok_or(HeaderError::NoSample)?;

    let contigs = if panel.contig_lines.is_empty() {
        &gvcf.contig_lines
    } else {
        &panel.contig_lines
    };

    let mut lines: Vec<String> = Vec::with_capacity(contigs.len() + 8);
    lines.push(format!("##fileformat={FILE_FORMAT}"));
    lines.push(format!(
        "##source={}-{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    ));
    lines.extend(contigs.iter().cloned());
    if placement == TagPlacement::Info {
        lines.push(VM_LINE.to_string());
    }
    lines.push(GT_LINE.to_string());
    if placement == TagPlacement::Format {
        lines.push(GC_LINE.to_string());
    }
    lines.push(PL_LINE.to_string());
    lines.push(format!("{CHROM_LINE}\t{sample}"));

    let mut text = lines.join("\n");
    text.push('\n');
    Ok(text)
}
