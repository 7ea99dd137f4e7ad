//! Readers for the two VCF inputs.
//!
//! This module provides:
//!
//! - **Header parsing**: `##contig` lines, contig IDs and sample names, validated with noodles
//! - **Record parsing**: panel sites ([`PanelVariant`](crate::core::variant::PanelVariant)) and
//!   gVCF records ([`ConfidenceRecord`](crate::core::variant::ConfidenceRecord))
//! - **Region queries**: per-chromosome or per-interval record streams over plain or BGZF
//!   files, seeking through a `.tbi` or `.csi` index when one is present
//!
//! ## Example
//!
//! ```rust,no_run
//! use gvcf_panel::core::region::Region;
//! use gvcf_panel::core::variant::PanelVariant;
//! use gvcf_panel::parsing::reader::VcfSource;
//! use std::path::Path;
//!
//! let panel = VcfSource::open(Path::new("panel.vcf.gz")).unwrap();
//! let region: Region = "chr20:1-1_000_000".parse().unwrap();
//! for site in panel.query::<PanelVariant>(&region).unwrap() {
//!     let site = site.unwrap();
//!     println!("{}:{} {}>{}", site.chrom, site.position(), site.reference, site.alternate);
//! }
//! ```
//!
//! ## Fields read from the gVCF
//!
//! | Field | Use | Required |
//! |-------|-----|----------|
//! | INFO/END | end of a reference block | No |
//! | FORMAT/GT | called genotype and ploidy | No |
//! | FORMAT/AD | depth consistency check | No |
//! | FORMAT/PL | reported likelihoods | Yes (else `mpl`); absent entries are reported missing |

pub mod reader;
pub mod vcf;
