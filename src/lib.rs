//! # gvcf-panel
//!
//! A library for genotyping reference-panel sites from a single-sample gVCF.
//!
//! A gVCF covers the genome with variant records and reference blocks, each
//! carrying the sample's genotype likelihoods over the alleles observed there.
//! A reference panel lists known biallelic sites. `gvcf-panel` walks both files
//! in coordinate order, pairs every panel site with the gVCF record enclosing
//! it, and reports the sample's genotype and likelihoods re-expressed over the
//! panel's own REF/ALT pair.
//!
//! ## Features
//!
//! - **Single pass**: a two-record sweep over the gVCF per region
//! - **Gap detection**: a panel site outside every gVCF record aborts the region
//! - **Six-way classification**: `ref`, `var`, `err`, `pra`, `npa`, `mpl`
//! - **Ploidy aware**: haploid and diploid calls keep their own PL layout
//! - **Region queries**: `chr`, `chr:beg` or `chr:beg-end` selectors
//! - **BGZF**: compressed input and output via noodles, with tabix/CSI seeking
//!
//! ## Example
//!
//! ```rust
//! use gvcf_panel::{ConfidenceRecord, MatchCategory, PanelVariant, ReconciliationEngine};
//!
//! let site = PanelVariant::new("chr1", 99, "A", "G").with_id("rs100");
//! let call = ConfidenceRecord::new("chr1", 99, 100, "A")
//!     .with_alternates(["G", "<NON_REF>"])
//!     .with_quality(87.46)
//!     .with_genotype(&[1, 1])
//!     .with_allele_depths(&[0, 12, 0])
//!     .with_likelihoods(&[400, 30, 0, 400, 30, 400]);
//!
//! let result = ReconciliationEngine::default().classify(&site, &call);
//! assert_eq!(result.category, MatchCategory::Var);
//! assert_eq!(result.likelihoods, Some(vec![Some(400), Some(30), Some(0)]));
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Genotype indexing, site and record types, region selectors
//! - [`parsing`]: VCF header and record parsing, per-region readers
//! - [`matching`]: Interval sweep and reconciliation engine
//! - [`output`]: Output header synthesis and record writing
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod matching;
pub mod output;
pub mod parsing;

// Re-export commonly used types for convenience
pub use core::region::Region;
pub use core::types::*;
pub use core::variant::{ConfidenceRecord, PanelVariant};
pub use matching::engine::{EngineConfig, MatchResult, ReconciliationEngine};
