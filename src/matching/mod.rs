//! Panel/gVCF reconciliation.
//!
//! - [`IntervalSweep`](sweep::IntervalSweep): pairs each panel site with the
//!   gVCF record enclosing it
//! - [`ReconciliationEngine`](engine::ReconciliationEngine): classifies each
//!   pair and extracts likelihoods
//!
//! ## Decision table
//!
//! Evaluated in order for each panel site and its enclosing gVCF record:
//!
//! 1. **mpl**: the record has no `PL`
//! 2. **ref**: the record is a reference block (ALT is only `<NON_REF>` or `<*>`)
//! 3. position, REF and panel ALT all match the record:
//!    - **npa** if the genotype uses any allele other than REF and the panel ALT
//!    - **err** if a called allele has zero depth in `AD`
//!    - **var** otherwise
//! 4. **pra**: anything else
//!
//! The category never depends on the shape of `PL`. Likelihoods the record does
//! not carry are reported as missing entries, and a haploid call reported as
//! diploid has no `0/1` likelihood.
//!
//! A panel site with no enclosing gVCF record is not a classification outcome:
//! the region is aborted with [`SweepError::NotEnclosed`](sweep::SweepError::NotEnclosed).
//!
//! ## Example
//!
//! ```rust
//! use gvcf_panel::core::variant::{ConfidenceRecord, PanelVariant};
//! use gvcf_panel::core::types::MatchCategory;
//! use gvcf_panel::matching::engine::ReconciliationEngine;
//!
//! let site = PanelVariant::new("chr1", 99, "A", "G");
//! let block = ConfidenceRecord::new("chr1", 49, 200, "C")
//!     .with_alternates(["<NON_REF>"])
//!     .with_likelihoods(&[0, 5, 20]);
//!
//! let result = ReconciliationEngine::default().classify(&site, &block);
//! assert_eq!(result.category, MatchCategory::Ref);
//! assert_eq!(result.likelihoods, Some(vec![Some(0), Some(5), Some(20)]));
//! ```

pub mod engine;
pub mod sweep;
