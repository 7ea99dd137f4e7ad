//! Core data types for panel/gVCF reconciliation.
//!
//! - [`PanelVariant`](variant::PanelVariant): a candidate site from the reference panel
//! - [`ConfidenceRecord`](variant::ConfidenceRecord): a gVCF variant call or reference block
//! - [`Genotype`](genotype_index::Genotype): a genotype with its offset into a `PL` array
//! - [`MatchCategory`](types::MatchCategory), [`Ploidy`](types::Ploidy): classification types
//! - [`Region`](region::Region): a chromosome or interval selector
//!
//! ## Classification tags
//!
//! | Tag | Meaning |
//! |-----|---------|
//! | ref | site lies in a reference-confidence block |
//! | var | site matches a called variant |
//! | err | genotype contradicted by allele depths |
//! | pra | position, REF or ALT disagree |
//! | npa | genotype uses a non-panel allele |
//! | mpl | gVCF record has no `PL` |

pub mod genotype_index;
pub mod region;
pub mod types;
pub mod variant;
