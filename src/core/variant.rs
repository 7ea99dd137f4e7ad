//! Records from the two input streams.
//!
//! Coordinates are 0-based and half-open throughout; the 1-based VCF `POS`
//! is only reconstructed when writing output.

use crate::core::genotype_index::Genotype;
use crate::core::types::Ploidy;

/// Symbols marking the alternate allele of a reference-confidence block
pub const NON_REF_SYMBOLS: [&str; 2] = ["<NON_REF>", "<*>"];

/// A candidate site from the reference panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelVariant {
    pub chrom: String,
    /// 0-based start
    pub start: u64,
    pub id: Option<String>,
    pub reference: String,
    /// The panel's alternate allele of interest (first ALT)
    pub alternate: String,
}

impl PanelVariant {
    pub fn new(
        chrom: impl Into<String>,
        start: u64,
        reference: impl Into<String>,
        alternate: impl Into<String>,
    ) -> Self {
        Self {
            chrom: chrom.into(),
            start,
            id: None,
            reference: reference.into(),
            alternate: alternate.into(),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// 1-based VCF position
    #[must_use]
    pub fn position(&self) -> u64 {
        self.start + 1
    }
}

/// One record from the per-sample gVCF: a variant call or a reference block
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceRecord {
    pub chrom: String,
    /// 0-based start
    pub start: u64,
    /// 0-based exclusive end
    pub end: u64,
    pub reference: String,
    pub alternates: Vec<String>,
    pub quality: Option<f32>,
    /// Called alleles from `GT`; `None` entries are no-calls. Empty when absent.
    pub genotype: Vec<Option<usize>>,
    /// `AD` values, indexed by allele
    pub allele_depths: Option<Vec<Option<u32>>>,
    /// `PL` values in VCF genotype order
    pub likelihoods: Option<Vec<Option<i32>>>,
}

impl ConfidenceRecord {
    pub fn new(
        chrom: impl Into<String>,
        start: u64,
        end: u64,
        reference: impl Into<String>,
    ) -> Self {
        Self {
            chrom: chrom.into(),
            start,
            end,
            reference: reference.into(),
            alternates: Vec::new(),
            quality: None,
            genotype: Vec::new(),
            allele_depths: None,
            likelihoods: None,
        }
    }

    #[must_use]
    pub fn with_alternates<S: Into<String>>(
        mut self,
        alternates: impl IntoIterator<Item = S>,
    ) -> Self {
        self.alternates = alternates.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_quality(mut self, quality: f32) -> Self {
        self.quality = Some(quality);
        self
    }

    #[must_use]
    pub fn with_genotype(mut self, alleles: &[usize]) -> Self {
        self.genotype = alleles.iter().copied().map(Some).collect();
        self
    }

    #[must_use]
    pub fn with_allele_depths(mut self, depths: &[u32]) -> Self {
        self.allele_depths = Some(depths.iter().copied().map(Some).collect());
        self
    }

    #[must_use]
    pub fn with_likelihoods(mut self, likelihoods: &[i32]) -> Self {
        self.likelihoods = Some(likelihoods.iter().copied().map(Some).collect());
        self
    }

    /// Whether the ALT column is exactly one non-reference sentinel
    #[must_use]
    pub fn is_reference_block(&self) -> bool {
        matches!(self.alternates.as_slice(), [alt] if NON_REF_SYMBOLS.contains(&alt.as_str()))
    }

    /// Whether `[start, end)` on `chrom` contains `position`
    #[must_use]
    pub fn encloses(&self, chrom: &str, position: u64) -> bool {
        self.chrom == chrom && self.start <= position && position < self.end
    }

    /// Ploidy of the call, from `GT` when present, otherwise from the `PL` length
    #[must_use]
    pub fn ploidy(&self) -> Ploidy {
        if !self.genotype.is_empty() {
            return Ploidy::from_allele_count(self.genotype.len());
        }
        match &self.likelihoods {
            Some(pl) if pl.len() == self.alternates.len() + 1 => Ploidy::Haploid,
            _ => Ploidy::Diploid,
        }
    }

    /// Allele index (1-based) of `alternate` in the ALT column
    #[must_use]
    pub fn alternate_index(&self, alternate: &str) -> Option<usize> {
        self.alternates
            .iter()
            .position(|a| a == alternate)
            .map(|i| i + 1)
    }

    /// Allele index of the panel alternate when position, REF and ALT all agree
    #[must_use]
    pub fn matching_alternate(&self, panel: &PanelVariant) -> Option<usize> {
        if self.chrom != panel.chrom
            || self.start != panel.start
            || self.reference != panel.reference
        {
            return None;
        }
        self.alternate_index(&panel.alternate)
    }

    /// Likelihood stored for a genotype, if the `PL` array has a value there
    #[must_use]
    pub fn likelihood(&self, genotype: &Genotype) -> Option<i32> {
        self.likelihoods
            .as_ref()?
            .get(genotype.likelihood_index())
            .copied()
            .flatten()
    }

    /// Read depth supporting an allele, if recorded
    #[must_use]
    pub fn depth(&self, allele: usize) -> Option<u32> {
        self.allele_depths.as_ref()?.get(allele).copied().flatten()
    }
}
