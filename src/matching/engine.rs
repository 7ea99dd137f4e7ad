use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::core::genotype_index::{Genotype, MAX_ALLELE_INDEX};
use crate::core::types::{MatchCategory, MissingValues, Ploidy};
use crate::core::variant::{ConfidenceRecord, PanelVariant};
use crate::matching::sweep::{IntervalSweep, SweepError};
use crate::parsing::vcf::ParseError;

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error(transparent)]
    Sweep(#[from] SweepError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("failed to write output record")]
    Write(#[source] std::io::Error),
}

/// Reconciliation of one panel site
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub chrom: String,
    /// 0-based start of the panel site
    pub start: u64,
    pub id: Option<String>,
    pub reference: String,
    pub alternate: String,
    pub category: MatchCategory,
    /// Ploidy the genotype and likelihoods are reported in
    pub ploidy: Ploidy,
    /// Reduced genotype (`0` = panel REF, `1` = panel ALT), `None` when missing
    pub genotype: Option<Genotype>,
    /// Biallelic likelihoods, `None` when missing. A `None` entry is a
    /// likelihood the gVCF record does not provide.
    pub likelihoods: Option<Vec<Option<i32>>>,
    /// gVCF quality, only for `var`
    pub quality: Option<f32>,
}

impl MatchResult {
    /// 1-based VCF position
    #[must_use]
    pub fn position(&self) -> u64 {
        self.start + 1
    }
}

/// Engine toggles.
///
/// The default is the reference behaviour. [`EngineConfig::legacy`] reproduces
/// the older single-tag engine, which is deprecated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Report haploid calls as haploid; when off they are restated as
    /// homozygous diploid calls
    pub ploidy_aware: bool,
    /// Reject variant genotypes whose called alleles have zero read depth
    pub depth_check: bool,
    /// Rendering of missing genotypes and likelihoods
    pub missing: MissingValues,
    /// Report `npa` and `pra` as `err` (legacy tag set)
    pub collapse_errors: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ploidy_aware: true,
            depth_check: true,
            missing: MissingValues::default(),
            collapse_errors: false,
        }
    }
}

impl EngineConfig {
    /// Settings of the deprecated single-tag engine
    #[must_use]
    pub fn legacy() -> Self {
        Self {
            ploidy_aware: false,
            depth_check: false,
            missing: MissingValues {
                gt_zero: true,
                pl_zero: true,
            },
            collapse_errors: true,
        }
    }
}

/// Per-category counts for a region or a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegionSummary {
    pub sites: u64,
    pub categories: BTreeMap<MatchCategory, u64>,
}

impl RegionSummary {
    pub fn record(&mut self, category: MatchCategory) {
        self.sites += 1;
        *self.categories.entry(category).or_default() += 1;
    }

    #[must_use]
    pub fn count(&self, category: MatchCategory) -> u64 {
        self.categories.get(&category).copied().unwrap_or_default()
    }

    pub fn merge(&mut self, other: &Self) {
        self.sites += other.sites;
        for (category, count) in &other.categories {
            *self.categories.entry(*category).or_default() += count;
        }
    }
}

/// Outcome of the decision table before it is attached to the panel site
struct Call {
    category: MatchCategory,
    genotype: Option<Genotype>,
    likelihoods: Option<Vec<Option<i32>>>,
    quality: Option<f32>,
}

impl Call {
    fn missing(category: MatchCategory) -> Self {
        Self {
            category,
            genotype: None,
            likelihoods: None,
            quality: None,
        }
    }

    /// Restate a haploid call over the diploid genotypes `0/0, 0/1, 1/1`.
    ///
    /// A haploid record has no heterozygous likelihood, so that slot is missing.
    fn into_diploid(self) -> Self {
        let likelihoods = self.likelihoods.map(|pl| {
            if pl.len() == 2 {
                vec![pl[0], None, pl[1]]
            } else {
                pl
            }
        });
        Self {
            genotype: self.genotype.map(Genotype::to_diploid),
            likelihoods,
            ..self
        }
    }
}

/// Classifies panel sites against their enclosing gVCF records
#[derive(Debug, Clone, Default)]
pub struct ReconciliationEngine {
    config: EngineConfig,
}

impl ReconciliationEngine {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Classify a panel site against the gVCF record enclosing it
    #[must_use]
    pub fn classify(&self, panel: &PanelVariant, record: &ConfidenceRecord) -> MatchResult {
        // The record is always read in its own ploidy; only the report is restated
        let native = record.ploidy();
        let ploidy = if self.config.ploidy_aware {
            native
        } else {
            Ploidy::Diploid
        };

        let mut call = self.decide(panel, record, native);
        if ploidy != native {
            call = call.into_diploid();
        }
        if self.config.collapse_errors
            && matches!(call.category, MatchCategory::Npa | MatchCategory::Pra)
        {
            call.category = MatchCategory::Err;
        }

        MatchResult {
            chrom: panel.chrom.clone(),
            start: panel.start,
            id: panel.id.clone(),
            reference: panel.reference.clone(),
            alternate: panel.alternate.clone(),
            category: call.category,
            ploidy,
            genotype: call.genotype,
            likelihoods: call.likelihoods,
            quality: call.quality,
        }
    }

    fn decide(&self, panel: &PanelVariant, record: &ConfidenceRecord, ploidy: Ploidy) -> Call {
        if record.likelihoods.is_none() {
            return Call::missing(MatchCategory::Mpl);
        }

        // The block's sentinel allele stands in for the panel alternate at index 1
        if record.is_reference_block() {
            return Call {
                category: MatchCategory::Ref,
                genotype: Some(Genotype::hom_ref(ploidy)),
                likelihoods: biallelic_likelihoods(record, ploidy, 1),
                quality: None,
            };
        }

        let Some(alt) = record.matching_alternate(panel) else {
            return Call::missing(MatchCategory::Pra);
        };
        if alt > MAX_ALLELE_INDEX {
            return Call::missing(MatchCategory::Npa);
        }

        let reduced = Genotype::from_alleles(&record.genotype)
            .filter(|gt| gt.ploidy() == ploidy)
            .and_then(|gt| gt.reduce(alt));
        let Some(reduced) = reduced else {
            return Call::missing(MatchCategory::Npa);
        };

        if self.config.depth_check && !depth_supports(record, &reduced, alt) {
            return Call::missing(MatchCategory::Err);
        }

        Call {
            category: MatchCategory::Var,
            genotype: Some(reduced),
            likelihoods: biallelic_likelihoods(record, ploidy, alt),
            quality: record.quality,
        }
    }

    /// Reconcile one region, calling `emit` for each panel site in order.
    ///
    /// Stops at the first sweep failure or emit failure; a region is never
    /// partially skipped.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::Sweep` if a site is not enclosed by a gVCF
    /// record or the panel is unsorted, `ReconcileError::Parse` for malformed
    /// records, and `ReconcileError::Write` if `emit` fails.
    pub fn reconcile<P, C, F>(
        &self,
        panel: P,
        confidence: C,
        mut emit: F,
    ) -> Result<RegionSummary, ReconcileError>
    where
        P: IntoIterator<Item = Result<PanelVariant, ParseError>>,
        C: IntoIterator<Item = Result<ConfidenceRecord, ParseError>>,
        F: FnMut(&MatchResult) -> std::io::Result<()>,
    {
        let mut summary = RegionSummary::default();
        let mut panel = panel.into_iter().peekable();

        // Nothing to pair: do not read the gVCF at all
        if panel.peek().is_none() {
            return Ok(summary);
        }

        let mut sweep = IntervalSweep::new(confidence.into_iter())?;
        for site in panel {
            let site = site?;
            let record = sweep.advance_to(&site.chrom, site.start)?;
            let result = self.classify(&site, record);

            if result.category.is_missing() {
                debug!(
                    chrom = %result.chrom,
                    pos = result.position(),
                    category = %result.category,
                    "Panel site not genotyped"
                );
            }

            emit(&result).map_err(ReconcileError::Write)?;
            summary.record(result.category);
        }

        Ok(summary)
    }
}

/// Likelihoods of `[0, alt]` or `[0/0, 0/alt, alt/alt]`; entries the record
/// lacks are `None`
fn biallelic_likelihoods(
    record: &ConfidenceRecord,
    ploidy: Ploidy,
    alt: usize,
) -> Option<Vec<Option<i32>>> {
    let set = Genotype::biallelic_set(ploidy, alt)?;
    Some(set.iter().map(|gt| record.likelihood(gt)).collect())
}

/// A called allele with zero depth contradicts the call; absent depths do not
fn depth_supports(record: &ConfidenceRecord, reduced: &Genotype, alt: usize) -> bool {
    let unsupported = |reduced_allele: u8, allele: usize| {
        reduced.contains(reduced_allele) && record.depth(allele) == Some(0)
    };
    !(unsupported(0, 0) || unsupported(1, alt))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> PanelVariant {
        PanelVariant::new("chr1", 99, "A", "G").with_id("rs100")
    }

    fn variant(alts: &[&str], gt: &[usize], ad: &[u32], pl: &[i32]) -> ConfidenceRecord {
        ConfidenceRecord::new("chr1", 99, 100, "A")
            .with_alternates(alts.iter().copied())
            .with_quality(87.456)
            .with_genotype(gt)
            .with_allele_depths(ad)
            .with_likelihoods(pl)
    }

    fn pl(values: &[i32]) -> Option<Vec<Option<i32>>> {
        Some(values.iter().copied().map(Some).collect())
    }

    fn classify(record: &ConfidenceRecord) -> MatchResult {
        ReconciliationEngine::default().classify(&site(), record)
    }

    #[test]
    fn test_reference_block() {
        let block = ConfidenceRecord::new("chr1", 49, 200, "C")
            .with_alternates(["<NON_REF>"])
            .with_genotype(&[0, 0])
            .with_likelihoods(&[0, 5, 20]);

        let result = classify(&block);
        assert_eq!(result.category, MatchCategory::Ref);
        assert_eq!(result.genotype, Some(Genotype::Diploid(0, 0)));
        assert_eq!(result.likelihoods, pl(&[0, 5, 20]));
        assert_eq!(result.quality, None);
        assert_eq!(result.position(), 100);
        assert_eq!(result.id.as_deref(), Some("rs100"));
    }

    #[test]
    fn test_haploid_reference_block() {
        let block = ConfidenceRecord::new("chrX", 49, 200, "C")
            .with_alternates(["<*>"])
            .with_genotype(&[0])
            .with_likelihoods(&[0, 45]);
        let panel = PanelVariant::new("chrX", 99, "A", "G");

        let result = ReconciliationEngine::default().classify(&panel, &block);
        assert_eq!(result.category, MatchCategory::Ref);
        assert_eq!(result.ploidy, Ploidy::Haploid);
        assert_eq!(result.genotype, Some(Genotype::Haploid(0)));
        assert_eq!(result.likelihoods, pl(&[0, 45]));
    }

    #[test]
    fn test_hom_alt_variant() {
        let pls = [400, 30, 0, 400, 30, 400];
        let record = variant(&["G", "<NON_REF>"], &[1, 1], &[0, 10, 0], &pls);
        let result = classify(&record);
        assert_eq!(result.category, MatchCategory::Var);
        assert_eq!(result.genotype, Some(Genotype::Diploid(1, 1)));
        assert_eq!(result.likelihoods, pl(&[400, 30, 0]));
        assert_eq!(result.quality, Some(87.456));
    }

    #[test]
    fn test_variant_with_panel_alt_second() {
        // Panel G is allele 2: likelihoods come from 0/0, 0/2, 2/2
        let record = variant(&["T", "G"], &[0, 2], &[5, 0, 6], &[90, 80, 70, 10, 60, 50]);
        let result = classify(&record);
        assert_eq!(result.category, MatchCategory::Var);
        assert_eq!(result.genotype, Some(Genotype::Diploid(0, 1)));
        assert_eq!(result.likelihoods, pl(&[90, 10, 50]));
    }

    #[test]
    fn test_hom_ref_call_at_variant_site() {
        let record = variant(&["G"], &[0, 0], &[12, 0], &[0, 36, 400]);
        let result = classify(&record);
        assert_eq!(result.category, MatchCategory::Var);
        assert_eq!(result.genotype, Some(Genotype::Diploid(0, 0)));
    }

    #[test]
    fn test_haploid_variant() {
        let record = variant(&["G", "<NON_REF>"], &[1], &[0, 8, 0], &[200, 0, 200]);
        let result = classify(&record);
        assert_eq!(result.category, MatchCategory::Var);
        assert_eq!(result.ploidy, Ploidy::Haploid);
        assert_eq!(result.genotype, Some(Genotype::Haploid(1)));
        assert_eq!(result.likelihoods, pl(&[200, 0]));
    }

    #[test]
    fn test_two_distinct_alts_is_npa() {
        let record = variant(&["G", "T"], &[1, 2], &[0, 5, 5], &[400, 300, 300, 300, 0, 300]);
        let result = classify(&record);
        assert_eq!(result.category, MatchCategory::Npa);
        assert_eq!(result.genotype, None);
        assert_eq!(result.likelihoods, None);
        assert_eq!(result.quality, None);
    }

    #[test]
    fn test_non_panel_alt_favoured_is_npa() {
        let record = variant(&["T", "G"], &[0, 1], &[5, 5, 0], &[90, 0, 70, 10, 60, 50]);
        assert_eq!(classify(&record).category, MatchCategory::Npa);
    }

    #[test]
    fn test_no_call_is_npa() {
        let mut record = variant(&["G"], &[0, 0], &[0, 0], &[0, 0, 0]);
        record.genotype = vec![None, None];
        assert_eq!(classify(&record).category, MatchCategory::Npa);
    }

    #[test]
    fn test_alt_index_beyond_table_is_npa() {
        let alts = ["C", "T", "AA", "AC", "AT", "CC", "G"];
        let record = variant(&alts, &[0, 0], &[10, 0, 0, 0, 0, 0, 0, 0], &[0; 36]);
        assert_eq!(classify(&record).category, MatchCategory::Npa);
    }

    #[test]
    fn test_zero_depth_is_err() {
        // Het call but no reads for the alternate
        let record = variant(&["G"], &[0, 1], &[10, 0], &[30, 0, 300]);
        let result = classify(&record);
        assert_eq!(result.category, MatchCategory::Err);
        assert_eq!(result.genotype, None);

        let lax = ReconciliationEngine::new(EngineConfig {
            depth_check: false,
            ..EngineConfig::default()
        });
        assert_eq!(lax.classify(&site(), &record).category, MatchCategory::Var);
    }

    #[test]
    fn test_missing_depths_pass_depth_check() {
        let mut record = variant(&["G"], &[0, 1], &[], &[30, 0, 300]);
        record.allele_depths = None;
        assert_eq!(classify(&record).category, MatchCategory::Var);
    }

    #[test]
    fn test_ref_mismatch_is_pra() {
        let mut record = variant(&["G"], &[0, 1], &[5, 5], &[30, 0, 300]);
        record.reference = "T".to_string();
        assert_eq!(classify(&record).category, MatchCategory::Pra);
    }

    #[test]
    fn test_overlapping_deletion_is_pra() {
        let record = ConfidenceRecord::new("chr1", 97, 101, "CTAA")
            .with_alternates(["C", "<NON_REF>"])
            .with_genotype(&[0, 1])
            .with_likelihoods(&[30, 0, 300, 40, 310, 400]);
        assert_eq!(classify(&record).category, MatchCategory::Pra);
    }

    #[test]
    fn test_missing_likelihoods_is_mpl() {
        let mut record = variant(&["G"], &[1, 1], &[0, 10], &[]);
        record.likelihoods = None;
        assert_eq!(classify(&record).category, MatchCategory::Mpl);

        let block = ConfidenceRecord::new("chr1", 0, 1000, "N").with_alternates(["<NON_REF>"]);
        assert_eq!(classify(&block).category, MatchCategory::Mpl);
    }

    #[test]
    fn test_short_likelihoods_keep_category() {
        let block = ConfidenceRecord::new("chr1", 0, 1000, "N")
            .with_alternates(["<NON_REF>"])
            .with_genotype(&[0, 0])
            .with_likelihoods(&[0, 3]);
        let result = classify(&block);
        assert_eq!(result.category, MatchCategory::Ref);
        assert_eq!(result.likelihoods, Some(vec![Some(0), Some(3), None]));

        let mut record = variant(&["G"], &[0, 1], &[4, 6], &[50, 0, 60]);
        record.likelihoods = Some(vec![Some(50), None, Some(60)]);
        let result = classify(&record);
        assert_eq!(result.category, MatchCategory::Var);
        assert_eq!(result.likelihoods, Some(vec![Some(50), None, Some(60)]));
    }

    #[test]
    fn test_haploid_block_without_ploidy_awareness() {
        let block = ConfidenceRecord::new("chrX", 49, 200, "C")
            .with_alternates(["<NON_REF>"])
            .with_genotype(&[0])
            .with_likelihoods(&[0, 45]);
        let panel = PanelVariant::new("chrX", 99, "A", "G");
        let engine = ReconciliationEngine::new(EngineConfig {
            ploidy_aware: false,
            ..EngineConfig::default()
        });

        let result = engine.classify(&panel, &block);
        assert_eq!(result.category, MatchCategory::Ref);
        assert_eq!(result.ploidy, Ploidy::Diploid);
        assert_eq!(result.genotype, Some(Genotype::Diploid(0, 0)));
        assert_eq!(result.likelihoods, Some(vec![Some(0), None, Some(45)]));
    }

    #[test]
    fn test_diploid_call_unchanged_without_ploidy_awareness() {
        let engine = ReconciliationEngine::new(EngineConfig {
            ploidy_aware: false,
            ..EngineConfig::default()
        });
        let record = variant(&["G", "<NON_REF>"], &[0, 1], &[4, 6, 0], &[50, 0, 60, 70, 80, 90]);
        assert_eq!(engine.classify(&site(), &record), classify(&record));
    }

    #[test]
    fn test_legacy_config() {
        let legacy = ReconciliationEngine::new(EngineConfig::legacy());
        assert!(legacy.config().collapse_errors);
        assert!(!ReconciliationEngine::default().config().collapse_errors);

        let npa = variant(&["G", "T"], &[1, 2], &[0, 5, 5], &[400, 300, 300, 300, 0, 300]);
        assert_eq!(legacy.classify(&site(), &npa).category, MatchCategory::Err);

        let mut pra = variant(&["G"], &[0, 1], &[5, 5], &[30, 0, 300]);
        pra.reference = "T".to_string();
        assert_eq!(legacy.classify(&site(), &pra).category, MatchCategory::Err);

        // Zero-depth call accepted without the depth check
        let zero_depth = variant(&["G"], &[0, 1], &[10, 0], &[30, 0, 300]);
        assert_eq!(legacy.classify(&site(), &zero_depth).category, MatchCategory::Var);

        // Haploid calls are restated as homozygous diploid calls
        let haploid = variant(&["G"], &[1], &[0, 8], &[200, 0]);
        let result = legacy.classify(&site(), &haploid);
        assert_eq!(result.category, MatchCategory::Var);
        assert_eq!(result.ploidy, Ploidy::Diploid);
        assert_eq!(result.genotype, Some(Genotype::Diploid(1, 1)));
        assert_eq!(result.likelihoods, Some(vec![Some(200), None, Some(0)]));
    }

    #[test]
    fn test_reconcile_region() {
        let panel = vec![
            Ok(PanelVariant::new("chr1", 10, "A", "G")),
            Ok(PanelVariant::new("chr1", 99, "A", "G")),
            Ok(PanelVariant::new("chr1", 150, "C", "T")),
        ];
        let gvcf = vec![
            Ok(ConfidenceRecord::new("chr1", 0, 99, "N")
                .with_alternates(["<NON_REF>"])
                .with_likelihoods(&[0, 3, 30])),
            Ok(variant(&["G", "<NON_REF>"], &[0, 1], &[4, 6], &[50, 0, 60, 70, 80, 90])),
            Ok(ConfidenceRecord::new("chr1", 100, 300, "N")
                .with_alternates(["<NON_REF>"])
                .with_likelihoods(&[0, 6, 60])),
        ];

        let mut emitted = Vec::new();
        let summary = ReconciliationEngine::default()
            .reconcile(panel, gvcf, |r| {
                emitted.push(r.clone());
                Ok(())
            })
            .unwrap();

        let categories: Vec<MatchCategory> = emitted.iter().map(|r| r.category).collect();
        assert_eq!(
            categories,
            vec![MatchCategory::Ref, MatchCategory::Var, MatchCategory::Ref]
        );
        assert_eq!(emitted[2].likelihoods, pl(&[0, 6, 60]));
        assert_eq!(summary.sites, 3);
        assert_eq!(summary.count(MatchCategory::Ref), 2);
        assert_eq!(summary.count(MatchCategory::Var), 1);
        assert_eq!(summary.count(MatchCategory::Npa), 0);
    }

    #[test]
    fn test_reconcile_aborts_on_gap() {
        let panel = vec![
            Ok(PanelVariant::new("chr1", 10, "A", "G")),
            Ok(PanelVariant::new("chr1", 110, "C", "T")),
        ];
        let gvcf = vec![
            Ok(ConfidenceRecord::new("chr1", 0, 100, "N").with_alternates(["<NON_REF>"])),
            Ok(ConfidenceRecord::new("chr1", 120, 300, "N").with_alternates(["<NON_REF>"])),
            Ok(ConfidenceRecord::new("chr1", 300, 400, "N").with_alternates(["<NON_REF>"])),
        ];

        let mut emitted = 0;
        let result = ReconciliationEngine::default().reconcile(panel, gvcf, |_| {
            emitted += 1;
            Ok(())
        });
        assert!(matches!(
            result,
            Err(ReconcileError::Sweep(SweepError::NotEnclosed { .. }))
        ));
        assert_eq!(emitted, 1);
    }

    #[test]
    fn test_reconcile_empty_panel_skips_gvcf() {
        let panel: Vec<Result<PanelVariant, ParseError>> = Vec::new();
        let gvcf = std::iter::once_with(|| -> Result<ConfidenceRecord, ParseError> {
            panic!("gVCF should not be read")
        });
        let summary = ReconciliationEngine::default()
            .reconcile(panel, gvcf, |_| Ok(()))
            .unwrap();
        assert_eq!(summary, RegionSummary::default());
    }

    #[test]
    fn test_reconcile_stops_on_write_failure() {
        let panel = vec![
            Ok(PanelVariant::new("chr1", 10, "A", "G")),
            Ok(PanelVariant::new("chr1", 20, "A", "G")),
        ];
        let gvcf = vec![Ok(ConfidenceRecord::new("chr1", 0, 100, "N")
            .with_alternates(["<NON_REF>"])
            .with_likelihoods(&[0, 3, 30]))];

        let mut calls = 0;
        let result = ReconciliationEngine::default().reconcile(panel, gvcf, |_| {
            calls += 1;
            Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
        });
        assert!(matches!(result, Err(ReconcileError::Write(_))));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_reconcile_is_deterministic() {
        let run = || {
            let panel = vec![Ok(site())];
            let gvcf = vec![Ok(variant(&["G"], &[0, 1], &[4, 6], &[50, 0, 60]))];
            let mut out = Vec::new();
            ReconciliationEngine::default()
                .reconcile(panel, gvcf, |r| {
                    out.push(r.clone());
                    Ok(())
                })
                .unwrap();
            out
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_summary_merge() {
        let mut a = RegionSummary::default();
        a.record(MatchCategory::Ref);
        a.record(MatchCategory::Var);
        let mut b = RegionSummary::default();
        b.record(MatchCategory::Ref);
        b.record(MatchCategory::Mpl);

        a.merge(&b);
        assert_eq!(a.sites, 4);
        assert_eq!(a.count(MatchCategory::Ref), 2);
        assert_eq!(a.count(MatchCategory::Mpl), 1);
    }
}
