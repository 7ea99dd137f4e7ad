use serde::{Deserialize, Serialize};

/// Number of genotype copies called at a site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ploidy {
    Haploid,
    Diploid,
}

impl Ploidy {
    /// Ploidy implied by the number of alleles in a `GT` value.
    ///
    /// Anything other than a single allele is treated as diploid.
    #[must_use]
    pub fn from_allele_count(count: usize) -> Self {
        if count == 1 {
            Self::Haploid
        } else {
            Self::Diploid
        }
    }
}

/// How a panel site relates to the gVCF record that encloses it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchCategory {
    /// Site falls inside a reference-confidence block
    Ref,
    /// Site matches a called variant with a trusted genotype
    Var,
    /// Site matches a called variant but the genotype is unsupported by allele depths
    Err,
    /// Enclosing record disagrees on position, reference or alternate allele
    Pra,
    /// Called genotype involves alleles other than the panel reference and alternate
    Npa,
    /// Enclosing record has no genotype likelihoods
    Mpl,
}

impl MatchCategory {
    pub const ALL: [Self; 6] = [
        Self::Ref,
        Self::Var,
        Self::Err,
        Self::Pra,
        Self::Npa,
        Self::Mpl,
    ];

    /// Tag written to the output record
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ref => "ref",
            Self::Var => "var",
            Self::Err => "err",
            Self::Pra => "pra",
            Self::Npa => "npa",
            Self::Mpl => "mpl",
        }
    }

    /// Whether the reported genotype and likelihoods are missing-value sentinels
    #[must_use]
    pub fn is_missing(&self) -> bool {
        !matches!(self, Self::Ref | Self::Var)
    }
}

impl std::fmt::Display for MatchCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rendering of genotypes and likelihoods that could not be determined
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingValues {
    /// Render missing genotypes as `0`/`0/0` instead of `.`/`./.`
    pub gt_zero: bool,
    /// Render missing likelihoods as `0,0`/`0,0,0` instead of `.`
    pub pl_zero: bool,
}

impl MissingValues {
    #[must_use]
    pub fn genotype(&self, ploidy: Ploidy) -> &'static str {
        match (self.gt_zero, ploidy) {
            (true, Ploidy::Haploid) => "0",
            (true, Ploidy::Diploid) => "0/0",
            (false, Ploidy::Haploid) => ".",
            (false, Ploidy::Diploid) => "./.",
        }
    }

    #[must_use]
    pub fn likelihoods(&self, ploidy: Ploidy) -> &'static str {
        match (self.pl_zero, ploidy) {
            (true, Ploidy::Haploid) => "0,0",
            (true, Ploidy::Diploid) => "0,0,0",
            (false, _) => ".",
        }
    }

    /// One likelihood that could not be derived inside an otherwise present `PL`
    #[must_use]
    pub fn likelihood_slot(&self) -> &'static str {
        if self.pl_zero { "0" } else { "." }
    }
}

/// Where the classification tag is written in each output record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagPlacement {
    /// Per-sample `FORMAT/GC` field
    #[default]
    Format,
    /// `INFO/VM` annotation
    Info,
}
