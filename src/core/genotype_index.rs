//! Genotype to likelihood-array offset mapping.
//!
//! VCF `PL` arrays enumerate genotypes in the "diagonal" order defined by the
//! VCF specification. For a diploid genotype `a/b` with `a <= b` the offset is
//! the triangular-number index `b * (b + 1) / 2 + a`:
//!
//! | Offset | 0   | 1   | 2   | 3   | 4   | 5   | 6   | ... |
//! |--------|-----|-----|-----|-----|-----|-----|-----|-----|
//! | GT     | 0/0 | 0/1 | 1/1 | 0/2 | 1/2 | 2/2 | 0/3 | ... |
//!
//! Haploid genotypes map to their allele index. Allele indices are limited to
//! `0..=6` (seven alleles, 28 diploid genotypes); anything larger is rejected
//! when constructing a [`Genotype`].

use std::fmt;

use crate::core::types::Ploidy;

/// Largest allele index the offset tables cover
pub const MAX_ALLELE_INDEX: usize = 6;

/// Number of distinct alleles the offset tables cover
pub const ALLELE_COUNT: usize = MAX_ALLELE_INDEX + 1;

/// Number of unordered diploid genotypes over [`ALLELE_COUNT`] alleles
pub const DIPLOID_GENOTYPE_COUNT: usize = ALLELE_COUNT * (ALLELE_COUNT + 1) / 2;

/// Offset of the diploid genotype `a/b` (requires `a <= b`)
#[must_use]
pub const fn diploid_offset(a: usize, b: usize) -> usize {
    b * (b + 1) / 2 + a
}

const fn build_diploid_offsets() -> [[u8; ALLELE_COUNT]; ALLELE_COUNT] {
    let mut table = [[0u8; ALLELE_COUNT]; ALLELE_COUNT];
    let mut a = 0;
    while a < ALLELE_COUNT {
        let mut b = 0;
        while b < ALLELE_COUNT {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            #[allow(clippy::cast_possible_truncation)] // max offset is 27
            {
                table[a][b] = diploid_offset(lo, hi) as u8;
            }
            b += 1;
        }
        a += 1;
    }
    table
}

/// `PL` offsets for every ordered pair of allele indices
pub const DIPLOID_OFFSETS: [[u8; ALLELE_COUNT]; ALLELE_COUNT] = build_diploid_offsets();

/// An unordered genotype whose alleles are all within the offset tables.
///
/// Diploid alleles are stored sorted so `1/0` and `0|1` are the same genotype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Genotype {
    Haploid(u8),
    Diploid(u8, u8),
}

impl Genotype {
    /// Build a haploid genotype, or `None` if the allele is out of range
    #[must_use]
    pub fn haploid(allele: usize) -> Option<Self> {
        to_index(allele).map(Self::Haploid)
    }

    /// Build a diploid genotype from alleles in either order
    #[must_use]
    pub fn diploid(a: usize, b: usize) -> Option<Self> {
        let (a, b) = (to_index(a)?, to_index(b)?);
        Some(if a <= b {
            Self::Diploid(a, b)
        } else {
            Self::Diploid(b, a)
        })
    }

    /// Build a genotype from called alleles.
    ///
    /// Returns `None` for no-calls (`.`), ploidies other than one or two,
    /// and allele indices beyond [`MAX_ALLELE_INDEX`].
    #[must_use]
    pub fn from_alleles(alleles: &[Option<usize>]) -> Option<Self> {
        match alleles {
            [Some(a)] => Self::haploid(*a),
            [Some(a), Some(b)] => Self::diploid(*a, *b),
            _ => None,
        }
    }

    /// Homozygous-reference genotype for a ploidy
    #[must_use]
    pub fn hom_ref(ploidy: Ploidy) -> Self {
        match ploidy {
            Ploidy::Haploid => Self::Haploid(0),
            Ploidy::Diploid => Self::Diploid(0, 0),
        }
    }

    #[must_use]
    pub fn ploidy(&self) -> Ploidy {
        match self {
            Self::Haploid(_) => Ploidy::Haploid,
            Self::Diploid(..) => Ploidy::Diploid,
        }
    }

    /// Linear offset of this genotype in a `PL` array
    #[must_use]
    pub fn likelihood_index(&self) -> usize {
        match *self {
            Self::Haploid(a) => usize::from(a),
            Self::Diploid(a, b) => usize::from(DIPLOID_OFFSETS[usize::from(a)][usize::from(b)]),
        }
    }

    #[must_use]
    pub fn contains(&self, allele: u8) -> bool {
        match *self {
            Self::Haploid(a) => a == allele,
            Self::Diploid(a, b) => a == allele || b == allele,
        }
    }

    /// Reduce to a biallelic genotype against one distinguished alternate.
    ///
    /// The reference stays `0` and `alt` becomes `1`. Any other allele makes
    /// the genotype irreducible and yields `None`.
    #[must_use]
    pub fn reduce(&self, alt: usize) -> Option<Self> {
        let alt = to_index(alt).filter(|&a| a > 0)?;
        let recode = |allele: u8| match allele {
            0 => Some(0),
            a if a == alt => Some(1),
            _ => None,
        };

        match *self {
            Self::Haploid(a) => recode(a).map(Self::Haploid),
            Self::Diploid(a, b) => Some(Self::Diploid(recode(a)?, recode(b)?)),
        }
    }

    /// Restate a haploid genotype as its homozygous diploid equivalent (`a` to `a/a`)
    #[must_use]
    pub fn to_diploid(self) -> Self {
        match self {
            Self::Haploid(a) => Self::Diploid(a, a),
            diploid @ Self::Diploid(..) => diploid,
        }
    }

    /// The genotypes whose likelihoods are reported for a biallelic site,
    /// ordered as a biallelic `PL` array: `[0, alt]` or `[0/0, 0/alt, alt/alt]`.
    #[must_use]
    pub fn biallelic_set(ploidy: Ploidy, alt: usize) -> Option<Vec<Self>> {
        match ploidy {
            Ploidy::Haploid => Some(vec![Self::haploid(0)?, Self::haploid(alt)?]),
            Ploidy::Diploid => Some(vec![
                Self::diploid(0, 0)?,
                Self::diploid(0, alt)?,
                Self::diploid(alt, alt)?,
            ]),
        }
    }
}

impl fmt::Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Haploid(a) => write!(f, "{a}"),
            Self::Diploid(a, b) => write!(f, "{a}/{b}"),
        }
    }
}

fn to_index(allele: usize) -> Option<u8> {
    if allele <= MAX_ALLELE_INDEX {
        u8::try_from(allele).ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_diploid_offsets_are_a_bijection() {
        let mut seen = HashSet::new();
        for b in 0..ALLELE_COUNT {
            for a in 0..=b {
                let gt = Genotype::diploid(a, b).unwrap();
                assert!(seen.insert(gt.likelihood_index()), "collision at {gt}");
            }
        }
        assert_eq!(seen.len(), DIPLOID_GENOTYPE_COUNT);
        assert_eq!(seen, (0..28).collect::<HashSet<_>>());
    }

    #[test]
    fn test_haploid_offsets_are_a_bijection() {
        let offsets: Vec<usize> = (0..ALLELE_COUNT)
            .map(|a| Genotype::haploid(a).unwrap().likelihood_index())
            .collect();
        assert_eq!(offsets, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn test_known_offsets() {
        assert_eq!(Genotype::diploid(0, 0).unwrap().likelihood_index(), 0);
        assert_eq!(Genotype::diploid(0, 1).unwrap().likelihood_index(), 1);
        assert_eq!(Genotype::diploid(1, 1).unwrap().likelihood_index(), 2);
        assert_eq!(Genotype::diploid(0, 2).unwrap().likelihood_index(), 3);
        assert_eq!(Genotype::diploid(1, 2).unwrap().likelihood_index(), 4);
        assert_eq!(Genotype::diploid(3, 4).unwrap().likelihood_index(), 13);
        assert_eq!(Genotype::diploid(6, 6).unwrap().likelihood_index(), 27);
    }

    #[test]
    fn test_offset_table_is_symmetric() {
        for a in 0..ALLELE_COUNT {
            for b in a..ALLELE_COUNT {
                assert_eq!(DIPLOID_OFFSETS[a][b], DIPLOID_OFFSETS[b][a]);
                assert_eq!(usize::from(DIPLOID_OFFSETS[a][b]), diploid_offset(a, b));
            }
        }
    }

    #[test]
    fn test_diploid_is_unordered() {
        assert_eq!(Genotype::diploid(2, 0), Genotype::diploid(0, 2));
        assert_eq!(Genotype::diploid(2, 0), Some(Genotype::Diploid(0, 2)));
    }

    #[test]
    fn test_out_of_range_alleles_rejected() {
        assert!(Genotype::haploid(7).is_none());
        assert!(Genotype::diploid(0, 7).is_none());
        assert!(Genotype::from_alleles(&[Some(7), Some(7)]).is_none());
    }

    #[test]
    fn test_from_alleles() {
        assert_eq!(Genotype::from_alleles(&[Some(1)]), Some(Genotype::Haploid(1)));
        assert_eq!(
            Genotype::from_alleles(&[Some(1), Some(0)]),
            Some(Genotype::Diploid(0, 1))
        );
        assert!(Genotype::from_alleles(&[None, None]).is_none());
        assert!(Genotype::from_alleles(&[Some(0), None]).is_none());
        assert!(Genotype::from_alleles(&[Some(0), Some(0), Some(1)]).is_none());
        assert!(Genotype::from_alleles(&[]).is_none());
    }

    #[test]
    fn test_reduce_against_alt() {
        let reduce = |a, b, alt| Genotype::diploid(a, b).unwrap().reduce(alt);

        assert_eq!(reduce(0, 0, 2), Some(Genotype::Diploid(0, 0)));
        assert_eq!(reduce(0, 2, 2), Some(Genotype::Diploid(0, 1)));
        assert_eq!(reduce(2, 2, 2), Some(Genotype::Diploid(1, 1)));
        assert_eq!(reduce(0, 1, 2), None);
        assert_eq!(reduce(1, 2, 2), None);
        assert_eq!(reduce(1, 2, 1), None);
    }

    #[test]
    fn test_reduce_haploid() {
        assert_eq!(Genotype::Haploid(0).reduce(3), Some(Genotype::Haploid(0)));
        assert_eq!(Genotype::Haploid(3).reduce(3), Some(Genotype::Haploid(1)));
        assert_eq!(Genotype::Haploid(2).reduce(3), None);
    }

    #[test]
    fn test_reduce_rejects_invalid_alt() {
        assert_eq!(Genotype::Diploid(0, 0).reduce(0), None);
        assert_eq!(Genotype::Diploid(0, 0).reduce(7), None);
    }

    #[test]
    fn test_to_diploid() {
        assert_eq!(Genotype::Haploid(1).to_diploid(), Genotype::Diploid(1, 1));
        assert_eq!(Genotype::Haploid(0).to_diploid(), Genotype::Diploid(0, 0));
        assert_eq!(Genotype::Diploid(0, 1).to_diploid(), Genotype::Diploid(0, 1));
    }

    #[test]
    fn test_biallelic_set() {
        let set = Genotype::biallelic_set(Ploidy::Diploid, 2).unwrap();
        let offsets: Vec<usize> = set.iter().map(Genotype::likelihood_index).collect();
        assert_eq!(offsets, vec![0, 3, 5]);

        let set = Genotype::biallelic_set(Ploidy::Haploid, 2).unwrap();
        let offsets: Vec<usize> = set.iter().map(Genotype::likelihood_index).collect();
        assert_eq!(offsets, vec![0, 2]);

        assert!(Genotype::biallelic_set(Ploidy::Diploid, 7).is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(Genotype::Diploid(0, 1).to_string(), "0/1");
        assert_eq!(Genotype::Haploid(1).to_string(), "1");
        assert_eq!(Genotype::hom_ref(Ploidy::Diploid).to_string(), "0/0");
        assert_eq!(Genotype::hom_ref(Ploidy::Haploid).to_string(), "0");
    }
}
