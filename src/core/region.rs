use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegionError {
    #[error("Empty region")]
    Empty,

    #[error("Invalid region '{0}': expected <chr>, <chr>:<beg> or <chr>:<beg>-<end>")]
    Invalid(String),

    #[error("Invalid region '{0}': start is greater than end")]
    Inverted(String),
}

/// A genomic query: a whole chromosome or a 1-based inclusive interval on one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub chrom: String,
    /// 0-based inclusive start
    pub start: u64,
    /// 0-based exclusive end, `None` for the end of the chromosome
    pub end: Option<u64>,
}

impl Region {
    /// A region spanning a whole chromosome
    pub fn whole(chrom: impl Into<String>) -> Self {
        Self {
            chrom: chrom.into(),
            start: 0,
            end: None,
        }
    }

    /// Parse a comma-separated list of region selectors
    ///
    /// # Errors
    ///
    /// Returns `RegionError` for the first selector that fails to parse.
    pub fn parse_list(s: &str) -> Result<Vec<Self>, RegionError> {
        s.split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::parse)
            .collect()
    }

    /// Whether a record spanning `[start, end)` on `chrom` overlaps this region
    #[must_use]
    pub fn overlaps(&self, chrom: &str, start: u64, end: u64) -> bool {
        chrom == self.chrom && end > self.start && self.end.map_or(true, |e| start < e)
    }

    /// Whether `position` on `chrom` lies inside this region
    #[must_use]
    pub fn contains(&self, chrom: &str, position: u64) -> bool {
        chrom == self.chrom && position >= self.start && self.end.map_or(true, |e| position < e)
    }

    /// Whether a record starting at `start` lies entirely past the region end
    #[must_use]
    pub fn is_past(&self, start: u64) -> bool {
        self.end.is_some_and(|e| start >= e)
    }
}

impl FromStr for Region {
    type Err = RegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(RegionError::Empty);
        }

        // Contig names may themselves contain ':', so split on the last one and
        // fall back to a whole-chromosome region if the suffix is not a range.
        let Some((chrom, range)) = s.rsplit_once(':') else {
            return Ok(Self::whole(s));
        };
        let Some((beg, end)) = parse_range(range) else {
            return Ok(Self::whole(s));
        };
        if chrom.is_empty() || beg == 0 {
            return Err(RegionError::Invalid(s.to_string()));
        }
        if end.is_some_and(|e| e < beg) {
            return Err(RegionError::Inverted(s.to_string()));
        }

        Ok(Self {
            chrom: chrom.to_string(),
            start: beg - 1,
            end,
        })
    }
}

/// Parse `beg` or `beg-end` (1-based, inclusive)
fn parse_range(range: &str) -> Option<(u64, Option<u64>)> {
    let clean = |v: &str| v.replace('_', "").parse::<u64>().ok();
    match range.split_once('-') {
        Some((beg, "")) => Some((clean(beg)?, None)),
        Some((beg, end)) => Some((clean(beg)?, Some(clean(end)?))),
        None => Some((clean(range)?, None)),
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.start, self.end) {
            (0, None) => write!(f, "{}", self.chrom),
            (start, None) => write!(f, "{}:{}", self.chrom, start + 1),
            (start, Some(end)) => write!(f, "{}:{}-{}", self.chrom, start + 1, end),
        }
    }
}
