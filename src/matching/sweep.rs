//! Two-pointer sweep pairing panel sites with their enclosing gVCF record.
//!
//! A gVCF covers every base with exactly one record, so for a non-decreasing
//! sequence of query positions the enclosing record is always either the
//! current one or some later one. The sweep keeps `current` and `lookahead`
//! and shifts forward while `lookahead` starts at or before the query.

use thiserror::Error;

use crate::core::variant::ConfidenceRecord;
use crate::parsing::vcf::ParseError;

#[derive(Error, Debug)]
pub enum SweepError {
    #[error("panel site {chrom}:{position} is not enclosed by a gVCF record (nearest record: {nearest}); the gVCF is not gap-free or not sorted")]
    NotEnclosed {
        chrom: String,
        /// 1-based
        position: u64,
        nearest: String,
    },

    #[error("panel site {chrom}:{position} comes before the previous site at {previous}; the panel is not sorted")]
    OutOfOrder {
        chrom: String,
        /// 1-based
        position: u64,
        /// 1-based
        previous: u64,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Sweep state over one region's gVCF records
pub struct IntervalSweep<I> {
    records: I,
    current: Option<ConfidenceRecord>,
    lookahead: Option<ConfidenceRecord>,
    exhausted: bool,
    last_position: Option<u64>,
}

impl<I> IntervalSweep<I>
where
    I: Iterator<Item = Result<ConfidenceRecord, ParseError>>,
{
    /// Prime the sweep by reading the first two records
    ///
    /// # Errors
    ///
    /// Returns `SweepError::Parse` if either record fails to parse.
    pub fn new(mut records: I) -> Result<Self, SweepError> {
        let current = records.next().transpose()?;
        let lookahead = records.next().transpose()?;
        let exhausted = lookahead.is_none();
        Ok(Self {
            records,
            current,
            lookahead,
            exhausted,
            last_position: None,
        })
    }

    /// Advance to the record enclosing `position` (0-based) on `chrom`.
    ///
    /// # Errors
    ///
    /// Returns `SweepError::OutOfOrder` if `position` is before the previous
    /// query, `SweepError::NotEnclosed` if no record encloses it, or
    /// `SweepError::Parse` if a gVCF record fails to parse.
    pub fn advance_to(
        &mut self,
        chrom: &str,
        position: u64,
    ) -> Result<&ConfidenceRecord, SweepError> {
        if let Some(previous) = self.last_position.filter(|&p| p > position) {
            return Err(SweepError::OutOfOrder {
                chrom: chrom.to_string(),
                position: position + 1,
                previous: previous + 1,
            });
        }
        self.last_position = Some(position);

        while !self.exhausted && self.lookahead.as_ref().is_some_and(|r| r.start <= position) {
            self.current = self.lookahead.take();
            self.lookahead = self.records.next().transpose()?;
            self.exhausted = self.lookahead.is_none();
        }

        match &self.current {
            Some(record) if record.encloses(chrom, position) => Ok(record),
            nearest => Err(SweepError::NotEnclosed {
                chrom: chrom.to_string(),
                position: position + 1,
                nearest: nearest.as_ref().map_or_else(
                    || "none".to_string(),
                    |r| format!("{}:{}-{}", r.chrom, r.start + 1, r.end),
                ),
            }),
        }
    }

    /// Whether the gVCF stream has been fully consumed
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}
