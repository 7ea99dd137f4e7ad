//! Parser for the parts of VCF text the reconciliation engine touches.
//!
//! Headers are validated with noodles and their `##contig` lines and sample
//! names extracted. Record lines are split into the fixed columns plus the
//! `GT`, `AD` and `PL` values of the first sample; nothing else is decoded.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::region::{Region, RegionError};
use crate::core::variant::{ConfidenceRecord, PanelVariant};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid VCF header: {0}")]
    InvalidHeader(String),

    #[error("noodles error: {0}")]
    Noodles(String),

    #[error("Invalid VCF record at line {line}: {message}")]
    InvalidRecord { line: usize, message: String },

    #[error("Invalid VCF record in region {region}: {message}")]
    InvalidRecordInRegion { region: String, message: String },

    #[error("Failed to read index {}: {source}", .path.display())]
    Index {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Region(#[from] RegionError),
}

impl ParseError {
    fn record(line: usize, message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn index(path: &Path, source: std::io::Error) -> Self {
        Self::Index {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// The header fields carried through to the output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputHeader {
    /// Verbatim `##contig=<...>` lines
    pub contig_lines: Vec<String>,
    /// Contig IDs in declaration order
    pub contig_names: Vec<String>,
    pub sample_names: Vec<String>,
    /// Number of lines the header occupies
    pub line_count: usize,
}

/// Read header lines up to and including `#CHROM`, leaving `reader` at the first record
///
/// # Errors
///
/// Returns `ParseError::Io` on read failure or any header validation error
/// from [`parse_header_text`].
pub fn read_header<R: BufRead>(reader: &mut R) -> Result<InputHeader, ParseError> {
    let mut text = String::new();
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        if !line.starts_with('#') {
            return Err(ParseError::InvalidHeader(
                "record found before #CHROM line".to_string(),
            ));
        }
        text.push_str(&line);
        if line.starts_with("#CHROM") {
            break;
        }
    }
    parse_header_text(&text)
}

/// Parse VCF header text
///
/// # Errors
///
/// Returns `ParseError::InvalidHeader` if the `#CHROM` line is missing and
/// `ParseError::Noodles` if noodles rejects the header.
pub fn parse_header_text(text: &str) -> Result<InputHeader, ParseError> {
    if !text.lines().any(|l| l.starts_with("#CHROM")) {
        return Err(ParseError::InvalidHeader("missing #CHROM line".to_string()));
    }

    let header = text
        .parse::<noodles::vcf::Header>()
        .map_err(|e| ParseError::Noodles(e.to_string()))?;

    let contig_lines = text
        .lines()
        .filter(|l| l.starts_with("##contig="))
        .map(str::to_string)
        .collect();

    Ok(InputHeader {
        contig_lines,
        contig_names: header.contigs().keys().map(ToString::to_string).collect(),
        sample_names: header.sample_names().iter().map(ToString::to_string).collect(),
        line_count: text.lines().count(),
    })
}

/// A record type that can be read from a VCF body line and filtered by region
pub trait VcfRecord: Sized {
    /// Parse one tab-delimited body line
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidRecord` for malformed fields.
    fn from_line(line: &str, line_number: usize) -> Result<Self, ParseError>;

    fn chrom(&self) -> &str;

    /// 0-based start
    fn start(&self) -> u64;

    /// Whether this record belongs to a region query
    fn in_region(&self, region: &Region) -> bool;
}

/// Fixed columns shared by both record types
struct Columns<'a> {
    chrom: &'a str,
    start: u64,
    id: Option<&'a str>,
    reference: &'a str,
    alternates: Vec<&'a str>,
    quality: Option<f32>,
    info: &'a str,
    rest: &'a [&'a str],
}

fn split_columns<'a>(fields: &'a [&'a str], line_number: usize) -> Result<Columns<'a>, ParseError> {
    if fields.len() < 8 {
        return Err(ParseError::record(
            line_number,
            format!("expected at least 8 fields, got {}", fields.len()),
        ));
    }

    let pos: u64 = fields[1]
        .parse()
        .map_err(|_| ParseError::record(line_number, format!("invalid POS '{}'", fields[1])))?;
    if pos == 0 {
        return Err(ParseError::record(line_number, "POS must be 1-based"));
    }

    let quality = match fields[5] {
        "." => None,
        q => Some(
            q.parse()
                .map_err(|_| ParseError::record(line_number, format!("invalid QUAL '{q}'")))?,
        ),
    };

    Ok(Columns {
        chrom: fields[0],
        start: pos - 1,
        id: Some(fields[2]).filter(|id| *id != "."),
        reference: fields[3],
        alternates: match fields[4] {
            "." => Vec::new(),
            alts => alts.split(',').collect(),
        },
        quality,
        info: fields[7],
        rest: &fields[8..],
    })
}

impl VcfRecord for PanelVariant {
    fn from_line(line: &str, line_number: usize) -> Result<Self, ParseError> {
        let fields: Vec<&str> = line.split('\t').collect();
        let columns = split_columns(&fields, line_number)?;

        Ok(Self {
            chrom: columns.chrom.to_string(),
            start: columns.start,
            id: columns.id.map(str::to_string),
            reference: columns.reference.to_string(),
            alternate: columns.alternates.first().copied().unwrap_or(".").to_string(),
        })
    }

    fn chrom(&self) -> &str {
        &self.chrom
    }

    fn start(&self) -> u64 {
        self.start
    }

    // Sites are assigned to the region containing their start so that adjacent
    // regions never report the same site twice.
    fn in_region(&self, region: &Region) -> bool {
        region.contains(&self.chrom, self.start)
    }
}

impl VcfRecord for ConfidenceRecord {
    fn from_line(line: &str, line_number: usize) -> Result<Self, ParseError> {
        let fields: Vec<&str> = line.split('\t').collect();
        let columns = split_columns(&fields, line_number)?;

        let end = match info_end(columns.info, line_number)? {
            Some(end) => end,
            None => columns.start + columns.reference.len().max(1) as u64,
        };

        let mut record = Self::new(columns.chrom, columns.start, end, columns.reference);
        record.alternates = columns.alternates.iter().map(|a| (*a).to_string()).collect();
        record.quality = columns.quality;

        // FORMAT and the first sample column; trailing sample fields may be dropped
        if let [format, sample, ..] = columns.rest {
            let values: Vec<&str> = sample.split(':').collect();
            for (key, value) in format.split(':').zip(values) {
                match key {
                    "GT" => record.genotype = parse_genotype(value, line_number)?,
                    "AD" => record.allele_depths = parse_array(value, "AD", line_number)?,
                    "PL" => record.likelihoods = parse_array(value, "PL", line_number)?,
                    _ => {}
                }
            }
        }

        Ok(record)
    }

    fn chrom(&self) -> &str {
        &self.chrom
    }

    fn start(&self) -> u64 {
        self.start
    }

    fn in_region(&self, region: &Region) -> bool {
        region.overlaps(&self.chrom, self.start, self.end)
    }
}

/// `INFO/END`, which as a 1-based inclusive end equals the 0-based exclusive end
fn info_end(info: &str, line_number: usize) -> Result<Option<u64>, ParseError> {
    if info == "." {
        return Ok(None);
    }
    info.split(';')
        .find_map(|kv| kv.strip_prefix("END="))
        .map(|v| {
            v.parse()
                .map_err(|_| ParseError::record(line_number, format!("invalid INFO/END '{v}'")))
        })
        .transpose()
}

/// Parse a `GT` value such as `0/1`, `1|0`, `1` or `./.`
fn parse_genotype(gt: &str, line_number: usize) -> Result<Vec<Option<usize>>, ParseError> {
    if gt == "." {
        return Ok(vec![None, None]);
    }
    gt.split(['/', '|'])
        .map(|allele| match allele {
            "." => Ok(None),
            a => a.parse().map(Some).map_err(|_| {
                ParseError::record(line_number, format!("invalid GT allele '{a}'"))
            }),
        })
        .collect()
}

/// Parse a comma-separated numeric array; a lone `.` means the field is absent
fn parse_array<T: std::str::FromStr>(
    value: &str,
    key: &str,
    line_number: usize,
) -> Result<Option<Vec<Option<T>>>, ParseError> {
    if value == "." || value.is_empty() {
        return Ok(None);
    }
    value
        .split(',')
        .map(|v| match v {
            "." => Ok(None),
            v => v.parse().map(Some).map_err(|_| {
                ParseError::record(line_number, format!("invalid {key} value '{v}'"))
            }),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}
