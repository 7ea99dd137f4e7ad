//! Region queries over plain or BGZF-compressed VCF files.
//!
//! A BGZF file with a tabix (`.tbi`) or CSI (`.csi`) index next to it is
//! queried by seeking to the first indexed chunk of the region. Anything else
//! is reopened and streamed from the first body line. Both inputs are
//! coordinate-sorted, so a query stops as soon as it leaves the region's
//! chromosome or passes the region's end.

use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use noodles::bgzf;
use noodles::core::region::Interval;
use noodles::core::Position;
use noodles::csi::{self, BinningIndex};
use noodles::tabix;
use tracing::debug;

use crate::core::region::Region;
use crate::parsing::vcf::{read_header, InputHeader, ParseError, VcfRecord};

/// Coordinate index of a BGZF-compressed VCF
#[derive(Debug, Clone)]
pub enum VcfIndex {
    Tabix(tabix::Index),
    Csi(csi::Index),
}

impl VcfIndex {
    /// Load `<path>.tbi` or, failing that, `<path>.csi`
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Index` if an index file exists but cannot be read.
    pub fn locate(path: &Path) -> Result<Option<Self>, ParseError> {
        let tbi = with_suffix(path, ".tbi");
        if tbi.is_file() {
            let index = tabix::read(&tbi).map_err(|e| ParseError::index(&tbi, e))?;
            return Ok(Some(Self::Tabix(index)));
        }

        let csi = with_suffix(path, ".csi");
        if csi.is_file() {
            let index = csi::read(&csi).map_err(|e| ParseError::index(&csi, e))?;
            return Ok(Some(Self::Csi(index)));
        }

        Ok(None)
    }

    /// Reference sequence names in index order
    #[must_use]
    pub fn chromosomes(&self) -> Vec<String> {
        let Some(header) = self.binning_index().header() else {
            return Vec::new();
        };
        header
            .reference_sequence_names()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    /// Virtual position of the earliest chunk overlapping `region`, `None`
    /// when the index holds no records there
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Io` if the index cannot answer the query.
    pub fn first_chunk_start(
        &self,
        region: &Region,
    ) -> Result<Option<bgzf::VirtualPosition>, ParseError> {
        let index = self.binning_index();
        let Some(header) = index.header() else {
            return Ok(None);
        };
        let Some(id) = header
            .reference_sequence_names()
            .iter()
            .position(|name| *name == region.chrom.as_str())
        else {
            return Ok(None);
        };

        let chunks = index.query(id, region_interval(region))?;
        Ok(chunks.iter().map(|chunk| chunk.start()).min())
    }

    fn binning_index(&self) -> &dyn BinningIndex {
        match self {
            Self::Tabix(index) => index,
            Self::Csi(index) => index,
        }
    }
}

/// 1-based closed interval for a 0-based half-open region
fn region_interval(region: &Region) -> Interval {
    let to_position = |n: u64| usize::try_from(n).ok().and_then(Position::new);
    let start = to_position(region.start + 1).unwrap_or(Position::MIN);
    match region.end {
        Some(end) => Interval::from(start..=to_position(end).unwrap_or(Position::MAX)),
        None => Interval::from(start..),
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// A VCF file whose header has been read, opened on demand for region queries
#[derive(Debug, Clone)]
pub struct VcfSource {
    path: PathBuf,
    header: InputHeader,
    index: Option<VcfIndex>,
}

impl VcfSource {
    /// Open a VCF file, read its header and load its index if it has one
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Io` if the file cannot be read, `ParseError::Index`
    /// for an unreadable index, or any header error from [`read_header`].
    pub fn open(path: &Path) -> Result<Self, ParseError> {
        let mut reader = open_reader(path)?;
        let header = read_header(&mut reader)?;
        let index = if is_bgzf(path) {
            VcfIndex::locate(path)?
        } else {
            None
        };
        debug!(
            path = %path.display(),
            contigs = header.contig_names.len(),
            samples = header.sample_names.len(),
            indexed = index.is_some(),
            "Read VCF header"
        );
        Ok(Self {
            path: path.to_path_buf(),
            header,
            index,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn header(&self) -> &InputHeader {
        &self.header
    }

    #[must_use]
    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    /// Stream the records of one region
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Io` if the file cannot be reopened or the indexed
    /// seek fails.
    pub fn query<T: VcfRecord>(
        &self,
        region: &Region,
    ) -> Result<RegionRecords<Box<dyn BufRead + Send>, T>, ParseError> {
        let Some(index) = &self.index else {
            let mut reader = open_reader(&self.path)?;
            skip_lines(&mut reader, self.header.line_count)?;
            return Ok(RegionRecords::new(reader, region.clone(), self.header.line_count));
        };

        let reader: Box<dyn BufRead + Send> = match index.first_chunk_start(region)? {
            Some(start) => {
                let mut reader = bgzf::Reader::new(File::open(&self.path)?);
                reader.seek(start)?;
                Box::new(reader)
            }
            None => Box::new(io::empty()),
        };
        Ok(RegionRecords::after_seek(reader, region.clone()))
    }

    /// Chromosomes in order of first appearance in the file body
    ///
    /// # Errors
    ///
    /// Returns `ParseError` on read failure or a line without a CHROM column.
    pub fn body_chromosomes(&self) -> Result<Vec<String>, ParseError> {
        if let Some(index) = &self.index {
            return Ok(index.chromosomes());
        }

        let mut reader = open_reader(&self.path)?;
        let mut chroms: Vec<String> = Vec::new();
        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }
            let chrom = line.split('\t').next().unwrap_or_default();
            if chroms.last().is_some_and(|c| c == chrom) {
                continue;
            }
            if !chroms.iter().any(|c| c == chrom) {
                chroms.push(chrom.to_string());
            }
        }
        Ok(chroms)
    }
}

fn is_bgzf(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "gz" || e == "bgz")
}

/// Open a file, decompressing BGZF when the name ends in `.gz` or `.bgz`
fn open_reader(path: &Path) -> Result<Box<dyn BufRead + Send>, ParseError> {
    let file = File::open(path)?;

    Ok(if is_bgzf(path) {
        Box::new(bgzf::Reader::new(file))
    } else {
        Box::new(BufReader::new(file))
    })
}

fn skip_lines<R: BufRead>(reader: &mut R, count: usize) -> Result<(), ParseError> {
    let mut line = Vec::new();
    for _ in 0..count {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
    }
    Ok(())
}

/// Records of one type from one region, in file order
pub struct RegionRecords<R, T> {
    reader: R,
    region: Region,
    line: String,
    /// Lines read so far; unknown after an indexed seek
    line_number: Option<usize>,
    seen_chrom: bool,
    done: bool,
    _record: PhantomData<T>,
}

impl<R: BufRead, T: VcfRecord> RegionRecords<R, T> {
    /// Wrap a reader positioned anywhere before the region's first record.
    ///
    /// `first_line_number` is the number of lines already consumed, used only
    /// for error messages.
    pub fn new(reader: R, region: Region, first_line_number: usize) -> Self {
        Self {
            line_number: Some(first_line_number),
            ..Self::after_seek(reader, region)
        }
    }

    /// Wrap a reader positioned by an index seek, at a record boundary.
    ///
    /// Malformed records are reported by region rather than line number.
    pub fn after_seek(reader: R, region: Region) -> Self {
        Self {
            reader,
            region,
            line: String::new(),
            line_number: None,
            seen_chrom: false,
            done: false,
            _record: PhantomData,
        }
    }

    fn next_record(&mut self) -> Result<Option<T>, ParseError> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            if let Some(n) = self.line_number.as_mut() {
                *n += 1;
            }

            let line = self.line.trim_end_matches(['\n', '\r']);
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            // Cheap chromosome check before parsing the whole line
            let chrom = line.split('\t').next().unwrap_or_default();
            if chrom != self.region.chrom {
                if self.seen_chrom {
                    return Ok(None);
                }
                continue;
            }
            self.seen_chrom = true;

            let parsed = T::from_line(line, self.line_number.unwrap_or_default());
            let record = match parsed {
                Err(ParseError::InvalidRecord { message, .. }) if self.line_number.is_none() => {
                    return Err(ParseError::InvalidRecordInRegion {
                        region: self.region.to_string(),
                        message,
                    });
                }
                other => other?,
            };
            if self.region.is_past(record.start()) {
                return Ok(None);
            }
            if record.in_region(&self.region) {
                return Ok(Some(record));
            }
        }
    }
}

impl<R: BufRead, T: VcfRecord> Iterator for RegionRecords<R, T> {
    type Item = Result<T, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let next = self.next_record().transpose();
        if !matches!(next, Some(Ok(_))) {
            self.done = true;
        }
        next
    }
}
