use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use noodles::bgzf;

use crate::core::types::{MatchCategory, MissingValues, TagPlacement};
use crate::matching::engine::MatchResult;

/// Destination of the output VCF
pub enum OutputSink {
    Stdout(io::StdoutLock<'static>),
    Plain(File),
    /// BGZF-compressed file; needs [`OutputSink::finish`] to write the EOF block
    Bgzf(bgzf::Writer<File>),
}

impl OutputSink {
    /// Open the sink: stdout for `None` or `-`, BGZF for `.gz`/`.bgz`, else a plain file
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn create(path: Option<&Path>) -> io::Result<Self> {
        let Some(path) = path.filter(|p| p.as_os_str() != "-") else {
            return Ok(Self::Stdout(io::stdout().lock()));
        };

        let file = File::create(path)?;
        let is_gzipped = path.extension().is_some_and(|e| e == "gz" || e == "bgz");

        Ok(if is_gzipped {
            Self::Bgzf(bgzf::Writer::new(file))
        } else {
            Self::Plain(file)
        })
    }

    /// Flush everything and, for BGZF, write the final block and EOF marker
    ///
    /// # Errors
    ///
    /// Returns the flush or final write error.
    pub fn finish(self) -> io::Result<()> {
        match self {
            Self::Stdout(mut w) => w.flush(),
            Self::Plain(mut w) => w.flush(),
            Self::Bgzf(w) => w.finish().map(|_| ()),
        }
    }

    /// Close without completing the stream; a BGZF file gets no EOF marker
    pub fn discard(self) {
        if let Self::Bgzf(w) = self {
            let _file = w.into_inner();
        }
    }
}

impl Write for OutputSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stdout(w) => w.write(buf),
            Self::Plain(w) => w.write(buf),
            Self::Bgzf(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::Plain(w) => w.flush(),
            Self::Bgzf(w) => w.flush(),
        }
    }
}

/// Writes one VCF line per reconciled panel site
pub struct VcfRecordWriter<W: Write> {
    inner: BufWriter<W>,
    missing: MissingValues,
    placement: TagPlacement,
    line: String,
}

impl<W: Write> VcfRecordWriter<W> {
    pub fn new(inner: W, missing: MissingValues, placement: TagPlacement) -> Self {
        Self {
            inner: BufWriter::new(inner),
            missing,
            placement,
            line: String::new(),
        }
    }

    /// Write pre-rendered header text
    ///
    /// # Errors
    ///
    /// Returns the underlying write error.
    pub fn write_header(&mut self, header: &str) -> io::Result<()> {
        self.inner.write_all(header.as_bytes())
    }

    /// Write one record line
    ///
    /// # Errors
    ///
    /// Returns the underlying write error.
    pub fn write_record(&mut self, result: &MatchResult) -> io::Result<()> {
        self.line.clear();
        format_record(&mut self.line, result, self.missing, self.placement);
        self.line.push('\n');
        self.inner.write_all(self.line.as_bytes())
    }

    /// Flush buffered records through to the sink
    ///
    /// # Errors
    ///
    /// Returns the underlying write or flush error.
    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    /// Return the sink without writing anything still buffered
    pub fn abandon(self) -> W {
        let (sink, _discarded) = self.inner.into_parts();
        sink
    }

    /// Flush and return the sink
    ///
    /// # Errors
    ///
    /// Returns the flush error if buffered records cannot be written.
    pub fn finish(self) -> io::Result<W> {
        self.inner.into_inner().map_err(io::IntoInnerError::into_error)
    }
}

/// Render the tab-separated columns of one record (no trailing newline)
pub fn format_record(
    out: &mut String,
    result: &MatchResult,
    missing: MissingValues,
    placement: TagPlacement,
) {
    use std::fmt::Write as _;

    let id = result.id.as_deref().unwrap_or(".");
    let _ = write!(
        out,
        "{}\t{}\t{}\t{}\t{}\t",
        result.chrom,
        result.position(),
        id,
        result.reference,
        result.alternate
    );

    match result.quality.filter(|_| result.category == MatchCategory::Var) {
        Some(quality) => {
            let _ = write!(out, "{quality:.2}");
        }
        None => out.push('.'),
    }
    out.push_str("\t.\t");

    match placement {
        TagPlacement::Info => {
            let _ = write!(out, "VM={}\tGT:PL\t", result.category);
        }
        TagPlacement::Format => out.push_str(".\tGT:GC:PL\t"),
    }

    match &result.genotype {
        Some(genotype) => {
            let _ = write!(out, "{genotype}");
        }
        None => out.push_str(missing.genotype(result.ploidy)),
    }
    out.push(':');

    if placement == TagPlacement::Format {
        out.push_str(result.category.as_str());
        out.push(':');
    }

    match &result.likelihoods {
        Some(likelihoods) => {
            for (i, pl) in likelihoods.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                match pl {
                    Some(pl) => {
                        let _ = write!(out, "{pl}");
                    }
                    None => out.push_str(missing.likelihood_slot()),
                }
            }
        }
        None => out.push_str(missing.likelihoods(result.ploidy)),
    }
}
