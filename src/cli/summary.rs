//! Per-category counts reported at the end of a run.
//!
//! The report goes to stderr so it never mixes with VCF written to stdout.

use std::fmt::Write as _;

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::core::region::Region;
use crate::core::types::MatchCategory;
use crate::matching::engine::RegionSummary;

#[derive(Debug, Serialize)]
pub struct RegionReport {
    pub region: String,
    #[serde(flatten)]
    pub summary: RegionSummary,
}

#[derive(Debug, Default, Serialize)]
pub struct RunSummary {
    pub regions: Vec<RegionReport>,
    pub total: RegionSummary,
}

impl RunSummary {
    pub fn add(&mut self, region: &Region, summary: RegionSummary) {
        self.total.merge(&summary);
        self.regions.push(RegionReport {
            region: region.to_string(),
            summary,
        });
    }

    /// Print the report to stderr
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn print(&self, format: OutputFormat) -> anyhow::Result<()> {
        eprint!("{}", self.render(format)?);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render(&self, format: OutputFormat) -> anyhow::Result<String> {
        Ok(match format {
            OutputFormat::Text => self.render_text(),
            OutputFormat::Json => {
                let mut text = serde_json::to_string_pretty(self)?;
                text.push('\n');
                text
            }
            OutputFormat::Tsv => self.render_tsv(),
        })
    }

    fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Reconciled {} panel site(s) in {} region(s)",
            self.total.sites,
            self.regions.len()
        );
        for category in MatchCategory::ALL {
            let count = self.total.count(category);
            let percent = if self.total.sites == 0 {
                0.0
            } else {
                #[allow(clippy::cast_precision_loss)]
                let pct = count as f64 / self.total.sites as f64 * 100.0;
                pct
            };
            let _ = writeln!(out, "   {category}: {count} ({percent:.1}%)");
        }
        out
    }

    fn render_tsv(&self) -> String {
        let mut out = String::from("region\tsites");
        for category in MatchCategory::ALL {
            let _ = write!(out, "\t{category}");
        }
        out.push('\n');

        let mut row = |name: &str, summary: &RegionSummary| {
            let _ = write!(out, "{name}\t{}", summary.sites);
            for category in MatchCategory::ALL {
                let _ = write!(out, "\t{}", summary.count(category));
            }
            out.push('\n');
        };
        for report in &self.regions {
            row(&report.region, &report.summary);
        }
        row("total", &self.total);
        out
    }
}
