use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chroma_core::FeatureVector;
use log::info;
use thiserror::Error;

pub const REPORT_HEADER: &str =
    "structure,query_image_id,search_time_ms,comparisons,query_r,query_g,query_b,top_k_avg_similarity";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write results report: {0}")]
    Io(#[from] std::io::Error),
}

/// One measured query.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub structure: String,
    pub query: FeatureVector,
    pub search_time_ms: f64,
    pub comparisons: usize,
    pub top_k_avg_similarity: f64,
}

/// CSV writer for per-query benchmark results. The header goes out on creation.
pub struct ReportWriter<W: Write> {
    out: W,
    rows: usize,
}

impl ReportWriter<BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, ReportError> {
        let path = path.as_ref();
        let file = File::create(path)?;
        info!("Results report prepared at {}", path.display());
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> ReportWriter<W> {
    pub fn new(mut out: W) -> Result<Self, ReportError> {
        writeln!(out, "{}", REPORT_HEADER)?;
        Ok(Self { out, rows: 0 })
    }

    pub fn write_row(&mut self, row: &ReportRow) -> Result<(), ReportError> {
        writeln!(
            self.out,
            "{},{},{},{},{},{},{},{}",
            row.structure,
            row.query.image_id,
            row.search_time_ms,
            row.comparisons,
            row.query.r,
            row.query.g,
            row.query.b,
            row.top_k_avg_similarity
        )?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows
    }

    /// Flushes and hands back the underlying writer.
    pub fn finish(mut self) -> Result<W, ReportError> {
        self.out.flush()?;
        Ok(self.out)
    }
}
