//! Chroma I/O: moves feature vectors and benchmark results in and out of text files.
//!
//! The indexes in `chroma-core` never touch the filesystem; this crate owns the
//! dataset format (`id,r,g,b` per line) and the per-query results report.

pub mod dataset;
pub mod report;

pub use dataset::{load_dataset, parse_dataset, write_dataset, DatasetError};
pub use report::{ReportError, ReportRow, ReportWriter};
