use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use chroma_core::FeatureVector;
use log::info;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Dataset I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed record on line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

/// Lines starting with one of these are ignored.
const COMMENT_PREFIXES: [&str; 2] = ["//", "#"];

/// Opens `path` and parses every record in it.
///
/// # Errors
/// `DatasetError::Io` if the file cannot be opened or read, `DatasetError::Parse`
/// on the first malformed record.
pub fn load_dataset<P: AsRef<Path>>(path: P) -> Result<Vec<FeatureVector>, DatasetError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let dataset = parse_dataset(BufReader::new(file))?;
    info!("Loaded {} feature vectors from {}", dataset.len(), path.display());
    Ok(dataset)
}

/// Parses `id,r,g,b` records, one per line. Blank and comment lines are skipped.
pub fn parse_dataset<R: BufRead>(reader: R) -> Result<Vec<FeatureVector>, DatasetError> {
    let mut dataset = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || COMMENT_PREFIXES.iter().any(|p| trimmed.starts_with(p)) {
            continue;
        }
        dataset.push(parse_record(trimmed, idx + 1)?);
    }
    Ok(dataset)
}

fn parse_record(record: &str, line: usize) -> Result<FeatureVector, DatasetError> {
    let fields: Vec<&str> = record.split(',').map(str::trim).collect();
    if fields.len() != 4 {
        return Err(DatasetError::Parse {
            line,
            reason: format!("expected 4 fields (id,r,g,b), found {}", fields.len()),
        });
    }

    let image_id = fields[0].parse::<i64>().map_err(|e| DatasetError::Parse {
        line,
        reason: format!("image id '{}': {}", fields[0], e),
    })?;

    let mut channels = [0.0f64; 3];
    for (slot, (name, raw)) in channels.iter_mut().zip(["r", "g", "b"].iter().zip(&fields[1..])) {
        let value = raw.parse::<f64>().map_err(|e| DatasetError::Parse {
            line,
            reason: format!("channel {} '{}': {}", name, raw, e),
        })?;
        if !value.is_finite() {
            return Err(DatasetError::Parse { line, reason: format!("channel {} is not finite", name) });
        }
        *slot = value;
    }

    Ok(FeatureVector::new(image_id, channels[0], channels[1], channels[2]))
}

/// Writes `vectors` in the format `parse_dataset` reads.
pub fn write_dataset<W: Write>(mut writer: W, vectors: &[FeatureVector]) -> std::io::Result<()> {
    for v in vectors {
        writeln!(writer, "{},{},{},{}", v.image_id, v.r, v.g, v.b)?;
    }
    writer.flush()
}
