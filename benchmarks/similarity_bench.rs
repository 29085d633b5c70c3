use std::fs::File;
use std::io::BufWriter;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use chroma_core::{build_index, FeatureVector, IndexKind};
use chroma_io::{load_dataset, write_dataset, ReportRow, ReportWriter};
use clap::Parser;
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

mod config;
mod receipt;

use config::Args;
use receipt::Receipt;

/// Uniform random colors over the 8-bit channel range, ids starting at 1.
fn generate_dataset(n: usize, seed: u64) -> Vec<FeatureVector> {
    let mut rng = StdRng::seed_from_u64(seed);
    (1..=n as i64)
        .map(|id| {
            FeatureVector::new(
                id,
                rng.gen_range(0.0..=255.0),
                rng.gen_range(0.0..=255.0),
                rng.gen_range(0.0..=255.0),
            )
        })
        .collect()
}

fn prepare_dataset(args: &Args) -> Result<Vec<FeatureVector>> {
    let Some(n) = args.synthetic else {
        return load_dataset(&args.dataset)
            .with_context(|| format!("could not load dataset '{}'", args.dataset.display()));
    };

    info!("Generating {} synthetic vectors (seed {})", n, args.seed);
    let dataset = generate_dataset(n, args.seed);
    if let Some(path) = &args.save_dataset {
        let file = File::create(path).with_context(|| format!("could not create '{}'", path.display()))?;
        write_dataset(BufWriter::new(file), &dataset)
            .with_context(|| format!("could not write '{}'", path.display()))?;
        info!("Synthetic dataset saved to {}", path.display());
    }
    Ok(dataset)
}

fn run_structure<W: std::io::Write>(
    kind: IndexKind,
    args: &Args,
    dataset: &[FeatureVector],
    report: &mut ReportWriter<W>,
) -> Result<Receipt> {
    let mut index = build_index(kind, args.hash_config(), args.quadtree_config())
        .with_context(|| format!("invalid configuration for {}", kind))?;

    let build_start = Instant::now();
    for vector in dataset {
        index.insert(*vector);
    }
    let build_time = build_start.elapsed();
    info!("{}: inserted {} vectors in {:.2?}", kind, index.len(), build_time);

    let mut receipt = Receipt::new(index.name(), dataset.len(), args.k, build_time);
    for query in dataset.iter().take(args.query_count(dataset.len())) {
        let start = Instant::now();
        let result = index.query(query, args.k);
        let latency = start.elapsed();

        let avg_similarity = result.mean_similarity(query);
        report.write_row(&ReportRow {
            structure: index.name().to_string(),
            query: *query,
            search_time_ms: latency.as_secs_f64() * 1e3,
            comparisons: result.comparisons,
            top_k_avg_similarity: avg_similarity,
        })?;
        receipt.record(latency, result.comparisons, avg_similarity);

        info!(
            "{}: query id {} done ({:.3} ms, {} comparisons)",
            kind,
            query.image_id,
            latency.as_secs_f64() * 1e3,
            result.comparisons
        );
    }
    Ok(receipt)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let dataset = prepare_dataset(&args)?;
    if dataset.is_empty() {
        bail!("dataset is empty; nothing to index");
    }
    info!("{} vectors ready", dataset.len());

    let mut report = ReportWriter::create(&args.output)
        .with_context(|| format!("could not create results report '{}'", args.output.display()))?;

    let mut receipts = Vec::new();
    for kind in args.structures() {
        receipts.push(run_structure(kind, &args, &dataset, &mut report)?);
    }
    let rows = report.rows_written();
    report.finish()?;
    info!("{} result rows saved to {}", rows, args.output.display());

    for receipt in &receipts {
        receipt.print();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_dataset_is_reproducible() {
        let a = generate_dataset(50, 9);
        let b = generate_dataset(50, 9);
        assert_eq!(a, b);
        assert_eq!(a.first().map(|v| v.image_id), Some(1));
        assert!(a.iter().all(|v| (0.0..=255.0).contains(&v.r) && (0.0..=255.0).contains(&v.b)));
    }

    #[test]
    fn test_run_structure_writes_one_row_per_query() {
        let args = Args::parse_from(["similarity_bench", "-k", "3", "-q", "4"]);
        let dataset = generate_dataset(40, 1);
        let mut report = ReportWriter::new(Vec::new()).unwrap();
        for kind in IndexKind::ALL {
            let receipt = run_structure(kind, &args, &dataset, &mut report).unwrap();
            assert_eq!(receipt.queries(), 4);
        }
        assert_eq!(report.rows_written(), 12);
        let text = String::from_utf8(report.finish().unwrap()).unwrap();
        assert_eq!(text.lines().filter(|l| l.starts_with("quadtree,")).count(), 4);
    }
}
