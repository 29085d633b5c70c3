use std::path::PathBuf;

use chroma_core::{HashConfig, IndexKind, QuadtreeConfig};
use clap::Parser;

/// Builds each index from a dataset and measures k-NN query cost.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Dataset file, one `id,r,g,b` record per line.
    #[arg(short, long, default_value = "dataset.csv")]
    pub dataset: PathBuf,

    /// Per-query results report (CSV).
    #[arg(short, long, default_value = "results.csv")]
    pub output: PathBuf,

    /// Neighbors per query.
    #[arg(short, long, default_value_t = 5)]
    pub k: usize,

    /// Number of dataset vectors used as queries. Defaults to 2k.
    #[arg(short, long)]
    pub queries: Option<usize>,

    /// Structure to benchmark: list, hash or quadtree. Repeatable; all when omitted.
    #[arg(short = 's', long = "structure")]
    pub structures: Vec<IndexKind>,

    #[arg(long, default_value_t = 1013)]
    pub buckets: usize,

    #[arg(long, default_value_t = 5)]
    pub hashes: usize,

    #[arg(long, default_value_t = 25)]
    pub bin_size: u32,

    #[arg(long, default_value_t = chroma_core::index::quadtree::DEFAULT_LEAF_CAPACITY)]
    pub leaf_capacity: usize,

    /// Generate this many random vectors instead of reading `--dataset`.
    #[arg(long)]
    pub synthetic: Option<usize>,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Also write the generated synthetic dataset to this file.
    #[arg(long, requires = "synthetic")]
    pub save_dataset: Option<PathBuf>,
}

impl Args {
    /// Requested structures in order, without repeats.
    pub fn structures(&self) -> Vec<IndexKind> {
        if self.structures.is_empty() {
            return IndexKind::ALL.to_vec();
        }
        let mut kinds = Vec::new();
        for kind in &self.structures {
            if !kinds.contains(kind) {
                kinds.push(*kind);
            }
        }
        kinds
    }

    pub fn query_count(&self, dataset_len: usize) -> usize {
        self.queries.unwrap_or(self.k * 2).min(dataset_len)
    }

    pub fn hash_config(&self) -> HashConfig {
        HashConfig { num_buckets: self.buckets, num_hashes: self.hashes, bin_size: self.bin_size }
    }

    pub fn quadtree_config(&self) -> QuadtreeConfig {
        QuadtreeConfig { leaf_capacity: self.leaf_capacity, ..Default::default() }
    }
}
