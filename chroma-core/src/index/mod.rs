pub mod distance;
pub mod hash;
pub mod quadtree;
pub mod sequential;

use std::fmt;
use std::str::FromStr;

use crate::error::{IndexError, Result};
use crate::vector::FeatureVector;

/// Outcome of a single k-nearest-neighbor query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// Nearest first, at most `k` entries. Copies, never aliases of stored data.
    pub neighbors: Vec<FeatureVector>,
    /// Distance-metric evaluations performed by this query.
    pub comparisons: usize,
}

impl QueryResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    pub fn ids(&self) -> Vec<i64> {
        self.neighbors.iter().map(|n| n.image_id).collect()
    }

    /// Mean cosine similarity between `query` and the returned neighbors (0.0 if none).
    pub fn mean_similarity(&self, query: &FeatureVector) -> f64 {
        if self.neighbors.is_empty() {
            return 0.0;
        }
        let total: f64 = self.neighbors.iter().map(|n| query.similarity_to(n)).sum();
        total / self.neighbors.len() as f64
    }
}

/// Common contract for every similarity index.
///
/// Single-threaded: callers build fully, then query. Interleaving `insert`
/// with an in-flight traversal is prevented by the `&mut self` receiver.
pub trait VectorIndex {
    fn insert(&mut self, vector: FeatureVector);

    /// Returns up to `k` neighbors ordered by increasing distance to `query`.
    /// `k == 0` and an empty index both yield an empty result with zero comparisons.
    fn query(&self, query: &FeatureVector, k: usize) -> QueryResult;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short stable label, used in reports.
    fn name(&self) -> &'static str;
}

/// Selector for the driver: which index structure to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKind {
    Sequential,
    Hash,
    Quadtree,
}

impl IndexKind {
    pub const ALL: [IndexKind; 3] = [IndexKind::Sequential, IndexKind::Hash, IndexKind::Quadtree];

    pub fn as_str(&self) -> &'static str {
        match self {
            IndexKind::Sequential => "list",
            IndexKind::Hash => "hash",
            IndexKind::Quadtree => "quadtree",
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndexKind {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "list" | "sequential" => Ok(IndexKind::Sequential),
            "hash" => Ok(IndexKind::Hash),
            "quadtree" | "tree" => Ok(IndexKind::Quadtree),
            other => Err(IndexError::InvalidConfig(format!("unknown index structure '{}'", other))),
        }
    }
}

/// Builds an empty index of the requested kind behind the common contract.
pub fn build_index(
    kind: IndexKind,
    hash: hash::HashConfig,
    tree: quadtree::QuadtreeConfig,
) -> Result<Box<dyn VectorIndex>> {
    Ok(match kind {
        IndexKind::Sequential => Box::new(sequential::SequentialIndex::new()),
        IndexKind::Hash => Box::new(hash::HashIndex::new(hash)?),
        IndexKind::Quadtree => Box::new(quadtree::Quadtree::new(tree)?),
    })
}
