//! Chroma Core: similarity-search index structures over color feature vectors.
//!
//! Three interchangeable indexes share one insert/query contract so that their
//! result quality and cost (distance evaluations per query) can be compared:
//!
//! - [`SequentialIndex`]: doubly linked list, brute-force scan.
//! - [`HashIndex`]: multi-table binned hashing, approximate.
//! - [`Quadtree`]: adaptive (R,G) partition with best-first k-NN search.

pub mod error;
pub mod index;
pub mod vector;

pub use error::{IndexError, Result};
pub use index::hash::{HashConfig, HashIndex};
pub use index::quadtree::{Quadtree, QuadtreeConfig, Region};
pub use index::sequential::SequentialIndex;
pub use index::{build_index, IndexKind, QueryResult, VectorIndex};
pub use vector::FeatureVector;
