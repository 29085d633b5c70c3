//! # Hash Index (Multi-Table Binned Hashing)
//!
//! `num_hashes` independent tables. Table `h` bins every channel with the
//! boundaries shifted by `h`, so a vector sitting on a bin edge in one table
//! usually shares a bucket with its neighbors in another.
//!
//! Approximate by construction: recall depends on `num_buckets` and `bin_size`
//! relative to the workload. Nothing guarantees the true nearest neighbors are
//! among the candidates.

use std::collections::HashSet;

use log::info;

use crate::error::{IndexError, Result};
use crate::index::{QueryResult, VectorIndex};
use crate::vector::FeatureVector;

/// Large odd multipliers for spreading the three channel bins.
const R_PRIME: i64 = 73_856_093;
const G_PRIME: i64 = 19_349_663;
const B_PRIME: i64 = 83_492_791;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashConfig {
    pub num_buckets: usize,
    pub num_hashes: usize,
    /// Width of one bin along each channel.
    pub bin_size: u32,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self { num_buckets: 1013, num_hashes: 5, bin_size: 25 }
    }
}

impl HashConfig {
    pub fn validate(&self) -> Result<()> {
        if self.num_buckets == 0 {
            return Err(IndexError::InvalidConfig("num_buckets must be positive".into()));
        }
        if self.num_hashes == 0 {
            return Err(IndexError::InvalidConfig("num_hashes must be positive".into()));
        }
        if self.bin_size == 0 {
            return Err(IndexError::InvalidConfig("bin_size must be positive".into()));
        }
        Ok(())
    }
}

/// One copy of an inserted vector, chained inside a bucket.
#[derive(Debug, Clone)]
struct HashNode {
    data: FeatureVector,
    /// Insertion sequence number shared by the copies in every table.
    entry: usize,
    next: Option<usize>,
}

/// A single hash table: bucket heads plus the arena their chains live in.
#[derive(Debug)]
struct Table {
    heads: Vec<Option<usize>>,
    nodes: Vec<HashNode>,
}

impl Table {
    fn new(num_buckets: usize) -> Self {
        Self { heads: vec![None; num_buckets], nodes: Vec::new() }
    }

    /// O(1) prepend to the bucket chain.
    fn prepend(&mut self, bucket: usize, data: FeatureVector, entry: usize) {
        let slot = self.nodes.len();
        self.nodes.push(HashNode { data, entry, next: self.heads[bucket] });
        self.heads[bucket] = Some(slot);
    }

    fn chain(&self, bucket: usize) -> Chain<'_> {
        Chain { nodes: &self.nodes, cursor: self.heads[bucket] }
    }
}

struct Chain<'a> {
    nodes: &'a [HashNode],
    cursor: Option<usize>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a HashNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = &self.nodes[self.cursor?];
        self.cursor = node.next;
        Some(node)
    }
}

pub struct HashIndex {
    config: HashConfig,
    tables: Vec<Table>,
    /// Logical inserts so far; also the next entry number.
    len: usize,
}

impl HashIndex {
    pub fn new(config: HashConfig) -> Result<Self> {
        config.validate()?;
        info!(
            "Initializing Hash Index (Buckets: {}, Tables: {}, Bin: {})",
            config.num_buckets, config.num_hashes, config.bin_size
        );
        let tables = (0..config.num_hashes).map(|_| Table::new(config.num_buckets)).collect();
        Ok(Self { config, tables, len: 0 })
    }

    pub fn config(&self) -> &HashConfig {
        &self.config
    }

    /// Total vector copies held across all tables.
    pub fn stored_copies(&self) -> usize {
        self.tables.iter().map(|t| t.nodes.len()).sum()
    }

    #[inline]
    fn bin(&self, value: f64, seed: usize) -> i64 {
        ((value + seed as f64) / self.config.bin_size as f64).floor() as i64
    }

    /// Bucket of `vector` in table `seed`. Always in `0..num_buckets`.
    pub fn bucket_of(&self, vector: &FeatureVector, seed: usize) -> usize {
        let r_bin = self.bin(vector.r, seed);
        let g_bin = self.bin(vector.g, seed);
        let b_bin = self.bin(vector.b, seed);
        let hash = r_bin.wrapping_mul(R_PRIME)
            ^ g_bin.wrapping_mul(G_PRIME)
            ^ b_bin.wrapping_mul(B_PRIME)
            ^ seed as i64;
        hash.rem_euclid(self.config.num_buckets as i64) as usize
    }

    /// Occupied buckets per table; handy when tuning `num_buckets`.
    pub fn occupied_buckets(&self) -> Vec<usize> {
        self.tables
            .iter()
            .map(|t| t.heads.iter().filter(|h| h.is_some()).count())
            .collect()
    }
}

impl VectorIndex for HashIndex {
    fn insert(&mut self, vector: FeatureVector) {
        let entry = self.len;
        for seed in 0..self.config.num_hashes {
            let bucket = self.bucket_of(&vector, seed);
            self.tables[seed].prepend(bucket, vector, entry);
        }
        self.len += 1;
    }

    fn query(&self, query: &FeatureVector, k: usize) -> QueryResult {
        let mut result = QueryResult::empty();
        if k == 0 || self.len == 0 {
            return result;
        }

        let mut seen: HashSet<usize> = HashSet::new();
        let mut candidates: Vec<FeatureVector> = Vec::new();
        for (seed, table) in self.tables.iter().enumerate() {
            let bucket = self.bucket_of(query, seed);
            for node in table.chain(bucket) {
                if seen.insert(node.entry) {
                    candidates.push(node.data);
                }
            }
        }

        // One metric evaluation per candidate; the sort reuses the scores.
        result.comparisons = candidates.len();
        let mut scored: Vec<(f64, FeatureVector)> =
            candidates.into_iter().map(|c| (query.similarity_to(&c), c)).collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        result.neighbors = scored.into_iter().take(k).map(|(_, v)| v).collect();
        result
    }

    fn len(&self) -> usize {
        self.len
    }

    fn name(&self) -> &'static str {
        "hash"
    }
}
