use chroma_core::{
    build_index, FeatureVector, HashConfig, HashIndex, IndexKind, Quadtree, QuadtreeConfig, SequentialIndex,
    VectorIndex,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_dataset(n: usize, seed: u64) -> Vec<FeatureVector> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            FeatureVector::new(
                i as i64,
                rng.gen_range(0.0..255.0),
                rng.gen_range(0.0..255.0),
                rng.gen_range(0.0..255.0),
            )
        })
        .collect()
}

fn build_all(data: &[FeatureVector]) -> Vec<Box<dyn VectorIndex>> {
    IndexKind::ALL
        .iter()
        .map(|&kind| {
            let mut index = build_index(kind, HashConfig::default(), QuadtreeConfig::default()).unwrap();
            for v in data {
                index.insert(*v);
            }
            index
        })
        .collect()
}

fn assert_sorted_by_distance(query: &FeatureVector, neighbors: &[FeatureVector]) {
    for pair in neighbors.windows(2) {
        assert!(
            query.distance_to(&pair[0]) <= query.distance_to(&pair[1]),
            "{} before {}",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn test_scenario_three_vectors() {
    let data = [
        FeatureVector::new(1, 10.0, 10.0, 10.0),
        FeatureVector::new(2, 200.0, 200.0, 200.0),
        FeatureVector::new(3, 12.0, 9.0, 11.0),
    ];
    let query = FeatureVector::new(1, 10.0, 10.0, 10.0);

    let mut list = SequentialIndex::new();
    let mut tree = Quadtree::new(QuadtreeConfig::default()).unwrap();
    for v in data {
        list.insert(v);
        tree.insert(v);
    }

    // 1 and 2 point the same way as the query; the list keeps insertion order on ties.
    assert_eq!(list.query(&query, 2).ids(), vec![1, 2]);
    assert_eq!(list.query(&query, 3).ids(), vec![1, 2, 3]);

    let tree_ids = tree.query(&query, 3).ids();
    assert_eq!(tree_ids[2], 3);
    let mut head = tree_ids[..2].to_vec();
    head.sort_unstable();
    assert_eq!(head, vec![1, 2]);
}

#[test]
fn test_empty_indexes_return_nothing() {
    let query = FeatureVector::new(0, 1.0, 2.0, 3.0);
    for index in build_all(&[]) {
        let result = index.query(&query, 5);
        assert!(result.neighbors.is_empty(), "{}", index.name());
        assert_eq!(result.comparisons, 0, "{}", index.name());
    }
}

#[test]
fn test_result_length_and_order() {
    let data = random_dataset(600, 7);
    let indexes = build_all(&data);
    let queries = random_dataset(25, 99);

    for index in &indexes {
        assert_eq!(index.len(), data.len());
        for query in &queries {
            for k in [0, 1, 5, 17] {
                let result = index.query(query, k);
                match index.name() {
                    "hash" => assert!(result.len() <= k),
                    _ => assert_eq!(result.len(), k.min(data.len()), "{} k={}", index.name(), k),
                }
                if k == 0 {
                    assert_eq!(result.comparisons, 0);
                }
                assert!(result.comparisons >= result.len());
                assert_sorted_by_distance(query, &result.neighbors);
            }
        }
    }
}

#[test]
fn test_sequential_scans_everything() {
    let data = random_dataset(250, 3);
    let mut list = SequentialIndex::new();
    for v in &data {
        list.insert(*v);
    }
    let query = FeatureVector::new(-1, 90.0, 30.0, 200.0);
    let result = list.query(&query, 10);
    assert_eq!(result.comparisons, data.len());

    let mut expected: Vec<f64> = data.iter().map(|v| query.distance_to(v)).collect();
    expected.sort_by(|a, b| a.total_cmp(b));
    let got: Vec<f64> = result.neighbors.iter().map(|v| query.distance_to(v)).collect();
    assert_eq!(got, expected[..10].to_vec());
}

#[test]
fn test_quadtree_prunes_and_respects_capacity() {
    let data = random_dataset(2_000, 11);
    let mut tree = Quadtree::new(QuadtreeConfig::default()).unwrap();
    for v in &data {
        tree.insert(*v);
    }
    assert!(tree.max_leaf_len() <= tree.leaf_capacity());
    assert!(tree.leaf_count() > 1);

    let mut total_comparisons = 0;
    for query in data.iter().take(50) {
        let result = tree.query(query, 5);
        assert_eq!(result.len(), 5);
        // The query itself is stored and sits in the first leaf searched.
        assert_eq!(query.distance_to(&result.neighbors[0]), 0.0);
        total_comparisons += result.comparisons;
    }
    assert!(total_comparisons < 50 * data.len());
}

#[test]
fn test_quadtree_single_leaf_matches_scan() {
    // Fewer vectors than the leaf capacity: one leaf, so the search is exhaustive.
    let data = random_dataset(8, 21);
    let mut tree = Quadtree::new(QuadtreeConfig::default()).unwrap();
    let mut list = SequentialIndex::new();
    for v in &data {
        tree.insert(*v);
        list.insert(*v);
    }
    let query = FeatureVector::new(-1, 128.0, 64.0, 32.0);
    let from_tree: Vec<f64> = tree.query(&query, 8).neighbors.iter().map(|v| query.distance_to(v)).collect();
    let from_list: Vec<f64> = list.query(&query, 8).neighbors.iter().map(|v| query.distance_to(v)).collect();
    assert_eq!(from_tree, from_list);
}

#[test]
fn test_quadtree_grows_for_out_of_range_points() {
    let mut tree = Quadtree::new(QuadtreeConfig::default()).unwrap();
    let mut rng = StdRng::seed_from_u64(5);
    let mut points = Vec::new();
    for id in 0..300 {
        let v = FeatureVector::new(
            id,
            rng.gen_range(-2_000.0..2_000.0),
            rng.gen_range(-2_000.0..2_000.0),
            rng.gen_range(0.0..255.0),
        );
        tree.insert(v);
        points.push(v);
        assert!(tree.root_region().contains(v.r, v.g));
    }
    for v in &points {
        assert!(tree.root_region().contains(v.r, v.g));
    }
    assert!(tree.max_leaf_len() <= tree.leaf_capacity());
    assert_eq!(tree.query(&points[0], 300).len(), 300);
}

#[test]
fn test_hash_self_retrieval() {
    let data = random_dataset(500, 13);
    let mut index = HashIndex::new(HashConfig::default()).unwrap();
    for v in &data {
        index.insert(*v);
    }
    assert_eq!(index.stored_copies(), data.len() * HashConfig::default().num_hashes);

    for v in &data {
        let result = index.query(v, 1);
        assert_eq!(result.len(), 1);
        assert_eq!(v.similarity_to(&result.neighbors[0]), 1.0);
        let all = index.query(v, result.comparisons);
        assert!(all.neighbors.iter().any(|n| n.image_id == v.image_id));
    }
}
