use std::fs;

use chroma_core::{FeatureVector, SequentialIndex, VectorIndex};
use chroma_io::{load_dataset, write_dataset, ReportRow, ReportWriter};

#[test]
fn test_file_dataset_feeds_index_and_report() {
    let dir = std::env::temp_dir().join(format!("chroma-io-test-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let dataset_path = dir.join("dataset.csv");
    let report_path = dir.join("results.csv");

    let vectors = vec![
        FeatureVector::new(1, 10.0, 10.0, 10.0),
        FeatureVector::new(2, 200.0, 200.0, 200.0),
        FeatureVector::new(3, 12.0, 9.0, 11.0),
    ];
    let mut file = fs::File::create(&dataset_path).unwrap();
    std::io::Write::write_all(&mut file, b"// id,r,g,b\n\n").unwrap();
    write_dataset(&mut file, &vectors).unwrap();
    drop(file);

    let loaded = load_dataset(&dataset_path).unwrap();
    assert_eq!(loaded, vectors);

    let mut index = SequentialIndex::new();
    for v in &loaded {
        index.insert(*v);
    }
    let query = loaded[0];
    let result = index.query(&query, 2);

    let mut report = ReportWriter::create(&report_path).unwrap();
    report
        .write_row(&ReportRow {
            structure: index.name().to_string(),
            query,
            search_time_ms: 0.0,
            comparisons: result.comparisons,
            top_k_avg_similarity: result.mean_similarity(&query),
        })
        .unwrap();
    report.finish().unwrap();

    let text = fs::read_to_string(&report_path).unwrap();
    assert_eq!(text.lines().nth(1), Some("list,1,0,3,10,10,10,1"));

    fs::remove_dir_all(&dir).unwrap();
}
