mod common;

use common::{payload, payload_with};
use galindex::domain::error::DomainError;
use galindex::domain::index::VectorIndex;
use galindex::domain::values::metric::Metric;
use serde_json::json;

#[test]
fn test_insert_then_get_returns_same_record() {
    let index = VectorIndex::new(3, Metric::Cosine).unwrap();
    let meta = json!({"prompt": "千恋万花", "chunk": 2});
    index
        .insert("doc-1", vec![0.1, -0.2, 0.3], payload_with("千恋万花\n和风", meta.clone()))
        .unwrap();

    let record = index.get("doc-1").unwrap();
    assert_eq!(record.id, "doc-1");
    assert_eq!(record.vector, vec![0.1, -0.2, 0.3]);
    assert_eq!(record.payload.text, "千恋万花\n和风");
    assert_eq!(record.payload.metadata, meta.as_object().cloned().unwrap());
    assert_eq!(index.size(), 1);
}

#[test]
fn test_dimension_mismatch_leaves_size_unchanged() {
    let index = VectorIndex::new(3, Metric::Cosine).unwrap();
    index.insert("ok", vec![1.0, 2.0, 3.0], payload("ok")).unwrap();

    for bad in [vec![], vec![1.0, 2.0], vec![1.0, 2.0, 3.0, 4.0]] {
        let len = bad.len();
        let err = index.insert("bad", bad, payload("bad")).unwrap_err();
        assert!(matches!(
            err,
            DomainError::DimensionMismatch { expected: 3, actual } if actual == len
        ));
    }
    assert_eq!(index.size(), 1);
    assert!(!index.contains("bad"));
}

#[test]
fn test_duplicate_id_rejected() {
    let index = VectorIndex::new(2, Metric::Dot).unwrap();
    index.insert("same", vec![1.0, 0.0], payload("first")).unwrap();
    let err = index.insert("same", vec![0.0, 1.0], payload("second")).unwrap_err();

    assert!(matches!(err, DomainError::DuplicateId(id) if id == "same"));
    assert_eq!(index.size(), 1);
    assert_eq!(index.get("same").unwrap().payload.text, "first");
}

#[test]
fn test_get_missing_is_not_found() {
    let index = VectorIndex::new(2, Metric::Cosine).unwrap();
    assert!(matches!(index.get("nope"), Err(DomainError::NotFound(_))));
}

#[test]
fn test_empty_id_rejected() {
    let index = VectorIndex::new(2, Metric::Cosine).unwrap();
    assert!(matches!(
        index.insert("", vec![1.0, 0.0], payload("x")),
        Err(DomainError::InvalidInput(_))
    ));
}

#[test]
fn test_snapshot_preserves_insertion_order() {
    let index = VectorIndex::new(1, Metric::Euclidean).unwrap();
    for id in ["c", "a", "b"] {
        index.insert(id, vec![1.0], payload(id)).unwrap();
    }
    let ids: Vec<String> = index.snapshot().records().iter().map(|r| r.id.clone()).collect();
    assert_eq!(ids, vec!["c", "a", "b"]);
}
