//! Readers racing a writer must only ever see whole records from one snapshot.

mod common;

use common::payload;
use galindex::domain::index::VectorIndex;
use galindex::domain::values::metric::Metric;
use std::sync::atomic::{AtomicBool, Ordering};

const DIM: usize = 4;
const WRITES: usize = 3000;

fn vector_for(i: usize) -> Vec<f32> {
    vec![i as f32, 1.0, (i % 7) as f32, -(i as f32)]
}

#[test]
fn test_queries_during_inserts_see_consistent_snapshots() {
    let index = VectorIndex::new(DIM, Metric::Euclidean).unwrap();
    let done = AtomicBool::new(false);

    std::thread::scope(|s| {
        s.spawn(|| {
            for i in 0..WRITES {
                index.insert(format!("r{i}"), vector_for(i), payload(&format!("r{i}"))).unwrap();
            }
            done.store(true, Ordering::Release);
        });

        for _ in 0..4 {
            s.spawn(|| {
                let mut last_seen = 0;
                while !done.load(Ordering::Acquire) {
                    let snapshot = index.snapshot();
                    let size = snapshot.len();
                    assert!(size >= last_seen, "snapshots went backwards");
                    last_seen = size;

                    // every record in the snapshot is complete and in insertion order
                    for (i, record) in snapshot.records().iter().enumerate() {
                        assert_eq!(record.id, format!("r{i}"));
                        assert_eq!(record.vector, vector_for(i));
                        assert_eq!(record.payload.text, record.id);
                    }

                    if size == 0 {
                        continue;
                    }
                    let results = snapshot.query(&vector_for(size / 2), 5).unwrap();
                    assert!(results.len() <= size.min(5));
                    for hit in &results {
                        assert_eq!(hit.payload.text, hit.record_id);
                        let n: usize = hit.record_id[1..].parse().unwrap();
                        assert!(n < size, "hit from a later insert");
                    }
                }
            });
        }
    });

    assert_eq!(index.size(), WRITES);
}

#[test]
fn test_concurrent_queries_do_not_block_each_other() {
    let index = VectorIndex::new(DIM, Metric::Cosine).unwrap();
    for i in 0..500 {
        index.insert(format!("r{i}"), vector_for(i), payload(&format!("r{i}"))).unwrap();
    }
    let expected = index.query(&vector_for(10), 3).unwrap();

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| index.query(&vector_for(10), 3).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}
