//! Exact brute-force top-k search.
//!
//! Every stored vector is scored against the query and a bounded min-heap keeps
//! the best `k` candidates, so a query costs O(n·d + n·log k). There is no
//! approximate structure in front of this scan: results are exact.

use crate::domain::entities::record::{QueryResult, Record};
use crate::domain::values::metric::Metric;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// A scored record position. `Greater` means "better result".
struct Candidate {
    metric: Metric,
    score: f64,
    position: usize,
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.metric
            .compare(self.score, other.score)
            // earlier insert wins ties
            .then_with(|| other.position.cmp(&self.position))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

/// Returns up to `k` results from `records`, best first.
///
/// Callers validate `query` length and `k > 0`.
pub fn top_k(metric: Metric, records: &[Record], query: &[f32], k: usize) -> Vec<QueryResult> {
    let keep = k.min(records.len());
    if keep == 0 {
        return vec![];
    }

    let mut heap: BinaryHeap<Reverse<Candidate>> = BinaryHeap::with_capacity(keep + 1);
    for (position, record) in records.iter().enumerate() {
        let candidate = Candidate {
            metric,
            score: metric.score(query, &record.vector),
            position,
        };
        if heap.len() < keep {
            heap.push(Reverse(candidate));
        } else if let Some(Reverse(worst)) = heap.peek() {
            if candidate > *worst {
                heap.pop();
                heap.push(Reverse(candidate));
            }
        }
    }

    // Ascending order of Reverse<_> is descending order of candidates.
    heap.into_sorted_vec()
        .into_iter()
        .map(|Reverse(c)| {
            let record = &records[c.position];
            QueryResult {
                record_id: record.id.clone(),
                score: c.score,
                payload: record.payload.clone(),
            }
        })
        .collect()
}
