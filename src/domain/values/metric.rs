use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Distance metric fixed for the lifetime of one index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Cosine,
    Euclidean,
    Dot,
}

impl Metric {
    /// Identifier written into persisted store headers.
    pub fn id(&self) -> u8 {
        match self {
            Metric::Cosine => 1,
            Metric::Euclidean => 2,
            Metric::Dot => 3,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Metric::Cosine),
            2 => Some(Metric::Euclidean),
            3 => Some(Metric::Dot),
            _ => None,
        }
    }

    /// Raw score between two vectors of equal length.
    ///
    /// Cosine and dot return a similarity, Euclidean returns the L2 distance.
    pub fn score(&self, a: &[f32], b: &[f32]) -> f64 {
        match self {
            Metric::Cosine => cosine_similarity(a, b),
            Metric::Euclidean => euclidean_distance(a, b),
            Metric::Dot => dot_product(a, b),
        }
    }

    pub fn higher_is_better(&self) -> bool {
        !matches!(self, Metric::Euclidean)
    }

    /// Orders two scores so that the better one compares as `Greater`.
    pub fn compare(&self, a: f64, b: f64) -> Ordering {
        let ord = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
        if self.higher_is_better() { ord } else { ord.reverse() }
    }
}

fn dot_product(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| *x as f64 * *y as f64)
        .sum()
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 { 0.0 } else { dot / denom }
}

fn euclidean_distance(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = *x as f64 - *y as f64;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Cosine => write!(f, "cosine"),
            Metric::Euclidean => write!(f, "euclidean"),
            Metric::Dot => write!(f, "dot"),
        }
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cosine" => Ok(Metric::Cosine),
            "euclidean" | "l2" => Ok(Metric::Euclidean),
            "dot" | "dot_product" | "ip" => Ok(Metric::Dot),
            _ => Err(format!("Unknown metric: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_orthogonal_and_parallel() {
        assert!((Metric::Cosine.score(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-9);
        assert_eq!(Metric::Cosine.score(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert!((Metric::Cosine.score(&[1.0, 0.0], &[1.0, 1.0]) - 0.5_f64.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_zero_vector_is_zero() {
        assert_eq!(Metric::Cosine.score(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_euclidean_and_dot() {
        assert!((Metric::Euclidean.score(&[0.0, 0.0], &[3.0, 4.0]) - 5.0).abs() < 1e-9);
        assert!((Metric::Dot.score(&[1.0, 2.0], &[3.0, 4.0]) - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_compare_respects_direction() {
        assert_eq!(Metric::Cosine.compare(0.9, 0.1), Ordering::Greater);
        assert_eq!(Metric::Euclidean.compare(0.9, 0.1), Ordering::Less);
    }

    #[test]
    fn test_id_round_trip_and_parse() {
        for m in [Metric::Cosine, Metric::Euclidean, Metric::Dot] {
            assert_eq!(Metric::from_id(m.id()), Some(m));
            assert_eq!(m.to_string().parse::<Metric>().unwrap(), m);
        }
        assert_eq!(Metric::from_id(0), None);
        assert_eq!("L2".parse::<Metric>().unwrap(), Metric::Euclidean);
        assert!("manhattan".parse::<Metric>().is_err());
    }
}
