use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::{EmbeddingProvider, InputType};

pub const DEFAULT_DIMENSION: usize = 256;

/// Offline embedder based on signed feature hashing of character uni- and bigrams.
///
/// Character n-grams work for CJK titles as well as Latin text. Output vectors
/// are L2-normalised; text with no characters maps to the zero vector.
#[derive(Debug, Clone)]
pub struct HashingProvider {
    dimension: usize,
}

impl HashingProvider {
    pub fn new(dimension: usize) -> Result<Self, DomainError> {
        if dimension == 0 {
            return Err(DomainError::InvalidInput(
                "Embedding dimension must be at least 1".into(),
            ));
        }
        Ok(Self { dimension })
    }

    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.dimension];
        let chars: Vec<char> = text
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(|c| c.to_lowercase())
            .collect();

        let mut buf = [0u8; 8];
        for c in &chars {
            self.accumulate(&mut vector, c.encode_utf8(&mut buf).as_bytes(), 1.0);
        }
        for pair in chars.windows(2) {
            let gram: String = pair.iter().collect();
            self.accumulate(&mut vector, gram.as_bytes(), 1.5);
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }

    fn accumulate(&self, vector: &mut [f32], gram: &[u8], weight: f32) {
        let hash = fnv1a(gram);
        let bucket = (hash % self.dimension as u64) as usize;
        let sign = if hash >> 63 == 1 { -1.0 } else { 1.0 };
        vector[bucket] += sign * weight;
    }
}

impl Default for HashingProvider {
    fn default() -> Self {
        Self {
            dimension: DEFAULT_DIMENSION,
        }
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for b in bytes {
        hash ^= *b as u64;
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    hash
}

#[async_trait::async_trait]
impl EmbeddingProvider for HashingProvider {
    async fn embed(
        &self,
        texts: &[String],
        _input_type: InputType,
    ) -> Result<Vec<Vec<f32>>, DomainError> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::values::metric::Metric;

    #[test]
    fn test_deterministic_and_fixed_length() {
        let p = HashingProvider::new(64).unwrap();
        let a = p.embed_one("千恋＊万花");
        assert_eq!(a.len(), 64);
        assert_eq!(a, p.embed_one("千恋＊万花"));
    }

    #[test]
    fn test_normalised() {
        let v = HashingProvider::default().embed_one("Sakura no Uta");
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let v = HashingProvider::default().embed_one("   ");
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_shared_ngrams_score_higher() {
        let p = HashingProvider::default();
        let query = p.embed_one("秽翼的尤斯蒂娅");
        let close = p.embed_one("秽翼的尤斯蒂娅 游戏介绍");
        let far = p.embed_one("Summer Pockets");
        assert!(Metric::Cosine.score(&query, &close) > Metric::Cosine.score(&query, &far));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(HashingProvider::new(0).is_err());
    }
}
