//! Deterministic token-hashing embedder.
//!
//! Maps text to a fixed-dimension bag-of-tokens vector: each token is
//! hashed into a bucket, bucket counts are L2-normalized. The same text
//! always produces the same vector, and texts sharing tokens land in
//! overlapping buckets, so cosine similarity behaves sensibly for the
//! near-duplicate matching the pipeline needs. No model downloads, no
//! native dependencies.

use async_trait::async_trait;

use super::Embedder;
use crate::types::Result;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a over the token bytes. Stable across platforms and releases,
/// unlike the std hasher.
fn fnv1a(token: &str) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for byte in token.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Token-hashing embedding backend.
pub struct HashEmbedder {
    dimension: usize,
    id: String,
}

impl HashEmbedder {
    /// Creates an embedder producing vectors of the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            id: format!("hash-fallback-{dimension}"),
            dimension,
        }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        for token in tokenize(text) {
            let bucket = (fnv1a(token) % self.dimension as u64) as usize;
            vector[bucket] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

/// Alphanumeric runs; everything else is a separator. Input is lowercased
/// by the caller.
fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| self.embed_one(&t.to_lowercase()))
            .collect())
    }

    fn model_id(&self) -> &str {
        &self.id
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::cosine_similarity;

    fn embed(embedder: &HashEmbedder, text: &str) -> Vec<f32> {
        embedder.embed_one(&text.to_lowercase())
    }

    #[test]
    fn same_text_same_vector() {
        let embedder = HashEmbedder::new(64);
        let a = embed(&embedder, "Rust is a systems language");
        let b = embed(&embedder, "Rust is a systems language");
        assert_eq!(a, b);
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn casing_and_punctuation_do_not_matter() {
        let embedder = HashEmbedder::new(64);
        let a = embed(&embedder, "What is Rust?");
        let b = embed(&embedder, "what is rust");
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn shared_tokens_give_positive_similarity() {
        let embedder = HashEmbedder::new(256);
        let a = embed(&embedder, "rust memory safety guarantees");
        let b = embed(&embedder, "rust memory model");
        let c = embed(&embedder, "banana smoothie recipe");
        assert!(cosine_similarity(&a, &b) > cosine_similarity(&a, &c));
        assert!(cosine_similarity(&a, &b) > 0.0);
    }

    #[test]
    fn empty_text_is_zero_vector() {
        let embedder = HashEmbedder::new(32);
        let v = embed(&embedder, "   ...   ");
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn vectors_are_unit_length() {
        let embedder = HashEmbedder::new(128);
        let v = embed(&embedder, "normalization keeps magnitudes comparable");
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn batch_preserves_order_and_length() {
        let embedder = HashEmbedder::new(64);
        let texts = vec![
            "first text".to_string(),
            "second text".to_string(),
            "third text".to_string(),
        ];
        let vectors = embedder.embed(&texts).await.unwrap();
        assert_eq!(vectors.len(), 3);
        assert_eq!(vectors[0], embed(&embedder, "first text"));
        assert_eq!(vectors[2], embed(&embedder, "third text"));
    }

    #[test]
    fn model_id_encodes_dimension() {
        assert_eq!(HashEmbedder::new(256).model_id(), "hash-fallback-256");
        assert_ne!(
            HashEmbedder::new(128).model_id(),
            HashEmbedder::new(256).model_id()
        );
    }
}
