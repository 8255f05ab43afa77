use domain::models::{IndexedPassage, Passage};
use rayon::prelude::*;

pub struct SearchEngine;

impl SearchEngine {
    pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            // Zero-magnitude vectors score 0 so the ordering stays total.
            return 0.0;
        }
        dot_product / (norm_a * norm_b)
    }

    /// The k nearest stored passages to the query vector, similarity
    /// descending. An empty index yields an empty result, never an error.
    pub fn top_k(
        query_vector: &[f32],
        indexed: &[IndexedPassage],
        k: usize,
    ) -> Vec<Passage> {
        let mut scored: Vec<(f32, &IndexedPassage)> = indexed
            .par_iter()
            .map(|entry| (Self::cosine_similarity(query_vector, &entry.vector), entry))
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored
            .into_iter()
            .take(k)
            .map(|(_, entry)| entry.passage.clone())
            .collect()
    }
}
