//! Cosine similarity over sparse vectors — the single similarity primitive
//! shared by both filtering strategies.

use crate::models::SparseVector;

/// Cosine similarity between two sparse non-negative vectors.
///
/// Formula: cos(A, B) = (A · B) / (||A|| × ||B||)
///
/// The dot product runs over keys present in both vectors; each norm over
/// that vector's own keys. A zero norm means no signal, so the result is
/// 0.0 rather than an error. Non-negative inputs keep the result in [0, 1].
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f64 {
    let mut dot_product = 0.0;
    let mut norm_a = 0.0;

    for (key, va) in a {
        if let Some(vb) = b.get(key) {
            dot_product += va * vb;
        }
        norm_a += va * va;
    }

    let norm_b: f64 = b.values().map(|v| v * v).sum();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a.sqrt() * norm_b.sqrt())
}
