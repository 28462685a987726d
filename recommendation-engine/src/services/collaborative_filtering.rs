// ============================================
// Collaborative Filtering (user-based)
// ============================================
//
// k-Nearest-Neighbor collaborative filtering over the interaction matrix:
// rank every other user by interaction-vector cosine similarity, keep the
// top-k, and aggregate their interaction strengths into candidate scores.

use std::collections::HashMap;

use tracing::debug;

use crate::models::{rank_candidates, EntityId, Snapshot, SparseVector};
use crate::services::similarity::cosine_similarity;

pub struct CollaborativeFilter<'a> {
    snapshot: &'a Snapshot,
}

impl<'a> CollaborativeFilter<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self { snapshot }
    }

    /// Rank every other known user by interaction-vector similarity and
    /// keep the `k` most similar, ties broken by id ascending. A user with
    /// no interaction row compares as the empty vector.
    pub fn find_similar_users(&self, user_id: &str, k: usize) -> Vec<(EntityId, f64)> {
        let empty = SparseVector::new();
        let target_row = self.snapshot.interaction_row(user_id).unwrap_or(&empty);

        let similarities: Vec<(EntityId, f64)> = self
            .snapshot
            .user_ids()
            .filter(|other_id| other_id.as_str() != user_id)
            .map(|other_id| {
                let other_row = self.snapshot.interaction_row(other_id).unwrap_or(&empty);
                (other_id.clone(), cosine_similarity(target_row, other_row))
            })
            .collect();

        rank_candidates(similarities, k)
    }

    /// Aggregate neighbor interactions into candidate scores:
    ///
    ///   score[target] = Σ over neighbors of similarity × strength
    ///
    /// counting only targets the user has not already interacted with and
    /// never the user itself. A user with no interactions has zero
    /// similarity to everyone and therefore an empty result — the
    /// cold-start signal the hybrid blender reacts to.
    pub fn recommend(&self, user_id: &str, k: usize, n: usize) -> Vec<(EntityId, f64)> {
        let neighbors = self.find_similar_users(user_id, k);
        let neighbor_count = neighbors.len();

        let mut scores: HashMap<EntityId, f64> = HashMap::new();
        for (neighbor_id, similarity) in neighbors {
            if similarity <= 0.0 {
                // no shared signal
                continue;
            }

            if let Some(row) = self.snapshot.interaction_row(&neighbor_id) {
                for (target_id, strength) in row {
                    if *strength <= 0.0 {
                        continue;
                    }
                    if target_id.as_str() == user_id {
                        continue;
                    }
                    if self.snapshot.has_interacted(user_id, target_id) {
                        continue;
                    }

                    *scores.entry(target_id.clone()).or_insert(0.0) += similarity * strength;
                }
            }
        }

        debug!(
            user_id = %user_id,
            neighbors = neighbor_count,
            candidates = scores.len(),
            "Collaborative aggregation complete"
        );

        rank_candidates(scores.into_iter().collect(), n)
    }
}
