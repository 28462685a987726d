//! Content-based filtering: derive a weighted feature profile from the
//! items a user has interacted with, then score candidates by profile
//! similarity in feature space.

use tracing::debug;

use crate::models::{rank_candidates, EntityId, Snapshot, SparseVector};
use crate::services::similarity::cosine_similarity;

pub struct ContentBasedFilter<'a> {
    snapshot: &'a Snapshot,
}

impl<'a> ContentBasedFilter<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self { snapshot }
    }

    /// Weighted average of interacted items' feature vectors, weighted by
    /// interaction strength:
    ///
    ///   profile[feature] = Σ strength × weight / Σ strength
    ///
    /// Zero total strength yields the empty profile (the zero vector).
    pub fn build_profile(&self, user_id: &str) -> SparseVector {
        let mut profile = SparseVector::new();
        let mut total_strength = 0.0;

        if let Some(row) = self.snapshot.interaction_row(user_id) {
            for (target_id, strength) in row {
                if *strength <= 0.0 {
                    continue;
                }

                if let Some(features) = self.snapshot.features.get(target_id) {
                    for (feature, weight) in features {
                        *profile.entry(feature.clone()).or_insert(0.0) += strength * weight;
                    }
                }
                total_strength += strength;
            }
        }

        if total_strength > 0.0 {
            for value in profile.values_mut() {
                *value /= total_strength;
            }
        }

        profile
    }

    /// Score every non-interacted entity in the feature matrix against the
    /// user's profile. An empty profile (cold start) yields an empty list;
    /// so does an all-zero-similarity candidate set.
    pub fn recommend(&self, user_id: &str, n: usize) -> Vec<(EntityId, f64)> {
        let profile = self.build_profile(user_id);
        if profile.is_empty() {
            return Vec::new();
        }

        let scored: Vec<(EntityId, f64)> = self
            .snapshot
            .features
            .iter()
            .filter(|(candidate_id, _)| candidate_id.as_str() != user_id)
            .filter(|(candidate_id, _)| !self.snapshot.has_interacted(user_id, candidate_id))
            .map(|(candidate_id, features)| {
                (candidate_id.clone(), cosine_similarity(&profile, features))
            })
            .filter(|(_, score)| *score > 0.0)
            .collect();

        debug!(
            user_id = %user_id,
            candidates = scored.len(),
            "Content-based scoring complete"
        );

        rank_candidates(scored, n)
    }
}
