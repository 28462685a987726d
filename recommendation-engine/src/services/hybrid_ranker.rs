// ============================================
// Hybrid Blender
// ============================================
//
// Linear blend of collaborative and content-based scores with popularity
// backfill for cold-start users:
//
//   final = alpha × collaborative + (1 − alpha) × content
//
// Both strategies are oversampled so the merged pool stays large enough
// when the two lists barely overlap.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, Result};
use crate::models::{rank_candidates, EntityId, Recommendation, Snapshot};
use crate::services::collaborative_filtering::CollaborativeFilter;
use crate::services::content_based::ContentBasedFilter;
use crate::services::popularity::PopularityRanker;

/// Fixed score assigned to popularity backfill entries. Marks a result as
/// fallback quality: distinguishable from, and below, a fully confident
/// personalized score of 1.0.
pub const FALLBACK_SCORE: f64 = 0.5;

/// Each strategy is asked for this multiple of the requested limit before
/// the lists are merged.
const OVERSAMPLE_FACTOR: usize = 2;

/// Per-request scoring parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreParams {
    /// Neighbor count `k` for collaborative filtering.
    pub neighbors: usize,

    /// Maximum number of recommendations returned.
    pub limit: usize,

    /// Blend weight: the fraction of the final score attributed to the
    /// collaborative signal; the content-based signal gets the rest.
    pub alpha: f64,
}

impl ScoreParams {
    pub fn new(neighbors: usize, limit: usize, alpha: f64) -> Self {
        Self {
            neighbors,
            limit,
            alpha,
        }
    }

    /// Reject out-of-contract parameters. Validation happens once, at the
    /// engine entry points; the components below never clamp.
    pub fn validate(&self) -> Result<()> {
        if self.neighbors == 0 {
            return Err(AppError::InvalidParameter(
                "neighbor count must be positive".to_string(),
            ));
        }
        if self.limit == 0 {
            return Err(AppError::InvalidParameter(
                "result limit must be positive".to_string(),
            ));
        }
        if !self.alpha.is_finite() || !(0.0..=1.0).contains(&self.alpha) {
            return Err(AppError::InvalidParameter(format!(
                "alpha must be within [0, 1] (got {})",
                self.alpha
            )));
        }
        Ok(())
    }
}

pub struct HybridBlender<'a> {
    snapshot: &'a Snapshot,
}

impl<'a> HybridBlender<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self { snapshot }
    }

    /// Blend both strategies for one user. Parameters are assumed valid —
    /// the engine entry points reject bad input before it gets here.
    ///
    /// Guarantees: never returns the user itself, never returns an entity
    /// the user already interacted with, never exceeds `params.limit`
    /// entries.
    pub fn recommend(&self, user_id: &str, params: &ScoreParams) -> Vec<Recommendation> {
        let pool_size = params.limit.saturating_mul(OVERSAMPLE_FACTOR);

        let collaborative = CollaborativeFilter::new(self.snapshot).recommend(
            user_id,
            params.neighbors,
            pool_size,
        );
        let content = ContentBasedFilter::new(self.snapshot).recommend(user_id, pool_size);

        let mut scores: HashMap<EntityId, f64> = HashMap::new();
        for (target_id, score) in collaborative {
            *scores.entry(target_id).or_insert(0.0) += params.alpha * score;
        }
        for (target_id, score) in content {
            *scores.entry(target_id).or_insert(0.0) += (1.0 - params.alpha) * score;
        }

        let personalized = scores.values().filter(|score| **score > 0.0).count();
        if personalized < params.limit {
            let shortfall = params.limit - personalized;
            let mut backfilled = 0;

            for (target_id, _mass) in PopularityRanker::new(self.snapshot).ranking() {
                if backfilled == shortfall {
                    break;
                }
                if scores.contains_key(&target_id)
                    || target_id == user_id
                    || self.snapshot.has_interacted(user_id, &target_id)
                {
                    continue;
                }

                scores.insert(target_id, FALLBACK_SCORE);
                backfilled += 1;
            }

            debug!(
                user_id = %user_id,
                personalized,
                backfilled,
                "Popularity backfill applied"
            );
        }

        rank_candidates(scores.into_iter().collect(), params.limit)
            .into_iter()
            .map(|(target_id, score)| Recommendation {
                kind: self.snapshot.kind_of(&target_id),
                target_id,
                score,
            })
            .collect()
    }
}
