//! The scoring pipeline: strategy components plus the facade callers use.

pub mod batch;
pub mod collaborative_filtering;
pub mod content_based;
pub mod hybrid_ranker;
pub mod popularity;
pub mod similarity;

pub use batch::{BatchOrchestrator, BatchOutcome};
pub use collaborative_filtering::CollaborativeFilter;
pub use content_based::ContentBasedFilter;
pub use hybrid_ranker::{HybridBlender, ScoreParams, FALLBACK_SCORE};
pub use popularity::PopularityRanker;
pub use similarity::cosine_similarity;

use std::sync::Arc;

use tracing::info;

use crate::config::BatchConfig;
use crate::error::{AppError, Result};
use crate::models::{EntityId, Recommendation, Snapshot};

/// Score one user against a snapshot. Shared by the synchronous entry
/// point and the batch tasks, so "unknown user" means the same thing on
/// both paths.
fn score_user(
    snapshot: &Snapshot,
    user_id: &str,
    params: &ScoreParams,
) -> Result<Vec<Recommendation>> {
    if !snapshot.is_known(user_id) {
        return Err(AppError::NotFound(format!("unknown user {}", user_id)));
    }

    Ok(HybridBlender::new(snapshot).recommend(user_id, params))
}

/// Facade over the full recommendation pipeline.
///
/// Owns the immutable snapshot for a scoring session; `score` ranks one
/// user synchronously, `batch_score` fans out over many users with bounded
/// concurrency. Both validate parameters up front and reject rather than
/// clamp.
pub struct RecommendationEngine {
    snapshot: Arc<Snapshot>,
    batch_config: BatchConfig,
}

impl RecommendationEngine {
    pub fn new(snapshot: Snapshot) -> Self {
        Self::with_batch_config(snapshot, BatchConfig::default())
    }

    pub fn with_batch_config(snapshot: Snapshot, batch_config: BatchConfig) -> Self {
        Self {
            snapshot: Arc::new(snapshot),
            batch_config,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Rank up to `params.limit` candidates for one user.
    ///
    /// An unknown user id is a `NotFound` error; a known user with no
    /// usable signal gets popularity-backfilled results instead.
    pub fn score(&self, user_id: &str, params: &ScoreParams) -> Result<Vec<Recommendation>> {
        params.validate()?;

        let recommendations = score_user(&self.snapshot, user_id, params)?;

        info!(
            user_id = %user_id,
            returned = recommendations.len(),
            "Scored user"
        );

        Ok(recommendations)
    }

    /// Score a set of users concurrently. Invalid parameters fail the
    /// whole batch up front; per-user failures are recorded in the outcome
    /// without aborting the rest.
    pub async fn batch_score(
        &self,
        user_ids: &[EntityId],
        params: &ScoreParams,
    ) -> Result<BatchOutcome> {
        params.validate()?;

        let orchestrator =
            BatchOrchestrator::new(Arc::clone(&self.snapshot), self.batch_config.clone());
        Ok(orchestrator.run(user_ids, params).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityKind;

    fn snapshot() -> Snapshot {
        let mut snapshot = Snapshot::default();
        snapshot.entities.insert("u1".to_string(), EntityKind::User);
        snapshot.entities.insert("u2".to_string(), EntityKind::User);
        snapshot
            .entities
            .insert("s1".to_string(), EntityKind::Startup);
        snapshot.interactions.insert(
            "u2".to_string(),
            [("s1".to_string(), 5.0)].into_iter().collect(),
        );
        snapshot
            .features
            .insert("s1".to_string(), [("fintech".to_string(), 1.0)].into_iter().collect());
        snapshot
    }

    #[test]
    fn test_unknown_user_is_not_found() {
        let engine = RecommendationEngine::new(snapshot());
        let result = engine.score("ghost", &ScoreParams::new(2, 3, 0.5));
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_known_cold_user_is_not_an_error() {
        let engine = RecommendationEngine::new(snapshot());
        let recs = engine.score("u1", &ScoreParams::new(2, 3, 0.5)).unwrap();

        // Cold but known: backfilled from popularity, not an error.
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].target_id, "s1");
        assert_eq!(recs[0].score, FALLBACK_SCORE);
    }

    #[test]
    fn test_invalid_parameters_rejected_at_entry() {
        let engine = RecommendationEngine::new(snapshot());

        for params in [
            ScoreParams::new(0, 3, 0.5),
            ScoreParams::new(2, 0, 0.5),
            ScoreParams::new(2, 3, 1.5),
        ] {
            assert!(matches!(
                engine.score("u1", &params),
                Err(AppError::InvalidParameter(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_batch_rejects_invalid_parameters_up_front() {
        let engine = RecommendationEngine::new(snapshot());
        let result = engine
            .batch_score(&["u1".to_string()], &ScoreParams::new(2, 3, -1.0))
            .await;
        assert!(matches!(result, Err(AppError::InvalidParameter(_))));
    }
}
