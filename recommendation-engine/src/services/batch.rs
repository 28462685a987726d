//! Concurrent batch scoring.
//!
//! One logical task per requested user, fanned out over the tokio blocking
//! pool with bounded concurrency. The snapshot is shared read-only behind
//! an `Arc`, so tasks never contend on the data path; per-user failures
//! are captured without aborting the rest of the batch.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::config::BatchConfig;
use crate::error::{AppError, Result};
use crate::models::{EntityId, Recommendation, Snapshot};
use crate::services::hybrid_ranker::ScoreParams;

/// Result of a batch run: per-user recommendation lists, plus the failures
/// recorded against the users that produced none. A user id appears in
/// exactly one of the two maps.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub recommendations: HashMap<EntityId, Vec<Recommendation>>,
    pub failures: HashMap<EntityId, AppError>,
}

pub struct BatchOrchestrator {
    snapshot: Arc<Snapshot>,
    config: BatchConfig,
}

impl BatchOrchestrator {
    pub fn new(snapshot: Arc<Snapshot>, config: BatchConfig) -> Self {
        Self { snapshot, config }
    }

    /// Score every requested user concurrently. Duplicate ids are scored
    /// once. Parameters are assumed validated by the engine entry point.
    ///
    /// Completion order across users is unspecified; only the returned
    /// mapping is the contract.
    pub async fn run(&self, user_ids: &[EntityId], params: &ScoreParams) -> BatchOutcome {
        let mut seen = HashSet::new();
        let unique: Vec<EntityId> = user_ids
            .iter()
            .filter(|id| seen.insert((*id).clone()))
            .cloned()
            .collect();

        let max_concurrent = self.config.max_concurrent.max(1);

        let results: Vec<(EntityId, Result<Vec<Recommendation>>)> = stream::iter(unique)
            .map(|user_id| {
                let snapshot = Arc::clone(&self.snapshot);
                let params = params.clone();
                let deadline = self.config.task_timeout();
                async move {
                    let result = score_task(snapshot, user_id.clone(), params, deadline).await;
                    (user_id, result)
                }
            })
            .buffer_unordered(max_concurrent)
            .collect()
            .await;

        let mut outcome = BatchOutcome::default();
        for (user_id, result) in results {
            match result {
                Ok(recommendations) => {
                    outcome.recommendations.insert(user_id, recommendations);
                }
                Err(error) => {
                    warn!(user_id = %user_id, error = %error, "Batch scoring task failed");
                    outcome.failures.insert(user_id, error);
                }
            }
        }

        debug!(
            scored = outcome.recommendations.len(),
            failed = outcome.failures.len(),
            "Batch scoring complete"
        );

        outcome
    }
}

/// Run one user's pipeline on the blocking pool, bounded by the configured
/// deadline when one is set. A timed-out user is reported as a failure;
/// the batch never blocks on it.
async fn score_task(
    snapshot: Arc<Snapshot>,
    user_id: EntityId,
    params: ScoreParams,
    deadline: Option<Duration>,
) -> Result<Vec<Recommendation>> {
    let compute =
        tokio::task::spawn_blocking(move || super::score_user(&snapshot, &user_id, &params));

    let joined = match deadline {
        Some(deadline) => match tokio::time::timeout(deadline, compute).await {
            Ok(joined) => joined,
            Err(_) => {
                return Err(AppError::DeadlineExceeded(format!(
                    "scoring exceeded {}ms",
                    deadline.as_millis()
                )))
            }
        },
        None => compute.await,
    };

    match joined {
        Ok(result) => result,
        Err(join_error) => Err(AppError::Internal(format!(
            "scoring task panicked: {}",
            join_error
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityKind;
    use crate::services::hybrid_ranker::HybridBlender;

    fn sparse(entries: &[(&str, f64)]) -> HashMap<String, f64> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn snapshot() -> Snapshot {
        let mut snapshot = Snapshot::default();
        for (id, kind) in [
            ("u1", EntityKind::User),
            ("u2", EntityKind::User),
            ("u3", EntityKind::User),
            ("s1", EntityKind::Startup),
            ("s2", EntityKind::Startup),
        ] {
            snapshot.entities.insert(id.to_string(), kind);
        }

        snapshot
            .interactions
            .insert("u1".to_string(), sparse(&[("s2", 1.0)]));
        snapshot
            .interactions
            .insert("u2".to_string(), sparse(&[("s1", 5.0), ("u1", 2.0)]));
        snapshot
            .interactions
            .insert("u3".to_string(), sparse(&[("s2", 5.0)]));

        snapshot
            .features
            .insert("s1".to_string(), sparse(&[("fintech", 1.0), ("seed", 1.0)]));
        snapshot
            .features
            .insert("s2".to_string(), sparse(&[("ai", 1.0), ("series-a", 1.0)]));
        snapshot
            .features
            .insert("u1".to_string(), sparse(&[("fintech", 1.0), ("seed", 1.0)]));
        snapshot.features.insert(
            "u2".to_string(),
            sparse(&[("fintech", 0.5), ("ai", 0.5), ("seed", 1.0)]),
        );
        snapshot
            .features
            .insert("u3".to_string(), sparse(&[("ai", 1.0), ("series-a", 1.0)]));

        snapshot
    }

    fn orchestrator(snapshot: Snapshot) -> BatchOrchestrator {
        BatchOrchestrator::new(Arc::new(snapshot), BatchConfig::default())
    }

    #[tokio::test]
    async fn test_batch_matches_individual_scoring() {
        let snapshot = snapshot();
        let params = ScoreParams::new(2, 3, 0.6);

        let users: Vec<EntityId> =
            vec!["u1".to_string(), "u2".to_string(), "u3".to_string()];
        let outcome = orchestrator(snapshot.clone()).run(&users, &params).await;

        assert!(outcome.failures.is_empty());
        for user_id in &users {
            let individual = HybridBlender::new(&snapshot).recommend(user_id, &params);
            assert_eq!(outcome.recommendations[user_id], individual);
        }
    }

    #[tokio::test]
    async fn test_unknown_user_fails_without_aborting_batch() {
        let users: Vec<EntityId> = vec!["u1".to_string(), "ghost".to_string()];
        let outcome = orchestrator(snapshot())
            .run(&users, &ScoreParams::new(2, 3, 0.6))
            .await;

        assert!(outcome.recommendations.contains_key("u1"));
        assert!(!outcome.recommendations.contains_key("ghost"));
        assert!(matches!(
            outcome.failures.get("ghost"),
            Some(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_users_are_scored_once() {
        let users: Vec<EntityId> = vec!["u1".to_string(), "u1".to_string()];
        let outcome = orchestrator(snapshot())
            .run(&users, &ScoreParams::new(2, 3, 0.6))
            .await;

        assert_eq!(outcome.recommendations.len(), 1);
        assert!(outcome.failures.is_empty());
    }

    #[tokio::test]
    async fn test_empty_batch_is_empty_outcome() {
        let outcome = orchestrator(snapshot())
            .run(&[], &ScoreParams::new(2, 3, 0.6))
            .await;

        assert!(outcome.recommendations.is_empty());
        assert!(outcome.failures.is_empty());
    }

    #[tokio::test]
    async fn test_disabled_deadline_still_scores() {
        let config = BatchConfig {
            max_concurrent: 2,
            task_timeout_ms: 0,
        };
        let orchestrator = BatchOrchestrator::new(Arc::new(snapshot()), config);

        let users: Vec<EntityId> = vec!["u1".to_string()];
        let outcome = orchestrator.run(&users, &ScoreParams::new(2, 3, 0.6)).await;
        assert!(outcome.recommendations.contains_key("u1"));
    }
}
