use std::cmp::Ordering;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{AppError, Result};

/// Opaque entity identifier (a user or a startup).
pub type EntityId = String;

/// Sparse non-negative vector keyed by feature name or entity id.
pub type SparseVector = HashMap<String, f64>;

/// Classifies what a recommended identifier refers to. Output-only: the
/// scoring pipeline never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    User,
    Startup,
}

/// A single ranked recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub target_id: EntityId,
    pub kind: EntityKind,
    pub score: f64,
}

/// Immutable input snapshot for one scoring session.
///
/// Interaction strengths and feature weights are non-negative; a strength
/// of exactly 0 is equivalent to the entry being absent. The engine never
/// mutates a snapshot — batch scoring shares it behind an `Arc`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Known entities and their kind tags.
    #[serde(default)]
    pub entities: HashMap<EntityId, EntityKind>,

    /// Acting user -> target -> interaction strength.
    #[serde(default)]
    pub interactions: HashMap<EntityId, HashMap<EntityId, f64>>,

    /// Entity -> feature weights. Every recommendable entity has an entry,
    /// possibly empty.
    #[serde(default)]
    pub features: HashMap<EntityId, SparseVector>,
}

impl Snapshot {
    /// Load a snapshot from a JSON document.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);
        let snapshot: Snapshot = serde_json::from_reader(reader)?;

        info!(
            entities = snapshot.entities.len(),
            interaction_rows = snapshot.interactions.len(),
            "Loaded snapshot from JSON"
        );

        Ok(snapshot)
    }

    /// Check the numeric invariants the engine assumes: every interaction
    /// strength and feature weight is finite and non-negative. Callers that
    /// assemble snapshots from untrusted sources run this once at the
    /// boundary; the scoring pipeline itself treats its input as valid.
    pub fn validate(&self) -> Result<()> {
        for (user_id, row) in &self.interactions {
            for (target_id, strength) in row {
                if !strength.is_finite() || *strength < 0.0 {
                    return Err(AppError::ValidationError(format!(
                        "interaction {} -> {} has invalid strength {}",
                        user_id, target_id, strength
                    )));
                }
            }
        }

        for (entity_id, vector) in &self.features {
            for (feature, weight) in vector {
                if !weight.is_finite() || *weight < 0.0 {
                    return Err(AppError::ValidationError(format!(
                        "feature {} of {} has invalid weight {}",
                        feature, entity_id, weight
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn is_known(&self, id: &str) -> bool {
        self.entities.contains_key(id)
    }

    /// Interaction row for a user; `None` when the user has no recorded
    /// interactions.
    pub fn interaction_row(&self, user_id: &str) -> Option<&HashMap<EntityId, f64>> {
        self.interactions.get(user_id)
    }

    /// Whether `user_id` has a nonzero recorded interaction with
    /// `target_id`. A zero strength counts as no interaction.
    pub fn has_interacted(&self, user_id: &str, target_id: &str) -> bool {
        self.interactions
            .get(user_id)
            .and_then(|row| row.get(target_id))
            .map(|strength| *strength > 0.0)
            .unwrap_or(false)
    }

    /// Kind tag for an identifier. Ids missing from the entity set classify
    /// as startups in output.
    pub fn kind_of(&self, id: &str) -> EntityKind {
        self.entities.get(id).copied().unwrap_or(EntityKind::Startup)
    }

    /// Ids of known entities tagged as users.
    pub fn user_ids(&self) -> impl Iterator<Item = &EntityId> {
        self.entities
            .iter()
            .filter(|(_, kind)| **kind == EntityKind::User)
            .map(|(id, _)| id)
    }
}

/// Sort `(id, score)` pairs by score descending, ties by id ascending, then
/// truncate to `limit`. Every ranked list the engine produces goes through
/// this, so output ordering is deterministic across runs regardless of map
/// iteration order.
pub fn rank_candidates(
    mut scored: Vec<(EntityId, f64)>,
    limit: usize,
) -> Vec<(EntityId, f64)> {
    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    scored.truncate(limit);
    scored
}
