//! Global popularity ranking, used to backfill results when personalized
//! signal runs short.

use std::collections::HashMap;

use crate::models::{rank_candidates, EntityId, Snapshot};

pub struct PopularityRanker<'a> {
    snapshot: &'a Snapshot,
}

impl<'a> PopularityRanker<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self { snapshot }
    }

    /// Aggregate interaction mass per target summed across all users, most
    /// popular first, ties by id ascending. Targets with zero mass are
    /// omitted — an all-zero column says nothing about popularity.
    pub fn ranking(&self) -> Vec<(EntityId, f64)> {
        let mut mass: HashMap<EntityId, f64> = HashMap::new();
        for row in self.snapshot.interactions.values() {
            for (target_id, strength) in row {
                if *strength > 0.0 {
                    *mass.entry(target_id.clone()).or_insert(0.0) += strength;
                }
            }
        }

        rank_candidates(mass.into_iter().collect(), usize::MAX)
    }

    /// The `n` most popular targets.
    pub fn top(&self, n: usize) -> Vec<(EntityId, f64)> {
        let mut ranking = self.ranking();
        ranking.truncate(n);
        ranking
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sparse(entries: &[(&str, f64)]) -> HashMap<String, f64> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn snapshot() -> Snapshot {
        let mut snapshot = Snapshot::default();
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
    }

    #[test]
    fn test_mass_sums_across_users() {
        let ranking = PopularityRanker::new(&snapshot()).ranking();

        assert_eq!(ranking.len(), 3);
        assert_eq!(ranking[0], ("s2".to_string(), 6.0));
        assert_eq!(ranking[1], ("s1".to_string(), 5.0));
        assert_eq!(ranking[2], ("u1".to_string(), 2.0));
    }

    #[test]
    fn test_equal_mass_breaks_ties_by_id() {
        let mut snapshot = Snapshot::default();
        snapshot
            .interactions
            .insert("u1".to_string(), sparse(&[("b", 2.0), ("a", 2.0)]));

        let ranking = PopularityRanker::new(&snapshot).ranking();
        let ids: Vec<&str> = ranking.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_zero_strength_carries_no_mass() {
        let mut snapshot = Snapshot::default();
        snapshot
            .interactions
            .insert("u1".to_string(), sparse(&[("a", 0.0), ("b", 1.0)]));

        let ranking = PopularityRanker::new(&snapshot).ranking();
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].0, "b");
    }

    #[test]
    fn test_top_truncates() {
        let top = PopularityRanker::new(&snapshot()).top(2);
        let ids: Vec<&str> = top.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["s2", "s1"]);
    }

    #[test]
    fn test_empty_matrix_has_empty_ranking() {
        let snapshot = Snapshot::default();
        assert!(PopularityRanker::new(&snapshot).ranking().is_empty());
    }
}
