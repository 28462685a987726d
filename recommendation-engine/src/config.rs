use std::time::Duration;

use serde::Deserialize;

use crate::services::hybrid_ranker::ScoreParams;

/// Engine configuration, loaded from `ENGINE_`-prefixed environment
/// variables (with `.env` support). Every field has a default so the demo
/// binary runs with no environment at all.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub scoring: ScoringConfig,
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    /// Neighbor count `k` for collaborative filtering.
    #[serde(default = "default_neighbor_count")]
    pub neighbor_count: usize,

    /// Default number of recommendations per user.
    #[serde(default = "default_result_count")]
    pub result_count: usize,

    /// Blend weight between collaborative and content-based scores.
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// Optional JSON snapshot for the demo binary; the built-in sample
    /// dataset is used when unset.
    #[serde(default)]
    pub snapshot_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    /// Cap on concurrently scored users in a batch.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Per-user deadline in milliseconds for batch tasks; 0 disables it.
    #[serde(default = "default_task_timeout_ms")]
    pub task_timeout_ms: u64,
}

// Default value functions
fn default_neighbor_count() -> usize {
    20
}

fn default_result_count() -> usize {
    10
}

fn default_alpha() -> f64 {
    0.5
}

fn default_max_concurrent() -> usize {
    num_cpus::get()
}

fn default_task_timeout_ms() -> u64 {
    5000
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenv::dotenv().ok();

        let scoring = envy::prefixed("ENGINE_").from_env::<ScoringConfig>()?;
        let batch = envy::prefixed("ENGINE_BATCH_").from_env::<BatchConfig>()?;

        Ok(Config { scoring, batch })
    }
}

impl ScoringConfig {
    /// The configured defaults as per-request parameters.
    pub fn params(&self) -> ScoreParams {
        ScoreParams::new(self.neighbor_count, self.result_count, self.alpha)
    }
}

impl BatchConfig {
    /// Per-task deadline, `None` when disabled.
    pub fn task_timeout(&self) -> Option<Duration> {
        if self.task_timeout_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.task_timeout_ms))
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            neighbor_count: default_neighbor_count(),
            result_count: default_result_count(),
            alpha: default_alpha(),
            snapshot_path: None,
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            task_timeout_ms: default_task_timeout_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.scoring.neighbor_count, 20);
        assert_eq!(config.scoring.result_count, 10);
        assert_eq!(config.scoring.alpha, 0.5);
        assert!(config.scoring.snapshot_path.is_none());
        assert!(config.batch.max_concurrent >= 1);
        assert_eq!(config.batch.task_timeout_ms, 5000);
    }

    #[test]
    fn test_default_params_pass_validation() {
        let config = Config::default();
        assert!(config.scoring.params().validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_disables_deadline() {
        let batch = BatchConfig {
            max_concurrent: 4,
            task_timeout_ms: 0,
        };
        assert!(batch.task_timeout().is_none());

        let batch = BatchConfig {
            max_concurrent: 4,
            task_timeout_ms: 250,
        };
        assert_eq!(batch.task_timeout(), Some(Duration::from_millis(250)));
    }
}
