//! Hybrid recommendation engine for the VentureLink matching platform.
//!
//! Scores and ranks candidate entities (startups, founders, investors) for
//! a user by blending two signals:
//!
//! - **Collaborative filtering**: behavioral co-occurrence between users'
//!   interaction vectors (k-nearest-neighbor over cosine similarity)
//! - **Content-based filtering**: similarity between the user's implied
//!   preference profile and candidate feature vectors
//!
//! with a global-popularity fallback for cold-start users and bounded
//! concurrent batch scoring. All inputs arrive as an immutable [`Snapshot`];
//! the engine owns no storage and performs no I/O on the scoring path.
//!
//! ```rust
//! use recommendation_engine::models::{EntityKind, Snapshot};
//! use recommendation_engine::services::{RecommendationEngine, ScoreParams};
//!
//! let mut snapshot = Snapshot::default();
//! snapshot.entities.insert("u1".into(), EntityKind::User);
//! snapshot.entities.insert("u2".into(), EntityKind::User);
//! snapshot.entities.insert("s1".into(), EntityKind::Startup);
//! snapshot
//!     .interactions
//!     .insert("u2".into(), [("s1".into(), 5.0)].into());
//! snapshot.features.insert("s1".into(), [("fintech".into(), 1.0)].into());
//!
//! let engine = RecommendationEngine::new(snapshot);
//! let ranked = engine.score("u1", &ScoreParams::new(10, 3, 0.5)).unwrap();
//! assert_eq!(ranked[0].target_id, "s1");
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
pub use models::{EntityId, EntityKind, Recommendation, Snapshot};
pub use services::{BatchOutcome, RecommendationEngine, ScoreParams};
