use std::collections::HashMap;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recommendation_engine::config::Config;
use recommendation_engine::models::{EntityKind, Snapshot};
use recommendation_engine::services::RecommendationEngine;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    tracing::info!(
        "Starting recommendation-engine v{}",
        env!("CARGO_PKG_VERSION")
    );

    let snapshot = match &config.scoring.snapshot_path {
        Some(path) => {
            tracing::info!("Loading snapshot from {}", path);
            let snapshot = Snapshot::from_json_file(path)?;
            snapshot.validate()?;
            snapshot
        }
        None => {
            tracing::info!("No snapshot configured, using the sample dataset");
            sample_snapshot()
        }
    };

    let params = config.scoring.params();
    let engine = RecommendationEngine::with_batch_config(snapshot, config.batch.clone());

    let mut users: Vec<String> = engine.snapshot().user_ids().cloned().collect();
    users.sort();

    // Single-user scoring
    if let Some(user_id) = users.first() {
        let recommendations = engine.score(user_id, &params)?;
        println!("Recommendations for {}:", user_id);
        println!("{}", serde_json::to_string_pretty(&recommendations)?);
    }

    // Concurrent batch scoring over every known user
    let outcome = engine.batch_score(&users, &params).await?;

    println!("\nBatch recommendations:");
    for user_id in &users {
        if let Some(recommendations) = outcome.recommendations.get(user_id) {
            println!("{}: {}", user_id, serde_json::to_string(recommendations)?);
        } else if let Some(error) = outcome.failures.get(user_id) {
            println!("{}: failed ({})", user_id, error);
        }
    }

    Ok(())
}

/// Seed dataset: a fintech founder, two investors, and two startups, with
/// simplified TF-IDF-style feature weights.
fn sample_snapshot() -> Snapshot {
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

    // u1 liked the AI startup; u2 funded the fintech startup and follows
    // its founder; u3 funded the AI startup.
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

fn sparse(entries: &[(&str, f64)]) -> HashMap<String, f64> {
    entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}
