//! Forest Fire Risk - offline trainer
//!
//! Reads the historical CSV, fits the forest and writes the model artifact
//! the prediction server loads at startup.

mod config;

use anyhow::Context;

use fire_core::training::{train, RawDataset};

use config::Config;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    log::info!(
        "Training from {} (seed {}, {} trees, test size {})",
        config.data_path.display(),
        config.training.seed,
        config.training.forest.n_trees,
        config.training.test_size
    );

    let dataset = RawDataset::from_path(&config.data_path)
        .with_context(|| format!("Failed to read dataset {}", config.data_path.display()))?;

    let outcome = train(&dataset, &config.training).context("Training failed")?;

    outcome
        .artifact
        .save(&config.model_path)
        .with_context(|| format!("Failed to write model to {}", config.model_path.display()))?;

    log::info!(
        "Model saved to {} ({} trees, {} training rows, {} fire, {} held out)",
        config.model_path.display(),
        outcome.artifact.forest.n_trees(),
        outcome.training_rows,
        outcome.positive_rows,
        outcome.holdout_rows
    );
    log::info!("Checksum: {}", outcome.artifact.checksum);

    Ok(())
}
