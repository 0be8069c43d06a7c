//! Trainer configuration
//!
//! Environment variables first, then up to two positional arguments
//! (`<data.csv> [model.json]`) which take precedence.

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use fire_core::model::ForestParams;
use fire_core::training::TrainingConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub data_path: PathBuf,
    pub model_path: PathBuf,
    pub training: TrainingConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_sources(|key| env::var(key).ok(), env::args().skip(1))
    }

    /// Unlike the server, a malformed value here aborts the run.
    pub fn from_sources<F, I>(lookup: F, args: I) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
        I: IntoIterator<Item = String>,
    {
        let defaults = TrainingConfig::default();

        let seed = parse_var(&lookup, "TRAIN_SEED")?.unwrap_or(defaults.seed);
        let test_size = parse_var(&lookup, "TRAIN_TEST_SIZE")?.unwrap_or(defaults.test_size);
        let n_trees = parse_var(&lookup, "TRAIN_TREES")?.unwrap_or(defaults.forest.n_trees);
        let max_depth = parse_var::<usize, _>(&lookup, "TRAIN_MAX_DEPTH")?;

        if n_trees == 0 {
            bail!("TRAIN_TREES must be at least 1");
        }

        let mut data_path = lookup("DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data/forestfires.csv"));
        let mut model_path = lookup("MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("model.json"));

        let mut args = args.into_iter();
        if let Some(path) = args.next() {
            data_path = PathBuf::from(path);
        }
        if let Some(path) = args.next() {
            model_path = PathBuf::from(path);
        }
        if let Some(extra) = args.next() {
            bail!("unexpected argument '{}' (usage: fire-trainer [data.csv] [model.json])", extra);
        }

        Ok(Self {
            data_path,
            model_path,
            training: TrainingConfig {
                test_size,
                seed,
                forest: ForestParams {
                    n_trees,
                    max_depth: max_depth.or(defaults.forest.max_depth),
                    seed,
                    ..defaults.forest
                },
            },
        })
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| raw.trim().parse::<T>().with_context(|| format!("invalid {}: '{}'", key, raw)))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn build(pairs: &[(&str, &str)], args: &[&str]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_sources(
            |key| vars.get(key).cloned(),
            args.iter().map(|a| a.to_string()),
        )
    }

    #[test]
    fn test_defaults() {
        let config = build(&[], &[]).unwrap();
        assert_eq!(config.data_path, PathBuf::from("data/forestfires.csv"));
        assert_eq!(config.model_path, PathBuf::from("model.json"));
        assert_eq!(config.training.seed, 42);
        assert_eq!(config.training.test_size, 0.2);
        assert_eq!(config.training.forest.n_trees, 100);
        assert_eq!(config.training.forest.max_depth, None);
    }

    #[test]
    fn test_env_overrides() {
        let config = build(
            &[
                ("TRAIN_SEED", "7"),
                ("TRAIN_TREES", "25"),
                ("TRAIN_TEST_SIZE", "0.3"),
                ("TRAIN_MAX_DEPTH", "12"),
                ("MODEL_PATH", "/tmp/fire.json"),
            ],
            &[],
        )
        .unwrap();
        assert_eq!(config.training.seed, 7);
        assert_eq!(config.training.forest.seed, 7);
        assert_eq!(config.training.forest.n_trees, 25);
        assert_eq!(config.training.forest.max_depth, Some(12));
        assert_eq!(config.training.test_size, 0.3);
        assert_eq!(config.model_path, PathBuf::from("/tmp/fire.json"));
    }

    #[test]
    fn test_positional_args_win() {
        let config = build(&[("DATA_PATH", "env.csv")], &["cli.csv", "out.json"]).unwrap();
        assert_eq!(config.data_path, PathBuf::from("cli.csv"));
        assert_eq!(config.model_path, PathBuf::from("out.json"));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(build(&[("TRAIN_TREES", "many")], &[]).is_err());
        assert!(build(&[("TRAIN_TREES", "0")], &[]).is_err());
        assert!(build(&[], &["a.csv", "b.json", "c"]).is_err());
    }
}
