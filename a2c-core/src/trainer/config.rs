//! Configuration of [`Trainer`](super::Trainer).
use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Trainer`](super::Trainer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TrainerConfig {
    /// The number of training episodes.
    pub max_episodes: usize,

    /// Episodes longer than this are cut off.
    pub max_steps_per_episode: usize,

    /// Interval of training calls in environment steps.
    ///
    /// A training call is also made at the end of every episode.
    pub train_interval: usize,

    /// Interval of evaluation in episodes, `0` disables evaluation.
    pub eval_interval: usize,

    /// The number of episodes per evaluation.
    pub eval_episodes: usize,

    /// Random seed of the environment.
    pub seed: i64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            max_episodes: 100,
            max_steps_per_episode: 200,
            train_interval: 32,
            eval_interval: 0,
            eval_episodes: 5,
            seed: 42,
        }
    }
}

impl TrainerConfig {
    /// Sets the number of training episodes.
    pub fn max_episodes(mut self, v: usize) -> Self {
        self.max_episodes = v;
        self
    }

    /// Sets the maximum length of an episode.
    pub fn max_steps_per_episode(mut self, v: usize) -> Self {
        self.max_steps_per_episode = v;
        self
    }

    /// Sets the interval of training calls in environment steps.
    pub fn train_interval(mut self, v: usize) -> Self {
        self.train_interval = v;
        self
    }

    /// Sets the interval of evaluation in episodes.
    pub fn eval_interval(mut self, v: usize) -> Self {
        self.eval_interval = v;
        self
    }

    /// Sets the number of episodes per evaluation.
    pub fn eval_episodes(mut self, v: usize) -> Self {
        self.eval_episodes = v;
        self
    }

    /// Sets the random seed of the environment.
    pub fn seed(mut self, v: i64) -> Self {
        self.seed = v;
        self
    }

    /// Constructs [`TrainerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        info!("Load config of trainer from {}", path_.to_str().unwrap_or("?"));
        Ok(b)
    }

    /// Saves [`TrainerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        info!("Save config of trainer into {}", path_.to_str().unwrap_or("?"));
        Ok(())
    }
}
