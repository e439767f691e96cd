//! Train [`Agent`].
mod config;
use crate::{
    record::{
        Record,
        RecordValue::{DateTime, Scalar},
    },
    Agent, Env,
};
use anyhow::Result;
use chrono::Local;
pub use config::TrainerConfig;
use log::{debug, info};

/// Manages the training loop of an agent on an environment.
///
/// # Training loop
///
/// 1. Build [`Env`] with the configured seed.
/// 2. For each episode, reset the environment, then repeat until the episode
///    ends or `max_steps_per_episode` steps are taken:
///     1. `act = agent.get_action(obs)`, `step = env.step(act)`.
///     2. `agent.add_sample(obs, act, step.reward, step.next_state())`.
///     3. If `train_interval` environment steps passed since the last training
///        call, or the episode is over, call `agent.train_model`.
/// 3. Every `eval_interval` episodes, run `eval_episodes` episodes in
///    evaluation mode and record the mean return as `"eval_return"`.
///
/// The agent trains one action dimension per call. The trained dimension
/// rotates over `0..num_actions`. If [`Agent::separate_training`] is `true`,
/// calls alternate between the actor (first) and the critic, and the
/// dimension advances after each actor call.
pub struct Trainer<E: Env> {
    env_config: E::Config,
    config: TrainerConfig,

    /// Dimension trained by the next actor update.
    action_index: usize,

    /// Network trained by the next call when the agent trains separately.
    train_critic: bool,

    /// Environment steps since the last training call.
    steps_since_train: usize,

    env_steps: usize,
}

impl<E: Env> Trainer<E> {
    /// Constructs a trainer.
    pub fn build(config: TrainerConfig, env_config: E::Config) -> Self {
        Self {
            env_config,
            config,
            action_index: 0,
            train_critic: false,
            steps_since_train: 0,
            env_steps: 0,
        }
    }

    /// The number of environment steps taken in training episodes.
    pub fn env_steps(&self) -> usize {
        self.env_steps
    }

    fn train_model<A: Agent>(&mut self, agent: &mut A) -> Result<Record> {
        let separate = agent.separate_training();
        let train_critic = separate && self.train_critic;
        let record = agent.train_model(train_critic, self.action_index)?;
        debug!(
            "train_model(train_critic = {}, action_index = {})",
            train_critic, self.action_index
        );

        if !train_critic {
            self.action_index = (self.action_index + 1) % agent.num_actions().max(1);
        }
        if separate {
            self.train_critic = !self.train_critic;
        }
        self.steps_since_train = 0;

        Ok(record)
    }

    /// Runs a training episode.
    ///
    /// The returned record holds `"return"`, `"steps"` and the record of the
    /// last training call of the episode.
    pub fn train_episode<A: Agent>(&mut self, agent: &mut A, env: &mut E) -> Result<Record> {
        let mut obs = env.reset()?;
        let mut ret = 0.0;
        let mut steps = 0;
        let mut record = Record::empty();

        while steps < self.config.max_steps_per_episode {
            let act = agent.get_action(&obs)?;
            let step = env.step(&act)?;
            agent.add_sample(&obs, act, step.reward, step.next_state())?;
            ret += step.reward;
            steps += 1;
            self.env_steps += 1;
            self.steps_since_train += 1;

            let is_last = step.is_done() || steps == self.config.max_steps_per_episode;
            if is_last || self.steps_since_train >= self.config.train_interval {
                record = self.train_model(agent)?;
            }
            if step.is_done() {
                break;
            }
            obs = step.obs;
        }

        record.insert("return", Scalar(ret));
        record.insert("steps", Scalar(steps as f32));
        Ok(record)
    }

    /// Runs episodes in evaluation mode and returns the mean return.
    ///
    /// Nothing is added to the agent's buffer.
    pub fn evaluate<A: Agent>(&self, agent: &mut A, env: &mut E) -> Result<f32> {
        let n = self.config.eval_episodes.max(1);
        let is_train = agent.is_train();
        agent.eval();

        let mut total = 0.0;
        for _ in 0..n {
            let mut obs = env.reset()?;
            for _ in 0..self.config.max_steps_per_episode {
                let act = agent.get_action(&obs)?;
                let step = env.step(&act)?;
                total += step.reward;
                if step.is_done() {
                    break;
                }
                obs = step.obs;
            }
        }

        if is_train {
            agent.train();
        }
        Ok(total / n as f32)
    }

    /// Trains the agent and returns one record per episode.
    pub fn train<A: Agent>(&mut self, agent: &mut A) -> Result<Vec<Record>> {
        let mut env = E::build(&self.env_config, self.config.seed)?;
        let mut records = Vec::with_capacity(self.config.max_episodes);
        agent.train();

        for episode in 0..self.config.max_episodes {
            let mut record = self.train_episode(agent, &mut env)?;
            record.insert("episode", Scalar(episode as f32));
            record.insert("datetime", DateTime(Local::now()));

            if self.config.eval_interval > 0 && (episode + 1) % self.config.eval_interval == 0 {
                let eval_return = self.evaluate(agent, &mut env)?;
                record.insert("eval_return", Scalar(eval_return));
                info!("Episode {}, eval_return = {}", episode, eval_return);
            }

            info!(
                "Episode {}, return = {:?}, steps = {:?}",
                episode,
                record.get_scalar("return")?,
                record.get_scalar("steps")?
            );
            records.push(record);
        }

        Ok(records)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dummy::{DummyAgent, DummyEnv, DummyEnvConfig};

    #[test]
    fn test_train_calls_at_interval_and_episode_end() -> Result<()> {
        let config = TrainerConfig::default()
            .max_episodes(2)
            .max_steps_per_episode(100)
            .train_interval(3);
        let env_config = DummyEnvConfig { episode_len: 7 };
        let mut agent = DummyAgent::new(2);
        let mut trainer = Trainer::<DummyEnv>::build(config, env_config);
        let records = trainer.train(&mut agent)?;

        // Steps 3, 6, 7 in each episode.
        assert_eq!(agent.calls.len(), 6);
        assert!(agent.calls.iter().all(|(train_critic, _)| !train_critic));
        assert_eq!(
            agent.calls.iter().map(|c| c.1).collect::<Vec<_>>(),
            vec![0, 1, 0, 1, 0, 1]
        );
        assert_eq!(agent.n_samples, 14);
        assert_eq!(trainer.env_steps(), 14);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get_scalar("steps")?, 7.0);
        assert_eq!(records[1].get_scalar("episode")?, 1.0);
        Ok(())
    }

    #[test]
    fn test_separate_training_alternates() -> Result<()> {
        let config = TrainerConfig::default()
            .max_episodes(1)
            .max_steps_per_episode(100)
            .train_interval(1);
        let env_config = DummyEnvConfig { episode_len: 6 };
        let mut agent = DummyAgent::new(2).separate(true);
        Trainer::<DummyEnv>::build(config, env_config).train(&mut agent)?;

        assert_eq!(
            agent.calls,
            vec![
                (false, 0),
                (true, 1),
                (false, 1),
                (true, 0),
                (false, 0),
                (true, 1)
            ]
        );
        Ok(())
    }

    #[test]
    fn test_truncated_episode_keeps_next_state() -> Result<()> {
        let config = TrainerConfig::default()
            .max_episodes(1)
            .max_steps_per_episode(4)
            .train_interval(100);
        let env_config = DummyEnvConfig { episode_len: 10 };
        let mut agent = DummyAgent::new(1);
        let records = Trainer::<DummyEnv>::build(config, env_config).train(&mut agent)?;

        assert_eq!(records[0].get_scalar("steps")?, 4.0);
        assert_eq!(agent.calls.len(), 1);
        assert_eq!(agent.n_terminal, 0);
        Ok(())
    }

    #[test]
    fn test_evaluate_restores_train_mode() -> Result<()> {
        let config = TrainerConfig::default()
            .max_episodes(2)
            .max_steps_per_episode(100)
            .eval_interval(1)
            .eval_episodes(3);
        let env_config = DummyEnvConfig { episode_len: 5 };
        let mut agent = DummyAgent::new(1);
        let records = Trainer::<DummyEnv>::build(config, env_config).train(&mut agent)?;

        assert!(agent.is_train());
        // Each step of the dummy env rewards 1.
        assert_eq!(records[0].get_scalar("eval_return")?, 5.0);
        assert_eq!(agent.n_samples, 10);
        assert_eq!(agent.n_terminal, 2);
        Ok(())
    }
}
