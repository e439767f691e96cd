//! Environment and agent used in tests.
use crate::{
    record::{Record, RecordValue},
    Agent, Env, Step,
};
use anyhow::Result;

#[derive(Clone, Debug)]
pub struct DummyEnvConfig {
    pub episode_len: usize,
}

/// Terminates after `episode_len` steps, rewarding 1 per step.
pub struct DummyEnv {
    episode_len: usize,
    t: usize,
}

impl Env for DummyEnv {
    type Config = DummyEnvConfig;

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        Ok(Self {
            episode_len: config.episode_len,
            t: 0,
        })
    }

    fn state_dim(&self) -> usize {
        1
    }

    fn reset(&mut self) -> Result<Vec<f32>> {
        self.t = 0;
        Ok(vec![0.0])
    }

    fn step(&mut self, _act: &[f32]) -> Result<Step> {
        self.t += 1;
        Ok(Step::new(
            vec![self.t as f32],
            1.0,
            self.t >= self.episode_len,
            false,
        ))
    }
}

/// Records how it was called.
pub struct DummyAgent {
    num_actions: usize,
    separate_training: bool,
    train: bool,
    pub calls: Vec<(bool, usize)>,
    pub n_samples: usize,
    pub n_terminal: usize,
}

impl DummyAgent {
    pub fn new(num_actions: usize) -> Self {
        Self {
            num_actions,
            separate_training: false,
            train: true,
            calls: vec![],
            n_samples: 0,
            n_terminal: 0,
        }
    }

    pub fn separate(mut self, v: bool) -> Self {
        self.separate_training = v;
        self
    }
}

impl Agent for DummyAgent {
    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }

    fn num_actions(&self) -> usize {
        self.num_actions
    }

    fn separate_training(&self) -> bool {
        self.separate_training
    }

    fn get_action(&mut self, _state: &[f32]) -> Result<Vec<f32>> {
        Ok(vec![0.0; self.num_actions])
    }

    fn add_sample(
        &mut self,
        _state: &[f32],
        _action: Vec<f32>,
        _reward: f32,
        next_state: Option<&[f32]>,
    ) -> Result<()> {
        self.n_samples += 1;
        if next_state.is_none() {
            self.n_terminal += 1;
        }
        Ok(())
    }

    fn train_model(&mut self, train_critic: bool, action_index: usize) -> Result<Record> {
        self.calls.push((train_critic, action_index));
        Ok(Record::from_slice(&[(
            "calls",
            RecordValue::Scalar(self.calls.len() as f32),
        )]))
    }
}
