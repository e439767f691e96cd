use super::{
    policy::{actor_loss, advantage, sample_gaussian, SIGMA_EPS},
    A2cConfig,
};
use crate::{
    approximator::Approximator,
    mlp::{Mlp, Mlp2, Mlp2Config, MlpConfig},
    model::SubModel1,
    Activation,
};
use a2c_core::{
    error::A2cError,
    record::{MetricKind, Record, RecordValue, Recorder, StreamId},
    util::normalize_rewards,
    Agent, Env, Memory, Transition,
};
use anyhow::Result;
use candle_core::{Device, Tensor};
use log::{debug, info, trace};
use rand::{rngs::StdRng, RngCore, SeedableRng};

/// Streams of one action dimension.
struct ActionStreams {
    mean: StreamId,
    std: StreamId,
    raw_action: StreamId,
    scaled_action: StreamId,
}

/// Streams shared by all action dimensions.
struct TrainingStreams {
    loss_actor: StreamId,
    loss_critic: StreamId,
    advantage: StreamId,
    raw_loss: StreamId,
    reward: StreamId,
}

struct Reporter {
    recorder: Box<dyn Recorder>,
    actions: Vec<ActionStreams>,
    training: TrainingStreams,
    report_losses: bool,
}

impl Reporter {
    fn build(mut recorder: Box<dyn Recorder>, num_actions: usize, report_losses: bool) -> Self {
        let actions = (0..num_actions)
            .map(|i| {
                let report = recorder.create_report(&format!("action_{}", i));
                ActionStreams {
                    mean: recorder.create_metric_stream("mean", MetricKind::Line, report),
                    std: recorder.create_metric_stream("std", MetricKind::Line, report),
                    raw_action: recorder.create_metric_stream(
                        "raw_action",
                        MetricKind::Scatter,
                        report,
                    ),
                    scaled_action: recorder.create_metric_stream(
                        "scaled_action",
                        MetricKind::Scatter,
                        report,
                    ),
                }
            })
            .collect();

        let report = recorder.create_report("training");
        let training = TrainingStreams {
            loss_actor: recorder.create_metric_stream("loss_actor", MetricKind::Line, report),
            loss_critic: recorder.create_metric_stream("loss_critic", MetricKind::Line, report),
            advantage: recorder.create_metric_stream("advantage", MetricKind::Scatter, report),
            raw_loss: recorder.create_metric_stream("raw_loss", MetricKind::Scatter, report),
            reward: recorder.create_metric_stream("reward", MetricKind::Scatter, report),
        };

        Self {
            recorder,
            actions,
            training,
            report_losses,
        }
    }

    fn write_action<F>(&mut self, step: u64, values: &[f32], stream: F)
    where
        F: Fn(&ActionStreams) -> StreamId,
    {
        for (streams, v) in self.actions.iter().zip(values.iter()) {
            self.recorder.write(stream(streams), step as i64, *v);
        }
    }

    fn write_training<F>(&mut self, step: u64, value: f32, stream: F)
    where
        F: Fn(&TrainingStreams) -> StreamId,
    {
        if self.report_losses {
            self.recorder
                .write(stream(&self.training), step as i64, value);
        }
    }
}

/// Advantage actor-critic agent with a Gaussian policy.
///
/// The actor maps a state to the mean of a Gaussian per action dimension,
/// and to its sigma unless the sigma is annealed by a schedule. The critic
/// maps a state to a value regressed on normalized rewards.
///
/// Transitions are kept until [`Agent::train_model`], which trains on all of
/// them in random order and drains the buffer.
pub struct A2c {
    config: A2cConfig,
    state_dim: usize,
    device: Device,
    actor: Approximator<Mlp2>,
    critic: Approximator<Mlp>,
    memory: Memory<Tensor>,
    rng: StdRng,
    reporter: Option<Reporter>,
    current_sigma: f64,
    actor_lr: f64,
    critic_lr: f64,
    max_reward: f32,
    counter: u64,
    counter2: u64,
    train: bool,
}

impl A2c {
    /// Builds the agent.
    ///
    /// `env` is only asked for its state dimension. `rng` drives weight
    /// initialization, buffer shuffling and action sampling.
    pub fn build<E: Env>(
        config: A2cConfig,
        env: &E,
        recorder: Option<Box<dyn Recorder>>,
        mut rng: StdRng,
    ) -> Result<Self> {
        config.check()?;
        let state_dim = env.state_dim();
        if state_dim == 0 {
            return Err(A2cError::InvalidConfig("state dimension must be positive".into()).into());
        }
        let device = config.device.to_candle()?;
        let num_actions = config.num_actions;

        let mut actor = Approximator::<Mlp2>::build(
            "actor",
            Mlp2Config::new(
                state_dim,
                config.actor.units.clone(),
                num_actions,
                config.activation,
                !config.sigma_given,
            ),
            &config.actor.opt_config.clone().learning_rate(config.actor.lr_max),
            device.clone(),
        )?;
        let mut critic = Approximator::<Mlp>::build(
            "critic",
            MlpConfig::new(
                state_dim,
                config.critic.units.clone(),
                1,
                config.activation,
                Activation::Tanh,
            ),
            &config.critic.opt_config.clone().learning_rate(config.critic.lr_max),
            device.clone(),
        )?;

        let seed = rng.next_u64();
        let mut init_rng = StdRng::seed_from_u64(seed);
        let (lo, up) = (config.init_bounds.lower_bound, config.init_bounds.upper_bound);
        actor.init_uniform(&mut init_rng, lo, up)?;
        critic.init_uniform(&mut init_rng, lo, up)?;
        info!(
            "Built A2C agent: state_dim = {}, num_actions = {}, seed = {}",
            state_dim, num_actions, seed
        );

        let reporter = recorder.map(|r| Reporter::build(r, num_actions, config.report_losses));

        Ok(Self {
            state_dim,
            device,
            actor,
            critic,
            memory: Memory::new(),
            rng,
            reporter,
            current_sigma: config.start_sigma,
            actor_lr: config.actor.lr_max,
            critic_lr: config.critic.lr_max,
            max_reward: 0.0,
            counter: 0,
            counter2: 0,
            train: true,
            config,
        })
    }

    /// Configuration of the agent.
    pub fn config(&self) -> &A2cConfig {
        &self.config
    }

    /// The number of actions taken in training mode.
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// The number of actor updates.
    pub fn counter2(&self) -> u64 {
        self.counter2
    }

    /// Running maximum of absolute rewards.
    pub fn max_reward(&self) -> f32 {
        self.max_reward
    }

    /// Sigma of the policy when it is not predicted.
    pub fn current_sigma(&self) -> f64 {
        self.current_sigma
    }

    /// Current learning rate of the actor.
    pub fn actor_learning_rate(&self) -> f64 {
        self.actor_lr
    }

    /// Current learning rate of the critic.
    pub fn critic_learning_rate(&self) -> f64 {
        self.critic_lr
    }

    /// The number of transitions waiting for training.
    pub fn buffer_len(&self) -> usize {
        self.memory.len()
    }

    /// Returns `true` after [`A2c::dispose`].
    pub fn is_disposed(&self) -> bool {
        self.actor.is_disposed()
    }

    fn check_disposed(&self) -> Result<()> {
        match self.is_disposed() {
            true => Err(A2cError::Disposed.into()),
            false => Ok(()),
        }
    }

    fn check_state(&self, state: &[f32]) -> Result<()> {
        match state.len() == self.state_dim {
            true => Ok(()),
            false => Err(A2cError::StateDimMismatch {
                got: state.len(),
                expected: self.state_dim,
            }
            .into()),
        }
    }

    fn check_width(&self, values: &[f32]) -> Result<()> {
        match values.len() == self.config.num_actions {
            true => Ok(()),
            false => Err(A2cError::ActionWidthMismatch {
                got: values.len(),
                expected: self.config.num_actions,
            }
            .into()),
        }
    }

    /// Mean and sigma of the policy for each action dimension.
    pub fn policy(&self, state: &[f32]) -> Result<(Vec<f32>, Vec<f32>)> {
        self.check_disposed()?;
        self.check_state(state)?;
        let xs = Tensor::from_slice(state, (1, self.state_dim), &self.device)?;
        let (mean, sigma) = self.actor.predict(&xs)?;
        let mean = mean.flatten_all()?.to_vec1::<f32>()?;
        let sigma = match sigma {
            Some(sigma) => sigma
                .flatten_all()?
                .to_vec1::<f32>()?
                .into_iter()
                .map(|s| s + SIGMA_EPS as f32)
                .collect(),
            None => vec![self.current_sigma as f32; self.config.num_actions],
        };
        Ok((mean, sigma))
    }

    /// Value of a state estimated by the critic.
    pub fn value(&self, state: &[f32]) -> Result<f32> {
        self.check_disposed()?;
        self.check_state(state)?;
        let xs = Tensor::from_slice(state, (1, self.state_dim), &self.device)?;
        Ok(self.critic.predict(&xs)?.flatten_all()?.to_vec1::<f32>()?[0])
    }

    /// Writes actions scaled by the caller to the per-action streams.
    ///
    /// Points are keyed by the number of actions taken so far.
    pub fn report_scaled_action(&mut self, values: &[f32]) -> Result<()> {
        self.check_width(values)?;
        let counter = self.counter;
        if let Some(reporter) = self.reporter.as_mut() {
            reporter.write_action(counter, values, |s| s.scaled_action);
        }
        Ok(())
    }

    /// Releases both networks, their optimizer state and the buffer.
    ///
    /// Calling it again does nothing. Later calls of `get_action` and
    /// `train_model` fail.
    pub fn dispose(&mut self) -> Result<()> {
        self.actor.dispose()?;
        self.critic.dispose()?;
        self.memory.clear();
        Ok(())
    }

    fn state_tensor(&self, state: &[f32]) -> Result<Tensor> {
        Ok(Tensor::from_slice(state, (self.state_dim,), &self.device)?)
    }

    /// Updates the actor once per transition and returns the mean loss.
    fn train_actor(
        &mut self,
        states: &Tensor,
        actions: &[f32],
        rewards: &[f32],
        advantages: &[f32],
        action_index: usize,
    ) -> Result<f32> {
        let device = self.device.clone();
        let sigma_given = self.config.sigma_given;
        let current_sigma = self.current_sigma as f32;
        let lr_schedule = self.config.actor.lr_schedule();
        let mut loss_sum = 0.0;

        for i in 0..actions.len() {
            let s = states.narrow(0, i, 1)?;
            let a = Tensor::new(&[[actions[i]]], &device)?;
            let adv = Tensor::new(&[[advantages[i]]], &device)?;
            let mut raw_loss = 0.0;

            let loss = self.actor.minimize(|model| {
                let (mean, sigma) = model.forward(&s)?;
                let mu = mean.narrow(1, action_index, 1)?;
                let sigma = match (sigma_given, sigma) {
                    (false, Some(sigma)) => (sigma.narrow(1, action_index, 1)? + SIGMA_EPS)?,
                    _ => Tensor::full(current_sigma, (1, 1), &device)?,
                };
                let (loss, raw) = actor_loss(&a, &mu, &sigma, &adv)?;
                raw_loss = raw.flatten_all()?.to_vec1::<f32>()?[0];
                Ok(loss)
            })?;

            self.counter2 += 1;
            self.actor_lr = lr_schedule.value(self.counter2);
            self.actor.set_learning_rate(self.actor_lr)?;
            loss_sum += loss;

            if let Some(reporter) = self.reporter.as_mut() {
                let step = self.counter2;
                reporter.write_training(step, loss, |s| s.loss_actor);
                reporter.write_training(step, advantages[i], |s| s.advantage);
                reporter.write_training(step, raw_loss, |s| s.raw_loss);
                reporter.write_training(step, rewards[i], |s| s.reward);
            }
        }

        Ok(loss_sum / actions.len() as f32)
    }

    /// Fits the critic to the rewards and returns the loss of the last epoch.
    fn train_critic(&mut self, states: &Tensor, rewards: &[f32]) -> Result<Option<f32>> {
        let ys = Tensor::from_slice(rewards, (rewards.len(), 1), &self.device)?;
        let losses = self.critic.fit(states, &ys, self.config.critic_epochs)?;
        self.critic_lr = self.config.critic.lr_schedule().value(self.counter2);
        self.critic.set_learning_rate(self.critic_lr)?;

        let loss = losses.last().copied();
        if let (Some(reporter), Some(loss)) = (self.reporter.as_mut(), loss) {
            reporter.write_training(self.counter2, loss, |s| s.loss_critic);
        }
        Ok(loss)
    }

    /// Critic values of the states and of the non-terminal next states.
    fn values(&self, batch: &[Transition<Tensor>], states: &Tensor) -> Result<Vec<f32>> {
        let values = self.critic.predict(states)?.flatten_all()?.to_vec1::<f32>()?;

        let next_states = batch
            .iter()
            .filter_map(|tr| tr.next_state.clone())
            .collect::<Vec<_>>();
        let next_values = match next_states.is_empty() {
            true => vec![],
            false => self
                .critic
                .predict(&Tensor::stack(&next_states, 0)?)?
                .flatten_all()?
                .to_vec1::<f32>()?,
        };
        let mut next_values = next_values.into_iter();
        for (i, tr) in batch.iter().enumerate() {
            let next_value = match tr.is_terminal() {
                true => 0.0,
                false => next_values.next().unwrap_or(0.0),
            };
            trace!("value = {}, next_value = {}", values[i], next_value);
        }

        Ok(values)
    }
}

impl Agent for A2c {
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
        self.config.num_actions
    }

    fn separate_training(&self) -> bool {
        self.config.separate_training
    }

    /// Samples an action from the policy.
    ///
    /// In evaluation mode the mean of the policy is returned, and neither the
    /// random source nor the counter advances.
    fn get_action(&mut self, state: &[f32]) -> Result<Vec<f32>> {
        let (mean, sigma) = self.policy(state)?;
        if !self.train {
            return Ok(mean);
        }

        if let Some(reporter) = self.reporter.as_mut() {
            reporter.write_action(self.counter, &mean, |s| s.mean);
            reporter.write_action(self.counter, &sigma, |s| s.std);
        }

        let action = mean
            .iter()
            .zip(sigma.iter())
            .map(|(mu, sigma)| sample_gaussian(&mut self.rng, *mu, *sigma))
            .collect::<Result<Vec<_>>>()?;
        self.counter += 1;

        if let Some(reporter) = self.reporter.as_mut() {
            reporter.write_action(self.counter, &action, |s| s.raw_action);
        }

        Ok(action)
    }

    fn add_sample(
        &mut self,
        state: &[f32],
        action: Vec<f32>,
        reward: f32,
        next_state: Option<&[f32]>,
    ) -> Result<()> {
        self.check_disposed()?;
        self.check_state(state)?;
        self.check_width(&action)?;
        let next_state = match next_state {
            Some(s) => {
                self.check_state(s)?;
                Some(self.state_tensor(s)?)
            }
            None => None,
        };
        let state = self.state_tensor(state)?;
        self.memory
            .add_sample(Transition::new(state, action, reward, next_state));
        Ok(())
    }

    fn train_model(&mut self, train_critic: bool, action_index: usize) -> Result<Record> {
        self.check_disposed()?;
        if action_index >= self.config.num_actions {
            return Err(A2cError::ActionIndexOutOfRange {
                index: action_index,
                num_actions: self.config.num_actions,
            }
            .into());
        }
        if self.memory.is_empty() {
            return Ok(Record::empty());
        }

        let batch = self.memory.drain_shuffled(&mut self.rng);
        let mut rewards = batch.iter().map(|tr| tr.reward).collect::<Vec<_>>();
        self.max_reward = normalize_rewards(&mut rewards, self.max_reward);
        let actions = batch
            .iter()
            .map(|tr| tr.action[action_index])
            .collect::<Vec<_>>();
        let states = Tensor::stack(
            &batch.iter().map(|tr| tr.state.clone()).collect::<Vec<_>>(),
            0,
        )?;

        let (do_actor, do_critic) = match self.config.separate_training {
            true => (!train_critic, train_critic),
            false => (true, true),
        };
        debug!(
            "train_model: batch_size = {}, action_index = {}, actor = {}, critic = {}",
            batch.len(),
            action_index,
            do_actor,
            do_critic
        );

        let mut record = Record::empty();

        if do_actor {
            let values = self.values(&batch, &states)?;
            let advantages = rewards
                .iter()
                .zip(values.iter())
                .map(|(r, v)| advantage(*r, *v))
                .collect::<Vec<_>>();
            let mean_advantage = advantages.iter().sum::<f32>() / advantages.len() as f32;
            let loss = self.train_actor(&states, &actions, &rewards, &advantages, action_index)?;
            record.insert("loss_actor", RecordValue::Scalar(loss));
            record.insert("advantage", RecordValue::Scalar(mean_advantage));
        }

        if do_critic {
            if let Some(loss) = self.train_critic(&states, &rewards)? {
                record.insert("loss_critic", RecordValue::Scalar(loss));
            }
        }

        if self.config.sigma_given {
            self.current_sigma = self.config.sigma_schedule().value(self.counter2);
        }

        record.insert("max_reward", RecordValue::Scalar(self.max_reward));
        record.insert("current_sigma", RecordValue::Scalar(self.current_sigma as f32));
        record.insert("lr_actor", RecordValue::Scalar(self.actor_lr as f32));
        record.insert("lr_critic", RecordValue::Scalar(self.critic_lr as f32));
        record.insert("batch_size", RecordValue::Scalar(batch.len() as f32));
        record.insert("rewards", RecordValue::Array1(rewards));

        Ok(record)
    }
}
