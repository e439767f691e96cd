//! Configuration of the A2C agent.
use crate::{opt::OptimizerConfig, Activation, Device};
use a2c_core::{error::A2cError, util::ExpSchedule};
use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

fn invalid(msg: String) -> Result<()> {
    Err(A2cError::InvalidConfig(msg).into())
}

/// Configuration of the actor or the critic network.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct NetConfig {
    /// Widths of the hidden layers.
    pub units: Vec<usize>,

    /// Optimizer. Its learning rate is overridden by `lr_max`.
    pub opt_config: OptimizerConfig,

    /// Initial learning rate.
    pub lr_max: f64,

    /// Asymptotic learning rate.
    pub lr_min: f64,

    /// Decay factor of the learning rate per step.
    pub lr_decay: f64,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            units: vec![64, 64],
            opt_config: OptimizerConfig::default(),
            lr_max: 1e-3,
            lr_min: 1e-5,
            lr_decay: 1e-4,
        }
    }
}

impl NetConfig {
    /// Sets the widths of the hidden layers.
    pub fn units(mut self, v: Vec<usize>) -> Self {
        self.units = v;
        self
    }

    /// Sets the optimizer.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }

    /// Sets the learning rate schedule.
    pub fn learning_rate(mut self, lr_max: f64, lr_min: f64, lr_decay: f64) -> Self {
        self.lr_max = lr_max;
        self.lr_min = lr_min;
        self.lr_decay = lr_decay;
        self
    }

    /// Schedule of the learning rate.
    pub fn lr_schedule(&self) -> ExpSchedule {
        ExpSchedule::new(self.lr_max, self.lr_min, self.lr_decay)
    }

    fn check(&self, name: &str) -> Result<()> {
        check_schedule(
            &format!("{} learning rate", name),
            self.lr_max,
            self.lr_min,
            self.lr_decay,
        )?;
        if self.lr_max <= 0.0 || self.lr_min < 0.0 {
            return invalid(format!(
                "{} learning rate must be positive, got lr_max = {}, lr_min = {}",
                name, self.lr_max, self.lr_min
            ));
        }
        if self.units.iter().any(|u| *u == 0) {
            return invalid(format!("hidden layers of {} must have positive width", name));
        }
        Ok(())
    }
}

/// A schedule decays monotonically from `start` to `end` only with finite
/// values and a non-negative decay.
fn check_schedule(name: &str, start: f64, end: f64, decay: f64) -> Result<()> {
    if !(start.is_finite() && end.is_finite() && decay.is_finite()) {
        return invalid(format!(
            "{} schedule must be finite, got start = {}, end = {}, decay = {}",
            name, start, end, decay
        ));
    }
    if decay < 0.0 {
        return invalid(format!("{} decay must be non-negative, got {}", name, decay));
    }
    Ok(())
}

/// Bounds of the uniform distribution the weights are initialized from.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Copy)]
pub struct InitBounds {
    /// Lower bound.
    pub lower_bound: f32,

    /// Upper bound.
    pub upper_bound: f32,
}

impl Default for InitBounds {
    fn default() -> Self {
        Self {
            lower_bound: -0.05,
            upper_bound: 0.05,
        }
    }
}

/// Configuration of [`A2c`](super::A2c).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct A2cConfig {
    /// The number of action dimensions.
    pub num_actions: usize,

    /// If `true`, the policy sigma is annealed from `start_sigma` to
    /// `end_sigma`. Otherwise the actor predicts it.
    pub sigma_given: bool,

    /// Initial policy sigma.
    pub start_sigma: f64,

    /// Asymptotic policy sigma.
    pub end_sigma: f64,

    /// Decay factor of the policy sigma per training step.
    pub sigma_decay: f64,

    /// Actor network.
    pub actor: NetConfig,

    /// Critic network.
    pub critic: NetConfig,

    /// Epochs of the critic regression per training call.
    pub critic_epochs: usize,

    /// Weight initialization.
    pub init_bounds: InitBounds,

    /// Activation function of the hidden layers.
    pub activation: Activation,

    /// Train only the network selected by each training call.
    pub separate_training: bool,

    /// Write losses, advantages and rewards to the recorder.
    pub report_losses: bool,

    /// Device.
    pub device: Device,
}

impl Default for A2cConfig {
    fn default() -> Self {
        Self {
            num_actions: 1,
            sigma_given: true,
            start_sigma: 0.5,
            end_sigma: 0.05,
            sigma_decay: 1e-3,
            actor: NetConfig::default(),
            critic: NetConfig::default(),
            critic_epochs: 1,
            init_bounds: InitBounds::default(),
            activation: Activation::ReLU,
            separate_training: false,
            report_losses: true,
            device: Device::Cpu,
        }
    }
}

impl A2cConfig {
    /// Sets the number of action dimensions.
    pub fn num_actions(mut self, v: usize) -> Self {
        self.num_actions = v;
        self
    }

    /// Anneals sigma from `start` to `end` instead of predicting it.
    pub fn sigma_given(mut self, start: f64, end: f64, decay: f64) -> Self {
        self.sigma_given = true;
        self.start_sigma = start;
        self.end_sigma = end;
        self.sigma_decay = decay;
        self
    }

    /// Lets the actor predict sigma.
    pub fn sigma_predicted(mut self) -> Self {
        self.sigma_given = false;
        self
    }

    /// Sets the actor network.
    pub fn actor(mut self, v: NetConfig) -> Self {
        self.actor = v;
        self
    }

    /// Sets the critic network.
    pub fn critic(mut self, v: NetConfig) -> Self {
        self.critic = v;
        self
    }

    /// Sets the epochs of the critic regression.
    pub fn critic_epochs(mut self, v: usize) -> Self {
        self.critic_epochs = v;
        self
    }

    /// Sets the bounds of the weight initialization.
    pub fn init_bounds(mut self, lower_bound: f32, upper_bound: f32) -> Self {
        self.init_bounds = InitBounds {
            lower_bound,
            upper_bound,
        };
        self
    }

    /// Sets the activation function of the hidden layers.
    pub fn activation(mut self, v: Activation) -> Self {
        self.activation = v;
        self
    }

    /// Sets separate training of actor and critic.
    pub fn separate_training(mut self, v: bool) -> Self {
        self.separate_training = v;
        self
    }

    /// Sets reporting of losses.
    pub fn report_losses(mut self, v: bool) -> Self {
        self.report_losses = v;
        self
    }

    /// Sets the device.
    pub fn device(mut self, v: Device) -> Self {
        self.device = v;
        self
    }

    /// Schedule of the policy sigma.
    pub fn sigma_schedule(&self) -> ExpSchedule {
        ExpSchedule::new(self.start_sigma, self.end_sigma, self.sigma_decay)
    }

    /// Checks consistency of the configuration.
    pub fn check(&self) -> Result<()> {
        if self.num_actions == 0 {
            return invalid("num_actions must be positive".to_string());
        }
        if self.init_bounds.lower_bound > self.init_bounds.upper_bound {
            return invalid(format!(
                "lower_bound {} is larger than upper_bound {}",
                self.init_bounds.lower_bound, self.init_bounds.upper_bound
            ));
        }
        if self.sigma_given {
            check_schedule("sigma", self.start_sigma, self.end_sigma, self.sigma_decay)?;
            if self.start_sigma <= 0.0 || self.end_sigma <= 0.0 {
                return invalid(format!(
                    "sigma must be positive, got start_sigma = {}, end_sigma = {}",
                    self.start_sigma, self.end_sigma
                ));
            }
        }
        if self.critic_epochs == 0 {
            return invalid("critic_epochs must be positive".to_string());
        }
        self.actor.check("actor")?;
        self.critic.check("critic")
    }

    /// Constructs [`A2cConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        info!("Load config of A2C agent from {}", path_.to_str().unwrap_or("?"));
        Ok(b)
    }

    /// Saves [`A2cConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        info!("Save config of A2C agent into {}", path_.to_str().unwrap_or("?"));
        Ok(())
    }
}
