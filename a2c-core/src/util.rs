//! Schedules and reward normalization shared by agents.
use serde::{Deserialize, Serialize};

/// Exponential smoothing from `start` toward `end`.
///
/// `value(step) = end + (start - end) * exp(-decay * step)`.
pub fn exp_smoothing(start: f64, end: f64, decay: f64, step: u64) -> f64 {
    end + (start - end) * (-decay * step as f64).exp()
}

/// An annealed quantity such as a learning rate or a policy sigma.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
pub struct ExpSchedule {
    /// Value at step 0.
    pub start: f64,

    /// Asymptotic value.
    pub end: f64,

    /// Decay factor per step.
    pub decay: f64,
}

impl ExpSchedule {
    /// Constructs a schedule.
    pub fn new(start: f64, end: f64, decay: f64) -> Self {
        Self { start, end, decay }
    }

    /// Value of the schedule at `step`.
    pub fn value(&self, step: u64) -> f64 {
        exp_smoothing(self.start, self.end, self.decay, step)
    }
}

/// Divides rewards in place by the running maximum of their magnitudes.
///
/// `max_reward` is raised to the largest `|r|` of the batch if that is larger,
/// and the new running maximum is returned. Rewards are left untouched while
/// the maximum is zero.
pub fn normalize_rewards(rewards: &mut [f32], max_reward: f32) -> f32 {
    let max_reward = rewards
        .iter()
        .fold(max_reward, |m, r| if r.abs() > m { r.abs() } else { m });

    if max_reward > 0.0 {
        rewards.iter_mut().for_each(|r| *r /= max_reward);
    }

    max_reward
}
