//! Agent.
use crate::record::Record;
use anyhow::Result;

/// Represents a trainable agent with a continuous, multi-dimensional action.
pub trait Agent {
    /// Set the policy to training mode.
    fn train(&mut self);

    /// Set the policy to evaluation mode.
    fn eval(&mut self);

    /// Return if it is in training mode.
    fn is_train(&self) -> bool;

    /// The number of action dimensions.
    fn num_actions(&self) -> usize;

    /// Returns `true` if each training call updates either the actor or the
    /// critic, as chosen by its `train_critic` argument.
    fn separate_training(&self) -> bool {
        false
    }

    /// Takes an action given a state.
    ///
    /// In training mode the action is sampled from the policy.
    fn get_action(&mut self, state: &[f32]) -> Result<Vec<f32>>;

    /// Stores a transition for the next training call.
    ///
    /// `next_state` is `None` when the episode terminated after the action.
    fn add_sample(
        &mut self,
        state: &[f32],
        action: Vec<f32>,
        reward: f32,
        next_state: Option<&[f32]>,
    ) -> Result<()>;

    /// Trains on every stored transition and clears the buffer.
    ///
    /// Only the action dimension `action_index` is trained. `train_critic`
    /// chooses the network when [`Agent::separate_training`] is `true`.
    /// Returns an empty [`Record`] if there was nothing to train on.
    fn train_model(&mut self, train_critic: bool, action_index: usize) -> Result<Record>;
}
