//! Environment step.

/// Represents the outcome `(o_t+1, r_t)` of applying an action to an environment.
#[derive(Clone, Debug)]
pub struct Step {
    /// Observation after the action.
    pub obs: Vec<f32>,

    /// Reward.
    pub reward: f32,

    /// Flag denoting if episode is terminated.
    pub is_terminated: bool,

    /// Flag denoting if episode is truncated.
    pub is_truncated: bool,
}

impl Step {
    /// Constructs a [`Step`] object.
    pub fn new(obs: Vec<f32>, reward: f32, is_terminated: bool, is_truncated: bool) -> Self {
        Step {
            obs,
            reward,
            is_terminated,
            is_truncated,
        }
    }

    #[inline]
    /// Terminated or truncated.
    pub fn is_done(&self) -> bool {
        self.is_terminated || self.is_truncated
    }

    /// Next state to be stored with the transition.
    ///
    /// A terminated episode has no next state. A truncated one does, since the
    /// environment could have continued from it.
    pub fn next_state(&self) -> Option<&[f32]> {
        match self.is_terminated {
            true => None,
            false => Some(&self.obs),
        }
    }
}
