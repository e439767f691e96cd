//! Experience buffer of the agent.
//!
//! [`Memory`] keeps [`Transition`]s until the next training call drains it.
//! It has no capacity bound: the owner is expected to drain it every training
//! cycle, otherwise it grows without limit.
use rand::Rng;

/// One observed step `(s_t, a_t, r_t, s_t+1)`.
///
/// `S` is the state representation chosen by the agent, typically a tensor.
#[derive(Clone, Debug)]
pub struct Transition<S> {
    /// State in which the action was taken.
    pub state: S,

    /// Action vector, one element per action dimension.
    pub action: Vec<f32>,

    /// Reward.
    pub reward: f32,

    /// State after the action, `None` if the episode terminated.
    pub next_state: Option<S>,
}

impl<S> Transition<S> {
    /// Constructs a [`Transition`].
    pub fn new(state: S, action: Vec<f32>, reward: f32, next_state: Option<S>) -> Self {
        Self {
            state,
            action,
            reward,
            next_state,
        }
    }

    /// Returns `true` if no next state is known.
    pub fn is_terminal(&self) -> bool {
        self.next_state.is_none()
    }
}

/// The number of transitions taken by [`Memory::sample`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleSize {
    /// Every stored transition, in random order.
    All,

    /// At most the given number of distinct transitions.
    Count(usize),
}

impl From<i64> for SampleSize {
    /// Negative values select [`SampleSize::All`].
    fn from(n: i64) -> Self {
        match n < 0 {
            true => SampleSize::All,
            false => SampleSize::Count(n as usize),
        }
    }
}

/// An order-preserving store of transitions with sampling without replacement.
#[derive(Debug)]
pub struct Memory<S> {
    samples: Vec<Transition<S>>,
}

impl<S> Default for Memory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Memory<S> {
    /// Constructs an empty buffer.
    pub fn new() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    /// Appends a transition.
    pub fn add_sample(&mut self, tr: Transition<S>) {
        self.samples.push(tr);
    }

    /// Returns the number of stored transitions.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns `true` if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns indices of transitions drawn without replacement.
    ///
    /// A pool holds the indices not drawn yet. Each draw picks a uniformly
    /// random position in the pool with one `f64` draw from `rng` and removes
    /// it by swap-and-pop. Drawing stops when `n` indices are taken or the
    /// pool is empty, so `SampleSize::All` yields a uniform permutation.
    pub fn sample_indices<R: Rng + ?Sized>(&self, n: SampleSize, rng: &mut R) -> Vec<usize> {
        let size = self.samples.len();
        let n = match n {
            SampleSize::All => size,
            SampleSize::Count(n) => n,
        };
        let mut pool: Vec<usize> = (0..size).collect();
        let mut ixs = Vec::with_capacity(n.min(size));

        for _ in 0..n {
            if pool.is_empty() {
                break;
            }
            let pos = ((rng.gen::<f64>() * pool.len() as f64) as usize).min(pool.len() - 1);
            ixs.push(pool.swap_remove(pos));
        }

        ixs
    }

    /// Samples transitions without replacement.
    ///
    /// Returns an empty vector if the buffer is empty.
    pub fn sample<R: Rng + ?Sized>(&self, n: SampleSize, rng: &mut R) -> Vec<&Transition<S>> {
        self.sample_indices(n, rng)
            .into_iter()
            .map(|ix| &self.samples[ix])
            .collect()
    }

    /// Takes every transition out of the buffer in the order of `sample(SampleSize::All)`.
    ///
    /// The buffer is empty afterwards. The random draws are the same as those
    /// of [`Memory::sample`] with [`SampleSize::All`].
    pub fn drain_shuffled<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<Transition<S>> {
        let ixs = self.sample_indices(SampleSize::All, rng);
        let mut slots: Vec<Option<Transition<S>>> = self.samples.drain(..).map(Some).collect();
        ixs.into_iter().filter_map(|ix| slots[ix].take()).collect()
    }

    /// Drops every stored transition together with the states it owns.
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
