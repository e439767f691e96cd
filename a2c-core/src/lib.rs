#![warn(missing_docs)]
//! Core components of the Gaussian advantage actor-critic (A2C) agent.
//!
//! This crate is independent of any tensor backend. It provides
//!
//! * [`Env`] and [`Step`], the boundary to an environment,
//! * [`Agent`], the interface implemented by backend crates such as `a2c-candle-agent`,
//! * [`Memory`] and [`Transition`], the short-lived experience buffer,
//! * [`record`], the reporting sink and training records,
//! * [`util`], schedules and reward normalization shared by agents,
//! * [`Trainer`], a loop driving an agent on an environment.
pub mod error;
pub mod record;
pub mod util;

mod base;
pub use base::{Agent, Env, Step};

mod memory;
pub use memory::{Memory, SampleSize, Transition};

mod trainer;
pub use trainer::{Trainer, TrainerConfig};

#[cfg(test)]
pub(crate) mod dummy;
