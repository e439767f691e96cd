//! Advantage actor-critic (A2C) agent with a Gaussian policy.
//!
//! Training uses the one-step advantage `r - V(s)`, where `r` is the reward
//! divided by the running maximum of absolute rewards. The value of the next
//! state is not bootstrapped.
mod base;
mod config;
pub mod policy;
pub use base::A2c;
pub use config::{A2cConfig, InitBounds, NetConfig};
