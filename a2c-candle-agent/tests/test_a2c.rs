use a2c_candle_agent::a2c::{A2c, A2cConfig, NetConfig};
use a2c_core::{
    error::A2cError,
    record::{BufferedRecorder, Recorder},
    util::ExpSchedule,
    Agent, Env, Step,
};
use anyhow::Result;
use rand::{rngs::StdRng, SeedableRng};

/// Environment of which only the state dimension is used.
struct FixedEnv {
    state_dim: usize,
}

impl Env for FixedEnv {
    type Config = usize;

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        Ok(Self { state_dim: *config })
    }

    fn state_dim(&self) -> usize {
        self.state_dim
    }

    fn reset(&mut self) -> Result<Vec<f32>> {
        Ok(vec![0.0; self.state_dim])
    }

    fn step(&mut self, _act: &[f32]) -> Result<Step> {
        Ok(Step::new(vec![0.0; self.state_dim], 0.0, true, false))
    }
}

fn config() -> A2cConfig {
    A2cConfig::default()
        .num_actions(1)
        .sigma_given(0.1, 0.1, 0.01)
        .actor(NetConfig::default().units(vec![16]))
        .critic(NetConfig::default().units(vec![16]))
}

fn agent(config: A2cConfig, seed: u64) -> Result<A2c> {
    let env = FixedEnv::build(&3, 0)?;
    A2c::build(config, &env, None, StdRng::seed_from_u64(seed))
}

fn agent_with_recorder(config: A2cConfig, seed: u64) -> Result<(A2c, BufferedRecorder)> {
    let env = FixedEnv::build(&3, 0)?;
    let recorder = BufferedRecorder::new();
    let boxed: Box<dyn Recorder> = Box::new(recorder.clone());
    let agent = A2c::build(config, &env, Some(boxed), StdRng::seed_from_u64(seed))?;
    Ok((agent, recorder))
}

const STATE: [f32; 3] = [0.1, -0.2, 0.3];

#[test]
fn test_same_seed_same_actions() -> Result<()> {
    let mut agent1 = agent(config(), 42)?;
    let mut agent2 = agent(config(), 42)?;

    for _ in 0..10 {
        let a1 = agent1.get_action(&STATE)?;
        let a2 = agent2.get_action(&STATE)?;
        assert_eq!(a1.len(), 1);
        assert_eq!(a1, a2);
    }
    assert_eq!(agent1.counter(), 10);
    Ok(())
}

#[test]
fn test_different_seeds_differ() -> Result<()> {
    let mut agent1 = agent(config(), 1)?;
    let mut agent2 = agent(config(), 2)?;
    let a1 = (0..5)
        .map(|_| agent1.get_action(&STATE))
        .collect::<Result<Vec<_>>>()?;
    let a2 = (0..5)
        .map(|_| agent2.get_action(&STATE))
        .collect::<Result<Vec<_>>>()?;
    assert_ne!(a1, a2);
    Ok(())
}

#[test]
fn test_reward_normalization() -> Result<()> {
    let mut agent = agent(config(), 0)?;
    for _ in 0..5 {
        agent.add_sample(&STATE, vec![0.0], 5.0, Some(&STATE))?;
    }
    let record = agent.train_model(false, 0)?;

    assert_eq!(agent.max_reward(), 5.0);
    assert_eq!(record.get_scalar("max_reward")?, 5.0);
    let rewards = record.get_array1("rewards")?;
    assert_eq!(rewards.len(), 5);
    assert!(rewards.iter().all(|r| (r - 1.0).abs() < 1e-6));
    assert_eq!(agent.buffer_len(), 0);

    // Smaller rewards do not lower the running maximum.
    agent.add_sample(&STATE, vec![0.0], -2.0, None)?;
    let record = agent.train_model(false, 0)?;
    assert_eq!(agent.max_reward(), 5.0);
    assert!((record.get_array1("rewards")?[0] + 0.4).abs() < 1e-6);
    Ok(())
}

#[test]
fn test_zero_rewards_stay_zero() -> Result<()> {
    let mut agent = agent(config(), 0)?;
    for _ in 0..3 {
        agent.add_sample(&STATE, vec![0.0], 0.0, Some(&STATE))?;
    }
    let record = agent.train_model(false, 0)?;

    assert_eq!(agent.max_reward(), 0.0);
    assert!(record
        .get_array1("rewards")?
        .iter()
        .all(|r| *r == 0.0 && r.is_finite()));
    assert!(record.get_scalar("loss_actor")?.is_finite());
    Ok(())
}

#[test]
fn test_terminal_and_nonterminal_share_advantage() -> Result<()> {
    let (mut agent, recorder) = agent_with_recorder(config(), 3)?;
    agent.add_sample(&STATE, vec![0.05], 1.0, None)?;
    agent.add_sample(&STATE, vec![0.05], 1.0, Some(&[0.9, 0.9, 0.9]))?;
    agent.train_model(false, 0)?;

    let points = recorder
        .points("training", "advantage")
        .expect("advantage stream");
    assert_eq!(points.len(), 2);
    // Both advantages are computed before the first update.
    assert!((points[0].1 - points[1].1).abs() < 1e-6);
    Ok(())
}

#[test]
fn test_empty_buffer_is_noop() -> Result<()> {
    let mut agent = agent(config(), 0)?;
    let lr = agent.actor_learning_rate();
    let record = agent.train_model(false, 0)?;

    assert!(record.is_empty());
    assert_eq!(agent.counter2(), 0);
    assert_eq!(agent.actor_learning_rate(), lr);
    assert_eq!(agent.max_reward(), 0.0);
    Ok(())
}

#[test]
fn test_schedules_follow_counter2() -> Result<()> {
    let config = config()
        .sigma_given(0.5, 0.1, 0.2)
        .actor(NetConfig::default().units(vec![8]).learning_rate(1e-2, 1e-4, 0.1))
        .critic(NetConfig::default().units(vec![8]).learning_rate(1e-2, 1e-3, 0.05));
    let mut agent = agent(config, 0)?;
    for i in 0..4 {
        agent.add_sample(&STATE, vec![0.1 * i as f32], 1.0, Some(&STATE))?;
    }
    let record = agent.train_model(false, 0)?;

    assert_eq!(agent.counter2(), 4);
    let lr_actor = ExpSchedule::new(1e-2, 1e-4, 0.1).value(4);
    let lr_critic = ExpSchedule::new(1e-2, 1e-3, 0.05).value(4);
    let sigma = ExpSchedule::new(0.5, 0.1, 0.2).value(4);
    assert!((agent.actor_learning_rate() - lr_actor).abs() < 1e-12);
    assert!((agent.critic_learning_rate() - lr_critic).abs() < 1e-12);
    assert!((agent.current_sigma() - sigma).abs() < 1e-12);
    assert!((record.get_scalar("current_sigma")? - sigma as f32).abs() < 1e-6);
    Ok(())
}

#[test]
fn test_separate_training() -> Result<()> {
    let mut agent = agent(config().separate_training(true), 0)?;
    agent.add_sample(&STATE, vec![0.0], 1.0, None)?;
    let record = agent.train_model(true, 0)?;

    assert!(record.get_scalar("loss_critic").is_ok());
    assert!(record.get_scalar("loss_actor").is_err());
    assert_eq!(agent.counter2(), 0);

    agent.add_sample(&STATE, vec![0.0], 1.0, None)?;
    let record = agent.train_model(false, 0)?;
    assert!(record.get_scalar("loss_critic").is_err());
    assert!(record.get_scalar("loss_actor").is_ok());
    assert_eq!(agent.counter2(), 1);
    Ok(())
}

#[test]
fn test_policy_streams() -> Result<()> {
    let (mut agent, recorder) = agent_with_recorder(config().num_actions(2), 0)?;
    let a = agent.get_action(&STATE)?;
    agent.report_scaled_action(&[2.0 * a[0], 2.0 * a[1]])?;

    assert_eq!(
        recorder.reports(),
        vec!["action_0", "action_1", "training"]
    );
    let mean = recorder.points("action_1", "mean").expect("mean stream");
    let std = recorder.points("action_1", "std").expect("std stream");
    let raw = recorder.points("action_1", "raw_action").expect("raw stream");
    let scaled = recorder
        .points("action_1", "scaled_action")
        .expect("scaled stream");
    assert_eq!(mean[0].0, 0);
    assert!((std[0].1 - 0.1).abs() < 1e-6);
    assert_eq!(raw, vec![(1, a[1])]);
    assert_eq!(scaled, vec![(1, 2.0 * a[1])]);
    Ok(())
}

#[test]
fn test_losses_not_reported_when_disabled() -> Result<()> {
    let (mut agent, recorder) = agent_with_recorder(config().report_losses(false), 0)?;
    agent.add_sample(&STATE, vec![0.0], 1.0, None)?;
    agent.train_model(false, 0)?;

    assert_eq!(recorder.points("training", "loss_actor"), Some(vec![]));
    assert_eq!(recorder.points("training", "loss_critic"), Some(vec![]));
    Ok(())
}

#[test]
fn test_learned_sigma() -> Result<()> {
    let mut agent = agent(config().num_actions(3).sigma_predicted(), 0)?;
    let (mean, sigma) = agent.policy(&STATE)?;
    assert_eq!(mean.len(), 3);
    assert!(mean.iter().all(|m| m.abs() < 1.0));
    assert!(sigma.iter().all(|s| *s > 0.0 && *s < 1.1));

    let a = agent.get_action(&STATE)?;
    agent.add_sample(&STATE, a, 0.5, None)?;
    let record = agent.train_model(false, 2)?;
    assert!(record.get_scalar("loss_actor")?.is_finite());
    Ok(())
}

#[test]
fn test_eval_returns_mean() -> Result<()> {
    let mut agent = agent(config(), 0)?;
    agent.eval();
    let a1 = agent.get_action(&STATE)?;
    let a2 = agent.get_action(&STATE)?;
    let (mean, _) = agent.policy(&STATE)?;

    assert_eq!(a1, mean);
    assert_eq!(a1, a2);
    assert_eq!(agent.counter(), 0);
    agent.train();
    assert!(agent.is_train());
    Ok(())
}

#[test]
fn test_invalid_inputs() -> Result<()> {
    let mut agent = agent(config(), 0)?;
    let err = agent.get_action(&[0.0, 1.0]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<A2cError>(),
        Some(A2cError::StateDimMismatch { got: 2, expected: 3 })
    ));

    let err = agent.add_sample(&STATE, vec![0.0, 0.0], 1.0, None).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<A2cError>(),
        Some(A2cError::ActionWidthMismatch { .. })
    ));

    agent.add_sample(&STATE, vec![0.0], 1.0, None)?;
    let err = agent.train_model(false, 1).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<A2cError>(),
        Some(A2cError::ActionIndexOutOfRange { index: 1, num_actions: 1 })
    ));
    assert_eq!(agent.buffer_len(), 1);

    let env = FixedEnv::build(&3, 0)?;
    assert!(A2c::build(config().num_actions(0), &env, None, StdRng::seed_from_u64(0)).is_err());
    Ok(())
}

#[test]
fn test_dispose() -> Result<()> {
    let mut agent = agent(config(), 0)?;
    agent.add_sample(&STATE, vec![0.0], 1.0, None)?;
    agent.dispose()?;
    agent.dispose()?;

    assert!(agent.is_disposed());
    assert_eq!(agent.buffer_len(), 0);
    let err = agent.get_action(&STATE).unwrap_err();
    assert!(matches!(err.downcast_ref::<A2cError>(), Some(A2cError::Disposed)));
    assert!(agent.train_model(false, 0).is_err());

    let err = agent.add_sample(&STATE, vec![0.0], 1.0, None).unwrap_err();
    assert!(matches!(err.downcast_ref::<A2cError>(), Some(A2cError::Disposed)));
    assert_eq!(agent.buffer_len(), 0);
    Ok(())
}
