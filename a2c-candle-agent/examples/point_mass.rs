use a2c_candle_agent::a2c::{A2c, A2cConfig, NetConfig};
use a2c_core::{record::Recorder, Agent, Env, Step, Trainer, TrainerConfig};
use a2c_tensorboard::TensorboardRecorder;
use anyhow::Result;
use clap::Parser;
use rand::{rngs::StdRng, Rng, SeedableRng};

const DT: f32 = 0.1;
const MAX_FORCE: f32 = 1.0;
const GOAL_RADIUS: f32 = 0.05;

#[derive(Clone, Debug)]
struct PointMassConfig {
    friction: f32,
}

/// A point mass on a line, pushed toward the origin.
///
/// The state is `[position, velocity]`. The action is a force clipped to
/// `[-MAX_FORCE, MAX_FORCE]`. The episode terminates when the mass rests
/// near the origin.
struct PointMass {
    config: PointMassConfig,
    rng: StdRng,
    x: f32,
    v: f32,
}

fn scale_action(a: f32) -> f32 {
    a.clamp(-1.0, 1.0) * MAX_FORCE
}

impl Env for PointMass {
    type Config = PointMassConfig;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            rng: StdRng::seed_from_u64(seed as u64),
            x: 0.0,
            v: 0.0,
        })
    }

    fn state_dim(&self) -> usize {
        2
    }

    fn reset(&mut self) -> Result<Vec<f32>> {
        self.x = self.rng.gen_range(-1.0..1.0);
        self.v = 0.0;
        Ok(vec![self.x, self.v])
    }

    fn step(&mut self, act: &[f32]) -> Result<Step> {
        let force = scale_action(act[0]);
        self.v += (force - self.config.friction * self.v) * DT;
        self.x = (self.x + self.v * DT).clamp(-2.0, 2.0);

        let at_goal = self.x.abs() < GOAL_RADIUS && self.v.abs() < GOAL_RADIUS;
        let reward = match at_goal {
            true => 1.0,
            false => -self.x.abs(),
        };
        Ok(Step::new(vec![self.x, self.v], reward, at_goal, false))
    }
}

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// The number of training episodes
    #[arg(long, default_value_t = 200)]
    episodes: usize,

    /// Random seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Let the actor predict the policy sigma
    #[arg(long, default_value_t = false)]
    learn_sigma: bool,

    /// Alternate actor and critic training
    #[arg(long, default_value_t = false)]
    separate: bool,

    /// Write metrics to tensorboard in this directory
    #[arg(long)]
    logdir: Option<String>,
}

fn create_agent(args: &Args, env: &PointMass) -> Result<A2c> {
    let config = A2cConfig::default()
        .num_actions(1)
        .actor(NetConfig::default().units(vec![32, 32]).learning_rate(1e-3, 1e-4, 1e-4))
        .critic(NetConfig::default().units(vec![32, 32]).learning_rate(1e-3, 1e-4, 1e-4))
        .critic_epochs(5)
        .separate_training(args.separate);
    let config = match args.learn_sigma {
        true => config.sigma_predicted(),
        false => config.sigma_given(0.5, 0.05, 1e-3),
    };
    let recorder = match &args.logdir {
        Some(logdir) => Some(Box::new(TensorboardRecorder::new(logdir)) as Box<dyn Recorder>),
        None => None,
    };

    A2c::build(config, env, recorder, StdRng::seed_from_u64(args.seed))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let env_config = PointMassConfig { friction: 0.5 };
    let mut env = PointMass::build(&env_config, args.seed as i64)?;
    let mut agent = create_agent(&args, &env)?;

    let trainer_config = TrainerConfig::default()
        .max_episodes(args.episodes)
        .max_steps_per_episode(100)
        .train_interval(20)
        .eval_interval(20)
        .eval_episodes(5)
        .seed(args.seed as i64);
    let mut trainer = Trainer::<PointMass>::build(trainer_config, env_config);
    let records = trainer.train(&mut agent)?;

    let last = records
        .iter()
        .rev()
        .find_map(|r| r.get_scalar("eval_return").ok());
    println!("Final evaluation return: {:?}", last);

    // A rollout with the forces actually applied written to the scaled streams.
    let mut obs = env.reset()?;
    for _ in 0..100 {
        let act = agent.get_action(&obs)?;
        agent.report_scaled_action(&[scale_action(act[0])])?;
        let step = env.step(&act)?;
        if step.is_done() {
            break;
        }
        obs = step.obs;
    }
    agent.dispose()?;

    Ok(())
}
