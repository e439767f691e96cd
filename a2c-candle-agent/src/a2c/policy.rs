//! Gaussian policy.
use anyhow::Result;
use candle_core::Tensor;
use rand::{rngs::StdRng, RngCore, SeedableRng};
use rand_distr::{Distribution, Normal};

/// Added to the density before taking its logarithm.
pub const DENSITY_EPS: f64 = 1e-8;

/// Added to a predicted sigma before use.
pub const SIGMA_EPS: f64 = 1e-5;

const SQRT_2PI: f64 = 2.5066282746310002;

/// Density of `Normal(mu, sigma)` at `a`.
pub fn gaussian_density(a: f32, mu: f32, sigma: f32) -> f32 {
    let z = (a - mu) / sigma;
    (-0.5 * z * z).exp() / (sigma * SQRT_2PI as f32)
}

/// Elementwise density of `Normal(mu, sigma)` at `a`.
///
/// All tensors must have the same shape.
pub fn gaussian_density_t(a: &Tensor, mu: &Tensor, sigma: &Tensor) -> Result<Tensor> {
    let z = ((a - mu)? / sigma)?;
    let num = z.sqr()?.affine(-0.5, 0.0)?.exp()?;
    Ok((num / sigma.affine(SQRT_2PI, 0.0)?)?)
}

/// Policy-gradient loss of the actor.
///
/// `raw = -ln(density(a, mu, sigma) + DENSITY_EPS)` per element, and the loss
/// is the mean of `raw * advantage`. The advantage is treated as a constant.
/// Returns `(loss, raw)`.
pub fn actor_loss(
    a: &Tensor,
    mu: &Tensor,
    sigma: &Tensor,
    advantage: &Tensor,
) -> Result<(Tensor, Tensor)> {
    let density = gaussian_density_t(a, mu, sigma)?;
    let raw = (density + DENSITY_EPS)?.log()?.neg()?;
    let loss = (&raw * &advantage.detach())?.mean_all()?;
    Ok((loss, raw))
}

/// One-step advantage.
///
/// The value of the next state does not enter.
pub fn advantage(reward: f32, value: f32) -> f32 {
    reward - value
}

/// Samples from `Normal(mu, sigma)` with a single draw from `rng`.
///
/// `Normal` samples with a ziggurat method that may consume a varying number
/// of values. The sample is therefore taken with a generator seeded from one
/// `u64` of `rng`, so every sampled dimension advances `rng` by exactly one
/// value and later draws stay reproducible for a given seed.
pub fn sample_gaussian<R: RngCore + ?Sized>(rng: &mut R, mu: f32, sigma: f32) -> Result<f32> {
    let mut rng = StdRng::seed_from_u64(rng.next_u64());
    Ok(Normal::new(mu, sigma)?.sample(&mut rng))
}

#[cfg(test)]
mod test {
    use super::*;
    use candle_core::{Device, Var};

    #[test]
    fn test_density_is_symmetric() {
        for &(mu, sigma) in [(0.0f32, 1.0f32), (0.3, 0.1), (-0.7, 2.5)].iter() {
            for &d in [0.0f32, 0.05, 0.5, 3.0].iter() {
                let p1 = gaussian_density(mu + d, mu, sigma);
                let p2 = gaussian_density(mu - d, mu, sigma);
                assert!((p1 - p2).abs() < 1e-6, "{} {}", p1, p2);
            }
        }
    }

    #[test]
    fn test_density_values() -> Result<()> {
        let p = gaussian_density(0.0, 0.0, 1.0);
        assert!((p - 0.398_942_3).abs() < 1e-6);
        let p = gaussian_density(1.0, 0.0, 1.0);
        assert!((p - 0.241_970_7).abs() < 1e-6);

        let a = Tensor::new(&[1.0f32, 0.2, -0.4], &Device::Cpu)?;
        let mu = Tensor::new(&[0.0f32, 0.1, 0.3], &Device::Cpu)?;
        let sigma = Tensor::new(&[1.0f32, 0.1, 0.5], &Device::Cpu)?;
        let ps = gaussian_density_t(&a, &mu, &sigma)?.to_vec1::<f32>()?;
        assert!((ps[0] - gaussian_density(1.0, 0.0, 1.0)).abs() < 1e-6);
        assert!((ps[1] - gaussian_density(0.2, 0.1, 0.1)).abs() < 1e-5);
        assert!((ps[2] - gaussian_density(-0.4, 0.3, 0.5)).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_actor_loss() -> Result<()> {
        let a = Tensor::new(&[[0.5f32]], &Device::Cpu)?;
        let mu = Tensor::new(&[[0.0f32]], &Device::Cpu)?;
        let sigma = Tensor::new(&[[1.0f32]], &Device::Cpu)?;
        let adv = Tensor::new(&[[2.0f32]], &Device::Cpu)?;
        let (loss, raw) = actor_loss(&a, &mu, &sigma, &adv)?;

        let expected_raw = -((gaussian_density(0.5, 0.0, 1.0) as f64 + DENSITY_EPS).ln()) as f32;
        assert!((raw.flatten_all()?.to_vec1::<f32>()?[0] - expected_raw).abs() < 1e-5);
        assert!((loss.to_scalar::<f32>()? - 2.0 * expected_raw).abs() < 1e-5);
        Ok(())
    }

    #[test]
    fn test_positive_advantage_pulls_mean_to_action() -> Result<()> {
        let mu = Var::new(&[[0.0f32]], &Device::Cpu)?;
        let a = Tensor::new(&[[0.5f32]], &Device::Cpu)?;
        let sigma = Tensor::new(&[[0.3f32]], &Device::Cpu)?;
        let adv = Tensor::new(&[[1.0f32]], &Device::Cpu)?;
        let (loss, _) = actor_loss(&a, mu.as_tensor(), &sigma, &adv)?;
        let grads = loss.backward()?;
        let g = grads
            .get(mu.as_tensor())
            .expect("gradient of mu")
            .flatten_all()?
            .to_vec1::<f32>()?;

        // Gradient descent moves mu toward the action.
        assert!(g[0] < 0.0);
        Ok(())
    }

    #[test]
    fn test_sample_gaussian_uses_one_draw() -> Result<()> {
        let mut rng1 = StdRng::seed_from_u64(42);
        let mut rng2 = StdRng::seed_from_u64(42);
        let x1 = sample_gaussian(&mut rng1, 0.2, 0.1)?;
        let x2 = sample_gaussian(&mut rng2, 0.2, 0.1)?;
        assert_eq!(x1, x2);

        let mut rng3 = StdRng::seed_from_u64(42);
        rng3.next_u64();
        assert_eq!(rng1.next_u64(), rng3.next_u64());
        Ok(())
    }

    #[test]
    fn test_advantage_ignores_next_value() {
        assert_eq!(advantage(1.0, 0.25), 0.75);
        assert_eq!(advantage(-0.5, -0.5), 0.0);
    }
}
