//! Built-in agent environments

use crate::components::{AgentEnv, Step};
use crate::config::Config;
use crate::error::ComponentError;
use crate::registry::{Factory, FactoryResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Multi-armed Bernoulli bandit. The observation is the fraction of the
/// episode already played.
pub struct BanditEnv {
    probabilities: Vec<f64>,
    horizon: u32,
    t: u32,
    seed: u64,
    rng: StdRng,
}

impl BanditEnv {
    pub fn new(probabilities: Vec<f64>, horizon: u32, seed: u64) -> Self {
        Self {
            probabilities,
            horizon,
            t: 0,
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn observation(&self) -> Vec<f64> {
        vec![f64::from(self.t) / f64::from(self.horizon)]
    }
}

impl AgentEnv for BanditEnv {
    fn name(&self) -> &str {
        "Bandit"
    }

    fn action_count(&self) -> usize {
        self.probabilities.len()
    }

    fn reset(&mut self) -> Vec<f64> {
        self.t = 0;
        self.rng = StdRng::seed_from_u64(self.seed);
        self.observation()
    }

    fn step(&mut self, action: usize) -> Result<Step, ComponentError> {
        if self.t >= self.horizon {
            return Err(ComponentError::EpisodeFinished);
        }
        let p = *self.probabilities.get(action).ok_or(ComponentError::InvalidAction {
            action,
            available: self.probabilities.len(),
        })?;
        let reward = if self.rng.gen_bool(p) { 1.0 } else { 0.0 };
        self.t += 1;
        Ok(Step {
            observation: self.observation(),
            reward,
            done: self.t >= self.horizon,
        })
    }
}

/// `BanditEnv`: `probabilities` (each in [0, 1]), `horizon`, `seed`
pub struct BanditEnvFactory;

impl Factory<dyn AgentEnv> for BanditEnvFactory {
    fn construct(&self, config: &Config) -> FactoryResult<dyn AgentEnv> {
        let probabilities: Vec<f64> = config.parse("probabilities")?.unwrap_or_else(|| vec![0.2, 0.8]);
        if probabilities.is_empty() || probabilities.iter().any(|p| !(0.0..=1.0).contains(p)) {
            return Err("bandit probabilities must be a non-empty list of values in [0, 1]".into());
        }
        let horizon = u32::try_from(config.usize_or("horizon", 100)?)?;
        if horizon == 0 {
            return Err("horizon must be positive".into());
        }
        let seed = config.u64_opt("seed")?.unwrap_or(0);
        Ok(Some(Box::new(BanditEnv::new(probabilities, horizon, seed))))
    }
}
