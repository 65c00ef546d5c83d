//! Built-in weight initializers

use crate::components::Initializer;
use crate::config::Config;
use crate::registry::{Factory, FactoryResult};
use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct ConstantInitializer {
    value: f64,
}

impl Initializer for ConstantInitializer {
    fn name(&self) -> &str {
        "Constant"
    }

    fn initialize(&self, params: &mut DMatrix<f64>) {
        params.fill(self.value);
    }
}

/// `ConstantInitializer`: `value` (default 0)
pub struct ConstantInitializerFactory;

impl Factory<dyn Initializer> for ConstantInitializerFactory {
    fn construct(&self, config: &Config) -> FactoryResult<dyn Initializer> {
        let value = config.f64_or("value", 0.0)?;
        Ok(Some(Box::new(ConstantInitializer { value })))
    }
}

/// Uniform in [low, high); with `xavier` the bound comes from the matrix shape.
pub struct UniformInitializer {
    low: f64,
    high: f64,
    xavier: bool,
    seed: u64,
}

impl Initializer for UniformInitializer {
    fn name(&self) -> &str {
        if self.xavier {
            "Xavier"
        } else {
            "Uniform"
        }
    }

    fn initialize(&self, params: &mut DMatrix<f64>) {
        let (low, high) = if self.xavier {
            let (fan_out, fan_in) = params.shape();
            let bound = (6.0 / (fan_in + fan_out).max(1) as f64).sqrt();
            (-bound, bound)
        } else {
            (self.low, self.high)
        };
        let mut rng = StdRng::seed_from_u64(self.seed);
        for value in params.iter_mut() {
            *value = rng.gen_range(low..high);
        }
    }
}

/// `UniformInitializer`: `low`, `high`, `seed`
pub struct UniformInitializerFactory;

impl Factory<dyn Initializer> for UniformInitializerFactory {
    fn construct(&self, config: &Config) -> FactoryResult<dyn Initializer> {
        let low = config.f64_or("low", -0.05)?;
        let high = config.f64_or("high", 0.05)?;
        if !(low < high) {
            return Err(format!("uniform range is empty: [{}, {})", low, high).into());
        }
        if !(high - low).is_finite() {
            return Err(format!("uniform range is too wide: [{}, {})", low, high).into());
        }
        let seed = config.u64_opt("seed")?.unwrap_or(0);
        Ok(Some(Box::new(UniformInitializer { low, high, xavier: false, seed })))
    }
}

/// `XavierInitializer`: Glorot uniform, `seed`
pub struct XavierInitializerFactory;

impl Factory<dyn Initializer> for XavierInitializerFactory {
    fn construct(&self, config: &Config) -> FactoryResult<dyn Initializer> {
        let seed = config.u64_opt("seed")?.unwrap_or(0);
        Ok(Some(Box::new(UniformInitializer {
            low: 0.0,
            high: 0.0,
            xavier: true,
            seed,
        })))
    }
}
