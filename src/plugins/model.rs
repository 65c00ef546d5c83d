//! Built-in models

use crate::components::Model;
use crate::config::Config;
use crate::error::ComponentError;
use crate::registry::{Factory, FactoryResult};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// y = W x, with W of shape (output_dim, input_dim)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    pub name: String,
    pub weights: DMatrix<f64>,
}

impl LinearModel {
    /// Zero-initialised; an initializer fills the weights before training.
    pub fn new(name: impl Into<String>, input_dim: usize, output_dim: usize) -> Self {
        Self {
            name: name.into(),
            weights: DMatrix::zeros(output_dim, input_dim),
        }
    }
}

impl Model for LinearModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> &DMatrix<f64> {
        &self.weights
    }

    fn parameters_mut(&mut self) -> &mut DMatrix<f64> {
        &mut self.weights
    }

    fn forward(&self, input: &DVector<f64>) -> Result<DVector<f64>, ComponentError> {
        if input.len() != self.weights.ncols() {
            return Err(ComponentError::ShapeMismatch {
                expected: (self.weights.ncols(), 1),
                actual: (input.len(), 1),
            });
        }
        Ok(&self.weights * input)
    }
}

/// `LinearModel`: `input_dim`, `output_dim`, optional `name`
pub struct LinearModelFactory;

impl Factory<dyn Model> for LinearModelFactory {
    fn construct(&self, config: &Config) -> FactoryResult<dyn Model> {
        let input_dim = config.require_usize("input_dim")?;
        let output_dim = config.require_usize("output_dim")?;
        if input_dim == 0 || output_dim == 0 {
            return Err("model dimensions must be positive".into());
        }
        let name = config.str_or("name", "linear")?;
        Ok(Some(Box::new(LinearModel::new(name, input_dim, output_dim))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_forward() {
        let mut model = LinearModel::new("m", 2, 1);
        model.weights[(0, 0)] = 2.0;
        model.weights[(0, 1)] = -1.0;
        let out = model.forward(&DVector::from_vec(vec![3.0, 1.0])).unwrap();
        assert_eq!(out[0], 5.0);
        assert!(model.forward(&DVector::from_vec(vec![1.0])).is_err());
    }

    #[test]
    fn test_factory_requires_dimensions() {
        let config = Config::of_type("LinearModel").with("input_dim", 4).with("output_dim", 2);
        let model = LinearModelFactory.construct(&config).unwrap().unwrap();
        assert_eq!(model.shape(), (2, 4));
        assert_eq!(model.num_parameters(), 8);

        assert!(LinearModelFactory.construct(&Config::of_type("LinearModel")).is_err());
        let zero = Config::of_type("LinearModel").with("input_dim", 0).with("output_dim", 2);
        assert!(LinearModelFactory.construct(&zero).is_err());
    }
}
