//! Built-in optimizers. Both are sized against the model they will update.

use crate::components::{Model, Optimizer};
use crate::config::Config;
use crate::error::{ComponentError, FactoryError};
use crate::registry::{FactoryResult, OptimizerFactory};
use nalgebra::DMatrix;

fn check_shape(expected: (usize, usize), actual: (usize, usize)) -> Result<(), ComponentError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ComponentError::ShapeMismatch { expected, actual })
    }
}

fn positive_lr(config: &Config) -> Result<f64, FactoryError> {
    let lr = config.f64_or("lr", 0.01)?;
    if !(lr > 0.0 && lr.is_finite()) {
        return Err(format!("learning rate must be positive, got {}", lr).into());
    }
    Ok(lr)
}

/// Plain gradient descent with optional L2 weight decay
pub struct Sgd {
    lr: f64,
    weight_decay: f64,
    shape: (usize, usize),
}

impl Optimizer for Sgd {
    fn name(&self) -> &str {
        "SGD"
    }

    fn learning_rate(&self) -> f64 {
        self.lr
    }

    fn set_learning_rate(&mut self, lr: f64) {
        self.lr = lr;
    }

    fn step(&mut self, params: &mut DMatrix<f64>, grad: &DMatrix<f64>) -> Result<(), ComponentError> {
        check_shape(self.shape, params.shape())?;
        check_shape(self.shape, grad.shape())?;
        let decay = params.clone() * self.weight_decay;
        *params -= (grad + decay) * self.lr;
        Ok(())
    }
}

/// `SGD`: `lr`, `weight_decay`
pub struct SgdFactory;

impl OptimizerFactory for SgdFactory {
    fn construct(&self, model: &dyn Model, config: &Config) -> FactoryResult<dyn Optimizer> {
        let lr = positive_lr(config)?;
        let weight_decay = config.f64_or("weight_decay", 0.0)?;
        Ok(Some(Box::new(Sgd {
            lr,
            weight_decay,
            shape: model.shape(),
        })))
    }
}

/// Heavy-ball momentum; keeps one velocity buffer the size of the model.
pub struct Momentum {
    lr: f64,
    momentum: f64,
    velocity: DMatrix<f64>,
}

impl Optimizer for Momentum {
    fn name(&self) -> &str {
        "Momentum"
    }

    fn learning_rate(&self) -> f64 {
        self.lr
    }

    fn set_learning_rate(&mut self, lr: f64) {
        self.lr = lr;
    }

    fn step(&mut self, params: &mut DMatrix<f64>, grad: &DMatrix<f64>) -> Result<(), ComponentError> {
        check_shape(self.velocity.shape(), params.shape())?;
        check_shape(self.velocity.shape(), grad.shape())?;
        self.velocity = &self.velocity * self.momentum + grad;
        *params -= &self.velocity * self.lr;
        Ok(())
    }
}

/// `Momentum`: `lr`, `momentum` in [0, 1)
pub struct MomentumFactory;

impl OptimizerFactory for MomentumFactory {
    fn construct(&self, model: &dyn Model, config: &Config) -> FactoryResult<dyn Optimizer> {
        let lr = positive_lr(config)?;
        let momentum = config.f64_or("momentum", 0.9)?;
        if !(0.0..1.0).contains(&momentum) {
            return Err(format!("momentum must be in [0, 1), got {}", momentum).into());
        }
        let (rows, cols) = model.shape();
        Ok(Some(Box::new(Momentum {
            lr,
            momentum,
            velocity: DMatrix::zeros(rows, cols),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::model::LinearModel;

    #[test]
    fn test_sgd_step() {
        let model = LinearModel::new("m", 2, 1);
        let mut opt = SgdFactory
            .construct(&model, &Config::of_type("SGD").with("lr", 0.5))
            .unwrap()
            .unwrap();
        let mut params = DMatrix::from_row_slice(1, 2, &[1.0, 1.0]);
        let grad = DMatrix::from_row_slice(1, 2, &[2.0, -2.0]);
        opt.step(&mut params, &grad).unwrap();
        assert_eq!(params, DMatrix::from_row_slice(1, 2, &[0.0, 2.0]));
    }

    #[test]
    fn test_sgd_rejects_wrong_shape() {
        let model = LinearModel::new("m", 2, 1);
        let mut opt = SgdFactory.construct(&model, &Config::of_type("SGD")).unwrap().unwrap();
        let mut params = DMatrix::zeros(2, 2);
        let grad = DMatrix::zeros(2, 2);
        assert!(matches!(
            opt.step(&mut params, &grad),
            Err(ComponentError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_momentum_buffer_sized_from_model() {
        let model = LinearModel::new("m", 3, 2);
        let mut opt = MomentumFactory
            .construct(&model, &Config::of_type("Momentum").with("lr", 1.0).with("momentum", 0.5))
            .unwrap()
            .unwrap();
        let mut params = DMatrix::zeros(2, 3);
        let grad = DMatrix::from_element(2, 3, 1.0);
        opt.step(&mut params, &grad).unwrap();
        opt.step(&mut params, &grad).unwrap();
        // velocity: 1.0 then 1.5
        assert_eq!(params, DMatrix::from_element(2, 3, -2.5));
    }

    #[test]
    fn test_invalid_hyperparameters() {
        let model = LinearModel::new("m", 1, 1);
        assert!(SgdFactory.construct(&model, &Config::of_type("SGD").with("lr", -1.0)).is_err());
        assert!(MomentumFactory
            .construct(&model, &Config::of_type("Momentum").with("momentum", 1.5))
            .is_err());
    }
}
