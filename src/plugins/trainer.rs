//! Default trainer: full-batch gradient descent with scheduling and early stopping
//!
//! Provides:
//! - Loss functions (MSE, MAE, Huber) with their gradients
//! - Learning-rate schedules
//! - A two-stage trainer: `prepare` takes the parts, `train` runs the loop

use crate::components::{EpochRecord, Model, TrainHistory, Trainer, TrainingParts};
use crate::config::Config;
use crate::error::ComponentError;
use crate::registry::{Factory, FactoryResult};
use log::info;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Loss functions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LossFunction {
    /// Mean Squared Error
    MSE,
    /// Mean Absolute Error
    MAE,
    /// Huber loss (smooth L1)
    Huber { delta: f64 },
}

impl LossFunction {
    pub fn compute(&self, predicted: &DMatrix<f64>, target: &DMatrix<f64>) -> f64 {
        let diff = target - predicted;
        let n = diff.len().max(1) as f64;
        match self {
            LossFunction::MSE => diff.iter().map(|x| x * x).sum::<f64>() / n,
            LossFunction::MAE => diff.iter().map(|x| x.abs()).sum::<f64>() / n,
            LossFunction::Huber { delta } => {
                diff.iter()
                    .map(|x| {
                        if x.abs() <= *delta {
                            0.5 * x * x
                        } else {
                            delta * (x.abs() - 0.5 * delta)
                        }
                    })
                    .sum::<f64>()
                    / n
            }
        }
    }

    /// d(loss)/d(predicted), elementwise
    pub fn gradient(&self, predicted: &DMatrix<f64>, target: &DMatrix<f64>) -> DMatrix<f64> {
        let residual = predicted - target;
        let n = residual.len().max(1) as f64;
        match self {
            LossFunction::MSE => residual * (2.0 / n),
            LossFunction::MAE => residual.map(|r| r.signum() / n),
            LossFunction::Huber { delta } => residual.map(|r| {
                if r.abs() <= *delta {
                    r / n
                } else {
                    delta * r.signum() / n
                }
            }),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            LossFunction::MSE => "MSE",
            LossFunction::MAE => "MAE",
            LossFunction::Huber { .. } => "Huber",
        }
    }
}

/// Learning rate schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LrSchedule {
    /// Fixed learning rate
    Constant,
    /// Linear decay from lr to min_lr
    LinearDecay { min_lr: f64 },
    /// Cosine annealing
    CosineAnnealing { min_lr: f64 },
    /// Step decay: multiply by factor every step_size epochs
    StepDecay { factor: f64, step_size: u32 },
}

impl LrSchedule {
    pub fn get_lr(&self, base_lr: f64, epoch: u32, total_epochs: u32) -> f64 {
        let progress = f64::from(epoch) / f64::from(total_epochs.max(1));
        match self {
            LrSchedule::Constant => base_lr,
            LrSchedule::LinearDecay { min_lr } => base_lr + (min_lr - base_lr) * progress,
            LrSchedule::CosineAnnealing { min_lr } => {
                min_lr + (base_lr - min_lr) * 0.5 * (1.0 + (std::f64::consts::PI * progress).cos())
            }
            LrSchedule::StepDecay { factor, step_size } => {
                base_lr * factor.powf(f64::from(epoch / (*step_size).max(1)))
            }
        }
    }
}

/// Training configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub epochs: u32,
    pub loss_fn: LossFunction,
    pub lr_schedule: LrSchedule,
    /// Stop early if loss doesn't improve for this many epochs (0 disables)
    pub patience: u32,
    /// Minimum improvement to reset patience counter
    pub min_delta: f64,
    /// Log every N epochs
    pub log_interval: u32,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            epochs: 100,
            loss_fn: LossFunction::MSE,
            lr_schedule: LrSchedule::Constant,
            patience: 20,
            min_delta: 1e-6,
            log_interval: 10,
        }
    }
}

pub struct DefaultTrainer {
    config: TrainConfig,
    parts: Option<TrainingParts>,
}

impl DefaultTrainer {
    pub fn new(config: TrainConfig) -> Self {
        Self { config, parts: None }
    }
}

impl Trainer for DefaultTrainer {
    fn prepare(&mut self, parts: TrainingParts) -> Result<(), ComponentError> {
        if parts.dataset.is_empty() {
            return Err(ComponentError::EmptyDataset(parts.dataset.name().to_string()));
        }
        let expected = (parts.dataset.output_dim(), parts.dataset.input_dim());
        let actual = parts.model.shape();
        if expected != actual {
            return Err(ComponentError::ShapeMismatch { expected, actual });
        }
        info!(
            "Prepared '{}' on '{}' ({} samples) with {} | vocab={}",
            parts.model.name(),
            parts.dataset.name(),
            parts.dataset.len(),
            parts.optimizer.name(),
            parts.tokenizer.as_ref().map_or(0, |t| t.vocab_size()),
        );
        self.parts = Some(parts);
        Ok(())
    }

    fn train(&mut self) -> Result<TrainHistory, ComponentError> {
        let config = &self.config;
        let parts = self.parts.as_mut().ok_or(ComponentError::NotPrepared("DefaultTrainer"))?;
        let (inputs, targets) = parts.dataset.to_matrices();
        let base_lr = parts.optimizer.learning_rate();

        let mut records = Vec::new();
        let mut best_loss = f64::MAX;
        let mut best_epoch = 0u32;
        let mut patience_counter = 0u32;

        info!(
            "Training '{}' for {} epochs | loss={} | lr={:.4} | schedule={:?}",
            parts.model.name(),
            config.epochs,
            config.loss_fn.name(),
            base_lr,
            config.lr_schedule,
        );

        for epoch in 0..config.epochs {
            let lr = config.lr_schedule.get_lr(base_lr, epoch, config.epochs);
            parts.optimizer.set_learning_rate(lr);

            let predicted = parts.model.parameters() * &inputs;
            let loss = config.loss_fn.compute(&predicted, &targets);
            let grad = config.loss_fn.gradient(&predicted, &targets) * inputs.transpose();
            parts.optimizer.step(parts.model.parameters_mut(), &grad)?;

            records.push(EpochRecord { epoch, loss, learning_rate: lr });

            if loss < best_loss - config.min_delta {
                best_loss = loss;
                best_epoch = epoch;
                patience_counter = 0;
            } else {
                patience_counter += 1;
            }

            if config.log_interval > 0 && (epoch % config.log_interval == 0 || epoch + 1 == config.epochs) {
                info!("  epoch={:>4} | loss={:.6} | lr={:.5}", epoch, loss, lr);
            }

            if config.patience > 0 && patience_counter >= config.patience {
                info!("  Early stopping at epoch {} (no improvement for {} epochs)", epoch, config.patience);
                return Ok(TrainHistory {
                    final_loss: loss,
                    best_loss,
                    best_epoch,
                    records,
                    stopped_early: true,
                });
            }
        }

        let final_loss = records.last().map(|r| r.loss).unwrap_or(0.0);
        info!(
            "Training complete: best_loss={:.6} at epoch {} | final_loss={:.6}",
            best_loss, best_epoch, final_loss
        );
        Ok(TrainHistory {
            final_loss,
            best_loss,
            best_epoch,
            records,
            stopped_early: false,
        })
    }

    fn into_model(self: Box<Self>) -> Option<Box<dyn Model>> {
        self.parts.map(|parts| parts.model)
    }
}

/// `DefaultTrainer`: `epochs`, `loss`, `lr_schedule`, `patience`, `min_delta`, `log_interval`.
/// `loss` and `lr_schedule` use serde's enum form, e.g. `"MSE"` or
/// `{"CosineAnnealing": {"min_lr": 0.001}}`.
pub struct DefaultTrainerFactory;

impl Factory<dyn Trainer> for DefaultTrainerFactory {
    fn construct(&self, config: &Config) -> FactoryResult<dyn Trainer> {
        let defaults = TrainConfig::default();
        let train_config = TrainConfig {
            epochs: u32::try_from(config.usize_or("epochs", defaults.epochs as usize)?)?,
            loss_fn: config.parse("loss")?.unwrap_or(defaults.loss_fn),
            lr_schedule: config.parse("lr_schedule")?.unwrap_or(defaults.lr_schedule),
            patience: u32::try_from(config.usize_or("patience", defaults.patience as usize)?)?,
            min_delta: config.f64_or("min_delta", defaults.min_delta)?,
            log_interval: u32::try_from(config.usize_or("log_interval", defaults.log_interval as usize)?)?,
        };
        if train_config.epochs == 0 {
            return Err("epochs must be positive".into());
        }
        Ok(Some(Box::new(DefaultTrainer::new(train_config))))
    }
}
