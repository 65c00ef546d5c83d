//! Component contracts: what a loaded instance of each category can do
//!
//! The loader only hands these out as owned trait objects. Concrete
//! implementations live in `plugins` or in downstream crates.

use crate::error::ComponentError;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// A single training sample: input -> target output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSample {
    pub input: Vec<f64>,
    pub target: Vec<f64>,
}

pub trait Dataset: Send {
    fn name(&self) -> &str;
    fn samples(&self) -> &[DataSample];
    fn input_dim(&self) -> usize;
    fn output_dim(&self) -> usize;

    fn len(&self) -> usize {
        self.samples().len()
    }

    fn is_empty(&self) -> bool {
        self.samples().is_empty()
    }

    /// Samples stacked as columns: (inputs: input_dim x n, targets: output_dim x n)
    fn to_matrices(&self) -> (DMatrix<f64>, DMatrix<f64>) {
        let samples = self.samples();
        let n = samples.len();
        let inputs = DMatrix::from_fn(self.input_dim(), n, |i, j| samples[j].input[i]);
        let targets = DMatrix::from_fn(self.output_dim(), n, |i, j| samples[j].target[i]);
        (inputs, targets)
    }
}

pub trait Tokenizer: Send {
    fn encode(&self, text: &str) -> Vec<u32>;
    fn decode(&self, ids: &[u32]) -> String;
    fn vocab_size(&self) -> usize;
}

/// A model exposes one trainable weight matrix (output_dim x input_dim).
pub trait Model: Send {
    fn name(&self) -> &str;
    fn parameters(&self) -> &DMatrix<f64>;
    fn parameters_mut(&mut self) -> &mut DMatrix<f64>;
    fn forward(&self, input: &DVector<f64>) -> Result<DVector<f64>, ComponentError>;

    fn num_parameters(&self) -> usize {
        self.parameters().len()
    }

    fn shape(&self) -> (usize, usize) {
        self.parameters().shape()
    }
}

pub trait Optimizer: Send {
    fn name(&self) -> &str;
    fn learning_rate(&self) -> f64;
    fn set_learning_rate(&mut self, lr: f64);
    /// Apply one update to `params` given the gradient of the loss.
    fn step(&mut self, params: &mut DMatrix<f64>, grad: &DMatrix<f64>) -> Result<(), ComponentError>;
}

pub trait Initializer: Send {
    fn name(&self) -> &str;
    fn initialize(&self, params: &mut DMatrix<f64>);
}

/// Everything a trainer needs; ownership moves into the trainer on `prepare`.
pub struct TrainingParts {
    pub model: Box<dyn Model>,
    pub tokenizer: Option<Box<dyn Tokenizer>>,
    pub dataset: Box<dyn Dataset>,
    pub optimizer: Box<dyn Optimizer>,
}

pub trait Trainer: Send {
    fn prepare(&mut self, parts: TrainingParts) -> Result<(), ComponentError>;
    fn train(&mut self) -> Result<TrainHistory, ComponentError>;
    /// Hand the trained model back, if the trainer was prepared
    fn into_model(self: Box<Self>) -> Option<Box<dyn Model>>;
}

/// Record of a single training epoch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochRecord {
    pub epoch: u32,
    pub loss: f64,
    pub learning_rate: f64,
}

/// Complete training history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainHistory {
    pub records: Vec<EpochRecord>,
    pub best_loss: f64,
    pub best_epoch: u32,
    pub final_loss: f64,
    pub stopped_early: bool,
}

/// Outcome of a single environment step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub observation: Vec<f64>,
    pub reward: f64,
    pub done: bool,
}

pub trait AgentEnv: Send {
    fn name(&self) -> &str;
    fn action_count(&self) -> usize;
    fn reset(&mut self) -> Vec<f64>;
    fn step(&mut self, action: usize) -> Result<Step, ComponentError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<DataSample>);

    impl Dataset for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }
        fn samples(&self) -> &[DataSample] {
            &self.0
        }
        fn input_dim(&self) -> usize {
            2
        }
        fn output_dim(&self) -> usize {
            1
        }
    }

    #[test]
    fn test_to_matrices_stacks_columns() {
        let ds = Fixed(vec![
            DataSample { input: vec![1.0, 2.0], target: vec![3.0] },
            DataSample { input: vec![4.0, 5.0], target: vec![6.0] },
        ]);
        let (x, t) = ds.to_matrices();
        assert_eq!(x.shape(), (2, 2));
        assert_eq!(t.shape(), (1, 2));
        assert_eq!(x[(0, 1)], 4.0);
        assert_eq!(x[(1, 0)], 2.0);
        assert_eq!(t[(0, 1)], 6.0);
        assert_eq!(ds.len(), 2);
    }
}
