//! Built-in datasets: CSV files, JSON sample dumps and synthetic regression data

use crate::components::{DataSample, Dataset};
use crate::config::Config;
use crate::error::{ConfigError, FactoryError};
use crate::registry::{Factory, FactoryResult};
use log::info;
use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// In-memory dataset shared by every built-in dataset factory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabularDataset {
    pub name: String,
    pub samples: Vec<DataSample>,
    pub input_dim: usize,
    pub output_dim: usize,
}

impl TabularDataset {
    pub fn new(name: impl Into<String>, input_dim: usize, output_dim: usize) -> Self {
        Self {
            name: name.into(),
            samples: Vec::new(),
            input_dim,
            output_dim,
        }
    }

    pub fn add_sample(&mut self, input: Vec<f64>, target: Vec<f64>) -> Result<(), FactoryError> {
        if input.len() != self.input_dim || target.len() != self.output_dim {
            return Err(format!(
                "sample shape ({}, {}) does not match dataset shape ({}, {})",
                input.len(),
                target.len(),
                self.input_dim,
                self.output_dim
            )
            .into());
        }
        self.samples.push(DataSample { input, target });
        Ok(())
    }

    /// Targets follow a hidden random linear map plus a little noise, so a
    /// linear model can actually fit them.
    pub fn synthetic(name: &str, input_dim: usize, output_dim: usize, n_samples: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let truth = DMatrix::from_fn(output_dim, input_dim, |_, _| rng.gen_range(-1.0..1.0));
        let mut ds = Self::new(name, input_dim, output_dim);
        for _ in 0..n_samples {
            let input = DVector::from_fn(input_dim, |_, _| rng.gen_range(-1.0..1.0));
            let target = &truth * &input;
            let target: Vec<f64> = target.iter().map(|t| t + rng.gen_range(-0.01..0.01)).collect();
            ds.samples.push(DataSample {
                input: input.iter().copied().collect(),
                target,
            });
        }
        ds
    }

    /// Save dataset to JSON file
    pub fn save(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

impl Dataset for TabularDataset {
    fn name(&self) -> &str {
        &self.name
    }

    fn samples(&self) -> &[DataSample] {
        &self.samples
    }

    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn output_dim(&self) -> usize {
        self.output_dim
    }
}

/// `CsvDataset`: numeric rows, the last `target_columns` columns are targets.
pub struct CsvDatasetFactory;

impl Factory<dyn Dataset> for CsvDatasetFactory {
    fn construct(&self, config: &Config) -> FactoryResult<dyn Dataset> {
        let path = config.require_str("path")?;
        let has_header = config.bool_or("has_header", true)?;
        let target_columns = config.usize_or("target_columns", 1)?;
        if target_columns == 0 {
            return Err(ConfigError::InvalidField {
                field: "target_columns".into(),
                expected: "at least 1",
            }
            .into());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(has_header)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let mut dataset: Option<TabularDataset> = None;
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            let values = record
                .iter()
                .enumerate()
                .map(|(col, cell)| {
                    cell.parse::<f64>().map_err(|_| {
                        format!("{}: row {} column {}: '{}' is not a number", path, row + 1, col + 1, cell)
                    })
                })
                .collect::<Result<Vec<f64>, String>>()?;
            if values.len() <= target_columns {
                return Err(format!(
                    "{}: row {} has {} columns, need more than {}",
                    path,
                    row + 1,
                    values.len(),
                    target_columns
                )
                .into());
            }
            let split = values.len() - target_columns;
            let ds = dataset.get_or_insert_with(|| {
                TabularDataset::new(config.str_or("name", path).unwrap_or(path), split, target_columns)
            });
            ds.add_sample(values[..split].to_vec(), values[split..].to_vec())?;
        }

        let dataset = dataset.ok_or_else(|| format!("{}: no data rows", path))?;
        info!(
            "Read {} samples from {} (input_dim={}, output_dim={})",
            dataset.len(),
            path,
            dataset.input_dim,
            dataset.output_dim
        );
        Ok(Some(Box::new(dataset)))
    }
}

/// `JsonDataset`: a serialized [`TabularDataset`]
pub struct JsonDatasetFactory;

impl Factory<dyn Dataset> for JsonDatasetFactory {
    fn construct(&self, config: &Config) -> FactoryResult<dyn Dataset> {
        let path = config.require_str("path")?;
        let json = std::fs::read_to_string(path)?;
        let dataset: TabularDataset = serde_json::from_str(&json)?;
        if let Some(bad) = dataset
            .samples
            .iter()
            .position(|s| s.input.len() != dataset.input_dim || s.target.len() != dataset.output_dim)
        {
            return Err(format!("{}: sample {} has the wrong shape", path, bad).into());
        }
        Ok(Some(Box::new(dataset)))
    }
}

/// `SyntheticDataset`: generated on the fly from a seed
pub struct SyntheticDatasetFactory;

impl Factory<dyn Dataset> for SyntheticDatasetFactory {
    fn construct(&self, config: &Config) -> FactoryResult<dyn Dataset> {
        let samples = config.usize_or("samples", 64)?;
        let input_dim = config.usize_or("input_dim", 4)?;
        let output_dim = config.usize_or("output_dim", 1)?;
        let seed = config.u64_opt("seed")?.unwrap_or(42);
        let name = config.str_or("name", "synthetic")?;
        if input_dim == 0 || output_dim == 0 {
            return Err("synthetic dataset dimensions must be positive".into());
        }
        Ok(Some(Box::new(TabularDataset::synthetic(name, input_dim, output_dim, samples, seed))))
    }
}
