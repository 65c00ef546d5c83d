//! Training pipeline: load every component of a run, then prepare and train
//!
//! The pipeline configuration is one JSON object with a section per
//! component (`Dataset`, `Tokenizer`, `Model`, `Initializer`, `Optimizer`,
//! `Trainer`) plus an optional `General` block (`seed`, `output_dir`).
//! Every section is resolved through the [`Loader`], so each one gets the
//! same start/finish logging and fatal handling.

use crate::components::{Initializer, Model, TrainHistory, Trainer, TrainingParts};
use crate::config::Config;
use crate::error::{ConfigError, ResolutionError};
use crate::loader::lifecycle::run_stage;
use crate::loader::Loader;
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("cannot write run report: {0}")]
    Output(#[from] std::io::Error),

    #[error("cannot serialize run report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Summary of a finished run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub config_fingerprint: String,
    pub model: String,
    pub model_shape: (usize, usize),
    pub history: TrainHistory,
    /// Where the report was written, if `General.output_dir` was set
    pub output_path: Option<PathBuf>,
}

/// Sections that receive `General.seed` when they don't set their own.
const SEEDED_SECTIONS: [&str; 2] = ["Dataset", "Initializer"];

pub fn run(loader: &Loader<'_>, config: &Config) -> Result<PipelineReport, PipelineError> {
    let run_id = Uuid::new_v4().to_string();
    let started_at = Utc::now();
    let general = config.section("General")?.unwrap_or_default();
    let seed = general.u64_opt("seed")?;
    info!("Pipeline run {} [{}]", run_id, config.fingerprint());

    let section = |name: &str| -> Result<Option<Config>, ConfigError> {
        let section = config.section(name)?;
        Ok(match (section, seed) {
            (Some(s), Some(seed)) if SEEDED_SECTIONS.contains(&name) && !s.contains_key("seed") => {
                Some(s.with("seed", seed))
            }
            (s, _) => s,
        })
    };
    let required = |name: &str| -> Result<Config, ConfigError> {
        section(name)?.ok_or_else(|| ConfigError::MissingField(name.to_string()))
    };

    let dataset = loader.load_dataset(&required("Dataset")?)?;
    let tokenizer = match section("Tokenizer")? {
        Some(c) => Some(loader.load_tokenizer(&c)?),
        None => None,
    };
    let mut model = loader.load_model(&required("Model")?)?;
    if let Some(c) = section("Initializer")? {
        let initializer = loader.get_initializer(&c)?;
        initializer.initialize(model.parameters_mut());
        info!("Initialized '{}' with {}", model.name(), initializer.name());
    }
    let optimizer = loader.load_optimizer(model.as_ref(), &required("Optimizer")?)?;
    let mut trainer = loader.get_trainer(&required("Trainer")?)?;

    let model_name = model.name().to_string();
    let model_shape = model.shape();
    let parts = TrainingParts {
        model,
        tokenizer,
        dataset,
        optimizer,
    };
    run_stage("trainer prepare", || trainer.prepare(parts));
    let history = run_stage("train", || trainer.train());

    let mut report = PipelineReport {
        run_id,
        started_at,
        finished_at: Utc::now(),
        config_fingerprint: config.fingerprint(),
        model: model_name,
        model_shape,
        history,
        output_path: None,
    };

    if let Some(dir) = general.parse::<String>("output_dir")? {
        report.output_path = Some(write_report(Path::new(&dir), &report)?);
    }
    info!(
        "Pipeline run {} finished: final_loss={:.6} best_loss={:.6}",
        report.run_id, report.history.final_loss, report.history.best_loss
    );
    Ok(report)
}

fn write_report(dir: &Path, report: &PipelineReport) -> Result<PathBuf, PipelineError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("run-{}.json", report.run_id));
    std::fs::write(&path, serde_json::to_string_pretty(report)?)?;
    info!("Wrote run report to {}", path.display());
    Ok(path)
}
