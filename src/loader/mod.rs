//! Loader: one operation per category, all sharing the same lifecycle
//!
//! Each operation resolves `config["type"]` in its category's registry and
//! returns the constructed component. Unknown types come back as
//! [`ResolutionError`]; construction failures end the process.

pub mod lifecycle;

use crate::components::{AgentEnv, Dataset, Initializer, Model, Optimizer, Tokenizer, Trainer};
use crate::config::Config;
use crate::error::ResolutionError;
use crate::registry::Registries;
use lifecycle::load_with_lifecycle;

pub type LoadResult<T> = Result<Box<T>, ResolutionError>;

/// Read-only view over fully populated registries.
#[derive(Clone, Copy)]
pub struct Loader<'r> {
    registries: &'r Registries,
}

impl<'r> Loader<'r> {
    pub fn new(registries: &'r Registries) -> Self {
        Self { registries }
    }

    pub fn registries(&self) -> &'r Registries {
        self.registries
    }

    pub fn load_dataset(&self, config: &Config) -> LoadResult<dyn Dataset> {
        load_with_lifecycle(&self.registries.datasets, config, |f| f.construct(config))
    }

    pub fn load_tokenizer(&self, config: &Config) -> LoadResult<dyn Tokenizer> {
        load_with_lifecycle(&self.registries.tokenizers, config, |f| f.construct(config))
    }

    pub fn load_model(&self, config: &Config) -> LoadResult<dyn Model> {
        load_with_lifecycle(&self.registries.models, config, |f| f.construct(config))
    }

    /// The factory receives the model first, then the configuration.
    pub fn load_optimizer(&self, model: &dyn Model, config: &Config) -> LoadResult<dyn Optimizer> {
        load_with_lifecycle(&self.registries.optimizers, config, |f| f.construct(model, config))
    }

    pub fn get_trainer(&self, config: &Config) -> LoadResult<dyn Trainer> {
        load_with_lifecycle(&self.registries.trainers, config, |f| f.construct(config))
    }

    pub fn get_initializer(&self, config: &Config) -> LoadResult<dyn Initializer> {
        load_with_lifecycle(&self.registries.initializers, config, |f| f.construct(config))
    }

    pub fn get_agent_env(&self, config: &Config) -> LoadResult<dyn AgentEnv> {
        load_with_lifecycle(&self.registries.agent_envs, config, |f| f.construct(config))
    }
}
