//! llmray-core: named-component registry and factory loader
//!
//! Datasets, tokenizers, models, optimizers, trainers, initializers and
//! agent environments are selected by a string `type` at configuration time,
//! built by a registered factory, and handed back fully constructed, or the
//! process stops.

pub mod components;
pub mod config;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod plugins;
pub mod registry;

pub use config::Config;
pub use error::{ComponentError, ConfigError, FactoryError, FatalError, RegistryError, ResolutionError, FATAL_EXIT_CODE};
pub use loader::Loader;
pub use pipeline::{PipelineError, PipelineReport};
pub use registry::{Category, Factory, FactoryResult, FnFactory, OptimizerFactory, Registries, Registry};
