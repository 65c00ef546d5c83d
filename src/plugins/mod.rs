//! Built-in plugins, registered by name into the per-category registries
//!
//! Downstream crates add their own implementations the same way: implement
//! `Factory<dyn Category>` (or `OptimizerFactory`) and register it once at
//! startup.

pub mod agentenv;
pub mod dataset;
pub mod initializer;
pub mod model;
pub mod optimizer;
pub mod tokenizer;
pub mod trainer;

use crate::error::RegistryError;
use crate::registry::Registries;

/// Register every built-in plugin exactly once.
pub fn register_builtins(registries: &mut Registries) -> Result<(), RegistryError> {
    registries.datasets.register("CsvDataset", Box::new(dataset::CsvDatasetFactory))?;
    registries.datasets.register("JsonDataset", Box::new(dataset::JsonDatasetFactory))?;
    registries.datasets.register("SyntheticDataset", Box::new(dataset::SyntheticDatasetFactory))?;

    registries
        .tokenizers
        .register("WhitespaceTokenizer", Box::new(tokenizer::WhitespaceTokenizerFactory))?;
    registries.tokenizers.register("CharTokenizer", Box::new(tokenizer::CharTokenizerFactory))?;

    registries.models.register("LinearModel", Box::new(model::LinearModelFactory))?;

    registries.optimizers.register("SGD", Box::new(optimizer::SgdFactory))?;
    registries.optimizers.register("Momentum", Box::new(optimizer::MomentumFactory))?;

    registries.trainers.register("DefaultTrainer", Box::new(trainer::DefaultTrainerFactory))?;

    registries
        .initializers
        .register("ConstantInitializer", Box::new(initializer::ConstantInitializerFactory))?;
    registries
        .initializers
        .register("UniformInitializer", Box::new(initializer::UniformInitializerFactory))?;
    registries
        .initializers
        .register("XavierInitializer", Box::new(initializer::XavierInitializerFactory))?;

    registries.agent_envs.register("BanditEnv", Box::new(agentenv::BanditEnvFactory))?;
    Ok(())
}
