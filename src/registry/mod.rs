//! Registry: per-category mapping from type name to factory
//!
//! Registration happens once, from the composition root, before any loader
//! runs. The registries carry no locks: after startup they are only read,
//! through shared references.

mod category;
mod factory;

pub use category::Category;
pub use factory::{Factory, FactoryResult, FnFactory, NamedFactory, OptimizerFactory};

use crate::components::{AgentEnv, Dataset, Initializer, Model, Tokenizer, Trainer};
use crate::error::RegistryError;
use log::debug;
use std::collections::HashMap;

/// Factories of one category, keyed by case-sensitive type name
pub struct Registry<F: ?Sized> {
    category: Category,
    factories: HashMap<String, Box<F>>,
}

impl<F: ?Sized + NamedFactory> Registry<F> {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            factories: HashMap::new(),
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Record `factory` under `name`. A name can only be registered once per
    /// category; a second registration is rejected and the first one kept.
    pub fn register(&mut self, name: impl Into<String>, factory: Box<F>) -> Result<(), RegistryError> {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(RegistryError::AlreadyRegistered {
                category: self.category,
                name,
            });
        }
        debug!(
            "Registered {} '{}' -> {}",
            self.category,
            name,
            factory.factory_name()
        );
        self.factories.insert(name, factory);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&F> {
        self.factories.get(name).map(|f| f.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered type names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

/// The composition root: one registry per category.
pub struct Registries {
    pub datasets: Registry<dyn Factory<dyn Dataset>>,
    pub tokenizers: Registry<dyn Factory<dyn Tokenizer>>,
    pub models: Registry<dyn Factory<dyn Model>>,
    pub optimizers: Registry<dyn OptimizerFactory>,
    pub trainers: Registry<dyn Factory<dyn Trainer>>,
    pub initializers: Registry<dyn Factory<dyn Initializer>>,
    pub agent_envs: Registry<dyn Factory<dyn AgentEnv>>,
}

impl Registries {
    /// Empty registries; every lookup fails until something is registered.
    pub fn new() -> Self {
        Self {
            datasets: Registry::new(Category::Dataset),
            tokenizers: Registry::new(Category::Tokenizer),
            models: Registry::new(Category::Model),
            optimizers: Registry::new(Category::Optimizer),
            trainers: Registry::new(Category::Trainer),
            initializers: Registry::new(Category::Initializer),
            agent_envs: Registry::new(Category::AgentEnvironment),
        }
    }

    /// Registries pre-populated with the built-in plugins
    pub fn with_builtins() -> Result<Self, RegistryError> {
        let mut registries = Self::new();
        crate::plugins::register_builtins(&mut registries)?;
        Ok(registries)
    }

    pub fn names(&self, category: Category) -> Vec<&str> {
        match category {
            Category::Dataset => self.datasets.names(),
            Category::Tokenizer => self.tokenizers.names(),
            Category::Model => self.models.names(),
            Category::Optimizer => self.optimizers.names(),
            Category::Trainer => self.trainers.names(),
            Category::Initializer => self.initializers.names(),
            Category::AgentEnvironment => self.agent_envs.names(),
        }
    }

    pub fn is_registered(&self, category: Category, name: &str) -> bool {
        match category {
            Category::Dataset => self.datasets.contains(name),
            Category::Tokenizer => self.tokenizers.contains(name),
            Category::Model => self.models.contains(name),
            Category::Optimizer => self.optimizers.contains(name),
            Category::Trainer => self.trainers.contains(name),
            Category::Initializer => self.initializers.contains(name),
            Category::AgentEnvironment => self.agent_envs.contains(name),
        }
    }
}

impl Default for Registries {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn echo(label: &'static str) -> Box<dyn Factory<String>> {
        Box::new(FnFactory::new(label, move |_: &Config| -> FactoryResult<String> {
            Ok(Some(Box::new(label.to_string())))
        }))
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry: Registry<dyn Factory<String>> = Registry::new(Category::Dataset);
        assert!(registry.is_empty());
        registry.register("CSV", echo("csv")).unwrap();
        registry.register("Json", echo("json")).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup("CSV").unwrap().factory_name(), "csv");
        assert!(registry.lookup("csv").is_none(), "names are case-sensitive");
        assert!(registry.lookup("Parquet").is_none());
        assert_eq!(registry.names(), vec!["CSV", "Json"]);
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut registry: Registry<dyn Factory<String>> = Registry::new(Category::Model);
        registry.register("Linear", echo("first")).unwrap();
        let err = registry.register("Linear", echo("second")).unwrap_err();
        assert_eq!(
            err,
            RegistryError::AlreadyRegistered {
                category: Category::Model,
                name: "Linear".into()
            }
        );
        assert_eq!(registry.lookup("Linear").unwrap().factory_name(), "first");
    }

    #[test]
    fn test_empty_registries() {
        let registries = Registries::new();
        for category in Category::ALL {
            assert!(registries.names(category).is_empty());
        }
    }

    #[test]
    fn test_builtins_cover_every_category() {
        let registries = Registries::with_builtins().unwrap();
        for category in Category::ALL {
            assert!(!registries.names(category).is_empty(), "{} has no builtins", category);
        }
        assert!(registries.is_registered(Category::Dataset, "CsvDataset"));
        assert!(registries.is_registered(Category::Optimizer, "SGD"));
    }

    #[test]
    fn test_is_registered_checks_only_its_category() {
        let registries = Registries::with_builtins().unwrap();
        for category in Category::ALL {
            for name in registries.names(category) {
                assert!(registries.is_registered(category, name));
            }
        }
        assert!(!registries.is_registered(Category::Tokenizer, "BPE"));
        assert!(!registries.is_registered(Category::Tokenizer, "SGD"));
        assert!(!registries.is_registered(Category::AgentEnvironment, "LinearModel"));
    }
}
