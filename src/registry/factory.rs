//! Factory traits: the single `construct` capability behind every type name

use crate::components::{Model, Optimizer};
use crate::config::Config;
use crate::error::FactoryError;

/// What a factory hands back. `Ok(None)` is a factory that finished without
/// producing anything, which the loader treats as fatal.
pub type FactoryResult<T> = Result<Option<Box<T>>, FactoryError>;

/// Builds one component of kind `T` from a configuration.
pub trait Factory<T: ?Sized>: Send + Sync {
    /// Name reported in fatal log lines
    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }

    fn construct(&self, config: &Config) -> FactoryResult<T>;
}

/// Optimizers are the one category built against an existing model.
pub trait OptimizerFactory: Send + Sync {
    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }

    fn construct(&self, model: &dyn Model, config: &Config) -> FactoryResult<dyn Optimizer>;
}

/// Lets the registry and the lifecycle wrapper name a factory without
/// knowing which trait object they hold.
pub trait NamedFactory {
    fn factory_name(&self) -> &str;
}

impl<T: ?Sized> NamedFactory for dyn Factory<T> {
    fn factory_name(&self) -> &str {
        self.name()
    }
}

impl NamedFactory for dyn OptimizerFactory {
    fn factory_name(&self) -> &str {
        self.name()
    }
}

/// Closure-backed factory, mostly for tests and ad-hoc registrations.
pub struct FnFactory<F> {
    label: &'static str,
    func: F,
}

impl<F> FnFactory<F> {
    pub fn new(label: &'static str, func: F) -> Self {
        Self { label, func }
    }
}

impl<T: ?Sized, F> Factory<T> for FnFactory<F>
where
    F: Fn(&Config) -> FactoryResult<T> + Send + Sync,
{
    fn name(&self) -> &str {
        self.label
    }

    fn construct(&self, config: &Config) -> FactoryResult<T> {
        (self.func)(config)
    }
}

impl<F> OptimizerFactory for FnFactory<F>
where
    F: Fn(&dyn Model, &Config) -> FactoryResult<dyn Optimizer> + Send + Sync,
{
    fn name(&self) -> &str {
        self.label
    }

    fn construct(&self, model: &dyn Model, config: &Config) -> FactoryResult<dyn Optimizer> {
        (self.func)(model, config)
    }
}

fn short_type_name(full: &'static str) -> &'static str {
    // drop generic arguments before taking the last path segment
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
