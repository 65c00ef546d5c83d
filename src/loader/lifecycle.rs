//! Load-with-lifecycle: the one place that logs, resolves and enforces the
//! fatal contract. Every loader operation and pipeline stage goes through here.

use crate::config::Config;
use crate::error::{FactoryError, FatalError, ResolutionError};
use crate::registry::{FactoryResult, NamedFactory, Registry};
use log::{info, warn};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Resolve `config`'s type in `registry` and build it with `construct`.
///
/// Returns `Err` only for resolution failures. A factory error, a panic in
/// the factory or an empty result never comes back to the caller: the
/// process exits instead.
pub fn load_with_lifecycle<F, T>(
    registry: &Registry<F>,
    config: &Config,
    construct: impl FnOnce(&F) -> FactoryResult<T>,
) -> Result<Box<T>, ResolutionError>
where
    F: ?Sized + NamedFactory,
    T: ?Sized,
{
    let category = registry.category();
    let operation = category.operation();
    info!("{} start", operation);
    info!("{} config: {} [{}]", operation, config, config.fingerprint());

    let type_name = config.type_name();
    let factory = match type_name.and_then(|name| registry.lookup(name)) {
        Some(factory) => factory,
        None => {
            let err = ResolutionError {
                category,
                type_name: type_name.map(str::to_string),
            };
            warn!("{}: {}", operation, err);
            return Err(err);
        }
    };

    let outcome = catch_panic(|| construct(factory)).and_then(|result| result);
    match settle(operation, factory.factory_name(), outcome) {
        Ok(component) => {
            info!("{} finish", operation);
            Ok(component)
        }
        Err(fatal) => fatal.exit(),
    }
}

/// Run a named stage with the same start/finish logging and fatal exit.
pub fn run_stage<T, E>(stage: &str, body: impl FnOnce() -> Result<T, E>) -> T
where
    E: Into<FactoryError>,
{
    info!("{} start", stage);
    match catch_panic(body).and_then(|result| result.map_err(Into::into)) {
        Ok(value) => {
            info!("{} finish", stage);
            value
        }
        Err(err) => FatalError::Stage {
            stage: stage.to_string(),
            source: err.into(),
        }
        .exit(),
    }
}

/// Run `body`, turning a panic into an error that carries the panic message.
fn catch_panic<R>(body: impl FnOnce() -> R) -> Result<R, FactoryError> {
    panic::catch_unwind(AssertUnwindSafe(body))
        .map_err(|payload| format!("panicked: {}", panic_message(&*payload)).into())
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

/// Classify a factory outcome into a component or a fatal condition.
pub(crate) fn settle<T: ?Sized>(
    operation: &str,
    factory: &str,
    outcome: FactoryResult<T>,
) -> Result<Box<T>, FatalError> {
    match outcome {
        Ok(Some(component)) => Ok(component),
        Ok(None) => Err(FatalError::InvariantViolation {
            operation: operation.to_string(),
            factory: factory.to_string(),
        }),
        Err(source) => Err(FatalError::Construction {
            operation: operation.to_string(),
            factory: factory.to_string(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Category, Factory, FnFactory};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_settle_passes_component_through() {
        let out = settle("load_model", "F", Ok(Some(Box::new(7u32)))).unwrap();
        assert_eq!(*out, 7);
    }

    #[test]
    fn test_settle_empty_is_invariant_violation() {
        let err = settle::<u32>("get_trainer", "NullFactory", Ok(None)).unwrap_err();
        assert!(matches!(
            err,
            FatalError::InvariantViolation { ref operation, ref factory }
                if operation == "get_trainer" && factory == "NullFactory"
        ));
    }

    #[test]
    fn test_settle_error_is_construction_error() {
        let err = settle::<u32>("load_dataset", "CsvDatasetFactory", Err("bad cell".into())).unwrap_err();
        match err {
            FatalError::Construction { operation, factory, source } => {
                assert_eq!(operation, "load_dataset");
                assert_eq!(factory, "CsvDatasetFactory");
                assert_eq!(source.to_string(), "bad cell");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unknown_type_is_resolution_error() {
        let registry: Registry<dyn Factory<u32>> = Registry::new(Category::Tokenizer);
        let err = load_with_lifecycle(&registry, &Config::of_type("BPE"), |f| f.construct(&Config::new()))
            .unwrap_err();
        assert_eq!(err.to_string(), "there is no BPE tokenizer.");
    }

    #[test]
    fn test_missing_type_is_resolution_error_without_calling_factory() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let mut registry: Registry<dyn Factory<u32>> = Registry::new(Category::Dataset);
        registry
            .register(
                "Counter",
                Box::new(FnFactory::new("Counter", move |_: &Config| -> FactoryResult<u32> {
                    seen.fetch_add(1, Ordering::SeqCst);
                    Ok(Some(Box::new(1)))
                })),
            )
            .unwrap();

        let config = Config::new().with("path", "x.csv");
        let err = load_with_lifecycle(&registry, &config, |f| f.construct(&config)).unwrap_err();
        assert_eq!(err.type_name, None);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_registered_factory_called_once_with_config() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let mut registry: Registry<dyn Factory<String>> = Registry::new(Category::Dataset);
        registry
            .register(
                "CSV",
                Box::new(FnFactory::new("CsvFactory", move |config: &Config| -> FactoryResult<String> {
                    seen.fetch_add(1, Ordering::SeqCst);
                    Ok(Some(Box::new(config.require_str("path")?.to_string())))
                })),
            )
            .unwrap();

        let config = Config::of_type("CSV").with("path", "x.csv");
        let out = load_with_lifecycle(&registry, &config, |f| f.construct(&config)).unwrap();
        assert_eq!(*out, "x.csv");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_panic_becomes_error_with_message() {
        let err = catch_panic(|| -> u32 {
            let dims: Vec<usize> = Vec::new();
            dims[0] as u32
        })
        .unwrap_err();
        assert!(err.to_string().starts_with("panicked: index out of bounds"));

        let err = catch_panic(|| -> u32 { panic!("bad shape {}", 3) }).unwrap_err();
        assert_eq!(err.to_string(), "panicked: bad shape 3");

        assert_eq!(catch_panic(|| 5).unwrap(), 5);
    }

    #[test]
    fn test_factory_panic_settles_as_construction_error() {
        let outcome: FactoryResult<u32> = catch_panic(|| -> FactoryResult<u32> { panic!("boom") })
            .and_then(|result| result);
        match settle("load_model", "BoomFactory", outcome).unwrap_err() {
            FatalError::Construction { factory, source, .. } => {
                assert_eq!(factory, "BoomFactory");
                assert_eq!(source.to_string(), "panicked: boom");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_run_stage_returns_value() {
        let value = run_stage("trainer prepare", || Ok::<_, std::io::Error>(42));
        assert_eq!(value, 42);
    }
}
