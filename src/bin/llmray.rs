//! llmray CLI: resolve and build registered components from JSON configs
//!
//! Commands:
//!   llmray list   - list registered component types per category
//!   llmray load   - load one component from a config file
//!   llmray train  - run a training pipeline from a config file
//!   llmray demo   - run a synthetic training pipeline

use llmray_core::components::{AgentEnv, Dataset, Initializer, Model, Optimizer, Tokenizer};
use llmray_core::{pipeline, Category, Config, Loader, PipelineError, Registries};
use serde_json::json;
use std::env;
use std::process;

/// Usage, configuration and resolution errors. Fatal load failures exit with
/// `FATAL_EXIT_CODE` from inside the loader.
const USAGE_EXIT_CODE: i32 = 2;

fn print_usage() {
    println!(
        r#"
llmray - pluggable component loader

Usage: llmray <command> [options]

Commands:
  list                                          List registered types per category
  load   <category> <config.json> [model.json]  Load one component (optimizer needs a model config)
  train  <pipeline.json>                        Run a training pipeline
  demo                                          Run a synthetic pipeline in memory

Categories:
  dataset tokenizer model optimizer trainer initializer agentenv

Examples:
  llmray load dataset csv.json
  llmray load optimizer sgd.json linear.json
  llmray train pipeline.json
"#
    );
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(USAGE_EXIT_CODE);
    }

    let registries = match Registries::with_builtins() {
        Ok(r) => r,
        Err(e) => fail(&format!("registration failed: {}", e)),
    };
    let loader = Loader::new(&registries);

    match args[1].as_str() {
        "list" => cmd_list(&registries),
        "load" => cmd_load(&loader, &args[2..]),
        "train" => cmd_train(&loader, &args[2..]),
        "demo" => cmd_demo(&loader),
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage();
            process::exit(USAGE_EXIT_CODE);
        }
    }
}

fn fail(message: &str) -> ! {
    eprintln!("  error: {}", message);
    process::exit(USAGE_EXIT_CODE)
}

fn read_config(path: &str) -> Config {
    Config::from_path(path).unwrap_or_else(|e| fail(&format!("{}: {}", path, e)))
}

fn cmd_list(registries: &Registries) {
    for category in Category::ALL {
        println!("  {:<12} {}", category.label(), registries.names(category).join(", "));
    }
}

fn cmd_load(loader: &Loader<'_>, args: &[String]) {
    if args.len() < 2 {
        fail("usage: llmray load <category> <config.json> [model.json]");
    }
    let category: Category = args[0].parse().unwrap_or_else(|e: String| fail(&e));
    let config = read_config(&args[1]);

    let summary = match category {
        Category::Dataset => loader.load_dataset(&config).map(|d| describe_dataset(d.as_ref())),
        Category::Tokenizer => loader.load_tokenizer(&config).map(|t| describe_tokenizer(t.as_ref())),
        Category::Model => loader.load_model(&config).map(|m| describe_model(m.as_ref())),
        Category::Optimizer => {
            let model_path = args
                .get(2)
                .unwrap_or_else(|| fail("optimizer loading needs a model config: llmray load optimizer <config.json> <model.json>"));
            let model = loader
                .load_model(&read_config(model_path))
                .unwrap_or_else(|e| fail(&e.to_string()));
            loader
                .load_optimizer(model.as_ref(), &config)
                .map(|o| format!("optimizer '{}' lr={} for {}", o.name(), o.learning_rate(), describe_model(model.as_ref())))
        }
        Category::Trainer => loader.get_trainer(&config).map(|_| "trainer ready".to_string()),
        Category::Initializer => loader.get_initializer(&config).map(|i| format!("initializer '{}'", i.name())),
        Category::AgentEnvironment => loader.get_agent_env(&config).map(|e| describe_env(e.as_ref())),
    };

    match summary {
        Ok(text) => println!("  {}", text),
        Err(e) => fail(&e.to_string()),
    }
}

fn cmd_train(loader: &Loader<'_>, args: &[String]) {
    let Some(path) = args.first() else {
        fail("usage: llmray train <pipeline.json>");
    };
    run_pipeline(loader, &read_config(path));
}

fn cmd_demo(loader: &Loader<'_>) {
    let config = Config::from_value(json!({
        "General": {"seed": 7},
        "Dataset": {"type": "SyntheticDataset", "samples": 128, "input_dim": 8, "output_dim": 2},
        "Tokenizer": {"type": "WhitespaceTokenizer", "vocab": ["low", "rank", "model"]},
        "Model": {"type": "LinearModel", "input_dim": 8, "output_dim": 2},
        "Initializer": {"type": "XavierInitializer"},
        "Optimizer": {"type": "Momentum", "lr": 0.1, "momentum": 0.9},
        "Trainer": {
            "type": "DefaultTrainer",
            "epochs": 100,
            "lr_schedule": {"CosineAnnealing": {"min_lr": 0.001}},
            "log_interval": 20
        }
    }));
    match config {
        Ok(config) => run_pipeline(loader, &config),
        Err(e) => fail(&e.to_string()),
    }
}

fn run_pipeline(loader: &Loader<'_>, config: &Config) {
    match pipeline::run(loader, config) {
        Ok(report) => {
            println!("\n  Run {}", report.run_id);
            println!(
                "  {} {:?} | epochs={} | best_loss={:.6} @ {} | final_loss={:.6}{}",
                report.model,
                report.model_shape,
                report.history.records.len(),
                report.history.best_loss,
                report.history.best_epoch,
                report.history.final_loss,
                if report.history.stopped_early { " (early stop)" } else { "" },
            );
            if let Some(path) = report.output_path {
                println!("  Report: {}", path.display());
            }
        }
        Err(e @ PipelineError::Output(_)) | Err(e @ PipelineError::Serialize(_)) => {
            fail(&format!("training finished but {}", e))
        }
        Err(e) => fail(&e.to_string()),
    }
}

fn describe_dataset(dataset: &dyn Dataset) -> String {
    format!(
        "dataset '{}' | {} samples | input_dim={} output_dim={}",
        dataset.name(),
        dataset.len(),
        dataset.input_dim(),
        dataset.output_dim()
    )
}

fn describe_tokenizer(tokenizer: &dyn Tokenizer) -> String {
    format!("tokenizer | vocab_size={}", tokenizer.vocab_size())
}

fn describe_model(model: &dyn Model) -> String {
    format!("model '{}' {:?} | {} parameters", model.name(), model.shape(), model.num_parameters())
}

fn describe_env(env: &dyn AgentEnv) -> String {
    format!("environment '{}' | {} actions", env.name(), env.action_count())
}
