//! Component categories

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The seven pluggable component kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Dataset,
    Tokenizer,
    Model,
    Optimizer,
    Trainer,
    Initializer,
    AgentEnvironment,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Dataset,
        Category::Tokenizer,
        Category::Model,
        Category::Optimizer,
        Category::Trainer,
        Category::Initializer,
        Category::AgentEnvironment,
    ];

    /// Name used in log lines and resolution messages
    pub fn label(&self) -> &'static str {
        match self {
            Category::Dataset => "dataset",
            Category::Tokenizer => "tokenizer",
            Category::Model => "model",
            Category::Optimizer => "optimizer",
            Category::Trainer => "trainer",
            Category::Initializer => "initializer",
            Category::AgentEnvironment => "AgentEnv",
        }
    }

    /// Loader operation bound to this category
    pub fn operation(&self) -> &'static str {
        match self {
            Category::Dataset => "load_dataset",
            Category::Tokenizer => "load_tokenizer",
            Category::Model => "load_model",
            Category::Optimizer => "load_optimizer",
            Category::Trainer => "get_trainer",
            Category::Initializer => "get_initializer",
            Category::AgentEnvironment => "get_agentenv",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dataset" => Ok(Category::Dataset),
            "tokenizer" => Ok(Category::Tokenizer),
            "model" => Ok(Category::Model),
            "optimizer" => Ok(Category::Optimizer),
            "trainer" => Ok(Category::Trainer),
            "initializer" => Ok(Category::Initializer),
            "agentenv" | "agent-env" | "agentenvironment" => Ok(Category::AgentEnvironment),
            other => Err(format!("unknown category '{}'", other)),
        }
    }
}
