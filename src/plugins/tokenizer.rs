//! Built-in tokenizers

use crate::components::Tokenizer;
use crate::config::Config;
use crate::registry::{Factory, FactoryResult};
use std::collections::HashMap;

/// Word-level tokenizer with a fixed vocabulary. Id 0 is the unknown token.
pub struct WhitespaceTokenizer {
    vocab: Vec<String>,
    index: HashMap<String, u32>,
    lowercase: bool,
}

impl WhitespaceTokenizer {
    pub fn new(unk_token: &str, words: &[String], lowercase: bool) -> Self {
        let mut vocab = vec![unk_token.to_string()];
        let mut index = HashMap::new();
        index.insert(unk_token.to_string(), 0);
        for word in words {
            let word = if lowercase { word.to_lowercase() } else { word.clone() };
            if !index.contains_key(&word) {
                index.insert(word.clone(), vocab.len() as u32);
                vocab.push(word);
            }
        }
        Self { vocab, index, lowercase }
    }
}

impl Tokenizer for WhitespaceTokenizer {
    fn encode(&self, text: &str) -> Vec<u32> {
        text.split_whitespace()
            .map(|word| {
                let key = if self.lowercase { word.to_lowercase() } else { word.to_string() };
                self.index.get(&key).copied().unwrap_or(0)
            })
            .collect()
    }

    fn decode(&self, ids: &[u32]) -> String {
        ids.iter()
            .map(|&id| self.vocab.get(id as usize).unwrap_or(&self.vocab[0]).as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn vocab_size(&self) -> usize {
        self.vocab.len()
    }
}

/// `WhitespaceTokenizer`: `vocab` (list of words), `lowercase`, `unk_token`
pub struct WhitespaceTokenizerFactory;

impl Factory<dyn Tokenizer> for WhitespaceTokenizerFactory {
    fn construct(&self, config: &Config) -> FactoryResult<dyn Tokenizer> {
        let words: Vec<String> = config.parse("vocab")?.unwrap_or_default();
        let lowercase = config.bool_or("lowercase", true)?;
        let unk = config.str_or("unk_token", "<unk>")?;
        Ok(Some(Box::new(WhitespaceTokenizer::new(unk, &words, lowercase))))
    }
}

/// Character-level tokenizer over a fixed alphabet. Id 0 is unknown.
pub struct CharTokenizer {
    alphabet: Vec<char>,
}

impl Tokenizer for CharTokenizer {
    fn encode(&self, text: &str) -> Vec<u32> {
        text.chars()
            .map(|c| {
                self.alphabet
                    .iter()
                    .position(|&a| a == c)
                    .map(|p| p as u32 + 1)
                    .unwrap_or(0)
            })
            .collect()
    }

    fn decode(&self, ids: &[u32]) -> String {
        ids.iter()
            .map(|&id| match id {
                0 => '?',
                n => self.alphabet.get(n as usize - 1).copied().unwrap_or('?'),
            })
            .collect()
    }

    fn vocab_size(&self) -> usize {
        self.alphabet.len() + 1
    }
}

/// `CharTokenizer`: `alphabet` string, duplicates ignored
pub struct CharTokenizerFactory;

impl Factory<dyn Tokenizer> for CharTokenizerFactory {
    fn construct(&self, config: &Config) -> FactoryResult<dyn Tokenizer> {
        let mut alphabet: Vec<char> = Vec::new();
        for c in config.str_or("alphabet", "abcdefghijklmnopqrstuvwxyz ")?.chars() {
            if !alphabet.contains(&c) {
                alphabet.push(c);
            }
        }
        if alphabet.is_empty() {
            return Err("alphabet must not be empty".into());
        }
        Ok(Some(Box::new(CharTokenizer { alphabet })))
    }
}
