use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One tunable numeric parameter of a chunking strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfigOption {
    #[serde(rename = "type")]
    pub option_type: OptionType,
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Int,
    Float,
}

/// A catalog entry: string metadata plus a map of tunable options.
///
/// The wire shape flattens the option map next to the metadata fields, so a
/// record looks like `{name, provider, chunker_type, chunk_size: {..}, ..}`.
/// Internally the tunables stay separated from the metadata instead of living
/// in one open-ended record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunker {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub provider: String,
    pub chunker_type: String,
    #[serde(flatten)]
    pub options: BTreeMap<String, ConfigOption>,
}

impl Chunker {
    pub fn option(&self, key: &str) -> Option<&ConfigOption> {
        self.options.get(key)
    }
}

/// The built-in list of chunking strategies offered to clients.
pub struct ChunkerCatalog {
    chunkers: Vec<Chunker>,
}

impl ChunkerCatalog {
    pub fn builtin() -> Self {
        Self {
            chunkers: builtin_chunkers(),
        }
    }

    pub fn list(&self) -> &[Chunker] {
        &self.chunkers
    }

    pub fn find(&self, name: &str) -> Option<&Chunker> {
        self.chunkers.iter().find(|c| c.name == name)
    }

    /// Looks a chunker up by the (provider, chunker_type) pair carried on a
    /// workflow's chunking strategy.
    pub fn find_by_strategy(&self, provider: &str, chunker_type: &str) -> Option<&Chunker> {
        self.chunkers
            .iter()
            .find(|c| c.provider == provider && c.chunker_type == chunker_type)
    }
}

impl Default for ChunkerCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn int_option(min: f64, max: f64, default: f64) -> ConfigOption {
    ConfigOption {
        option_type: OptionType::Int,
        min,
        max,
        default,
    }
}

fn float_option(min: f64, max: f64, default: f64) -> ConfigOption {
    ConfigOption {
        option_type: OptionType::Float,
        min,
        max,
        default,
    }
}

fn entry(
    name: &str,
    provider: &str,
    chunker_type: &str,
    options: Vec<(&str, ConfigOption)>,
) -> Chunker {
    Chunker {
        name: name.to_string(),
        description: None,
        provider: provider.to_string(),
        chunker_type: chunker_type.to_string(),
        options: options
            .into_iter()
            .map(|(key, option)| (key.to_string(), option))
            .collect(),
    }
}

fn builtin_chunkers() -> Vec<Chunker> {
    vec![
        entry(
            "Chonkie Token",
            "chonkie",
            "token",
            vec![
                ("chunk_size", int_option(1.0, 8192.0, 2048.0)),
                ("chunk_overlap", int_option(0.0, 4086.0, 0.0)),
            ],
        ),
        entry(
            "Chonkie Sentence",
            "chonkie",
            "sentence",
            vec![
                ("chunk_size", int_option(1.0, 8192.0, 2048.0)),
                ("chunk_overlap", int_option(0.0, 4086.0, 0.0)),
                ("min_sentences_per_chunk", int_option(1.0, 100.0, 1.0)),
                ("min_characters_per_sentence", int_option(1.0, 100.0, 12.0)),
            ],
        ),
        entry(
            "Chonkie Recursive",
            "chonkie",
            "recursive",
            vec![
                ("chunk_size", int_option(1.0, 8192.0, 2048.0)),
                ("min_characters_per_chunk", int_option(1.0, 100.0, 24.0)),
            ],
        ),
        entry(
            "Chonkie Slumber",
            "chonkie",
            "slumber",
            vec![
                ("chunk_size", int_option(1.0, 8192.0, 2048.0)),
                ("min_characters_per_chunk", int_option(1.0, 100.0, 24.0)),
            ],
        ),
        entry(
            "Chonkie Semantic",
            "chonkie",
            "semantic",
            vec![
                ("chunk_size", int_option(1.0, 8192.0, 2048.0)),
                ("threshold", float_option(0.0, 1.0, 0.8)),
                ("similarity_window", int_option(1.0, 100.0, 3.0)),
                ("min_sentences_per_chunk", int_option(1.0, 100.0, 1.0)),
                ("min_characters_per_sentence", int_option(1.0, 100.0, 12.0)),
            ],
        ),
        entry(
            "LangChain Token",
            "langchain",
            "token",
            vec![
                ("chunk_size", int_option(1.0, 8192.0, 2048.0)),
                ("chunk_overlap", int_option(0.0, 4086.0, 0.0)),
            ],
        ),
        entry(
            "LangChain Recursive",
            "langchain",
            "recursive",
            vec![
                ("chunk_size", int_option(1.0, 8192.0, 2048.0)),
                ("chunk_overlap", int_option(0.0, 4086.0, 0.0)),
            ],
        ),
        entry(
            "LangChain Character",
            "langchain",
            "character",
            vec![
                ("chunk_size", int_option(1.0, 8192.0, 2048.0)),
                ("chunk_overlap", int_option(0.0, 4086.0, 0.0)),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_lists_all_strategies() {
        let catalog = ChunkerCatalog::builtin();
        assert_eq!(catalog.list().len(), 8);
        assert!(catalog.list().iter().all(|c| c.option("chunk_size").is_some()));
    }

    #[test]
    fn lookup_by_name_and_strategy_pair() {
        let catalog = ChunkerCatalog::builtin();

        let by_name = catalog.find("Chonkie Recursive").unwrap();
        assert_eq!(by_name.provider, "chonkie");
        assert_eq!(by_name.chunker_type, "recursive");

        let by_pair = catalog.find_by_strategy("langchain", "character").unwrap();
        assert_eq!(by_pair.name, "LangChain Character");

        assert!(catalog.find("No Such Chunker").is_none());
        assert!(catalog.find_by_strategy("chonkie", "character").is_none());
    }

    #[test]
    fn serializes_options_flattened_beside_metadata() {
        let catalog = ChunkerCatalog::builtin();
        let token = catalog.find("Chonkie Token").unwrap();

        let value = serde_json::to_value(token).unwrap();
        assert_eq!(value["name"], "Chonkie Token");
        assert_eq!(value["provider"], "chonkie");
        assert_eq!(value["chunk_size"]["default"], 2048.0);
        assert_eq!(value["chunk_size"]["type"], "int");
        assert_eq!(value["chunk_overlap"]["max"], 4086.0);
    }
}
