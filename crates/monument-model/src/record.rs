//! Monument records as produced by ingestion.
//!
//! The shape is the JSON object ingestion writes per monument:
//!
//! ```json
//! {
//!   "upload": true,
//!   "wd-item": null,
//!   "labels": {"sv": "Kyrka"},
//!   "aliases": {"sv": ["Gamla kyrkan"]},
//!   "descriptions": {"sv": "kyrka i Uppsala"},
//!   "statements": {"P18": [{"value": "Foo.jpg", "quals": {}, "refs": []}]}
//! }
//! ```
//!
//! Map order is preserved: statements are uploaded in the order they appear.

use crate::{EntityId, ModelError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonumentRecord {
    pub upload: bool,
    #[serde(rename = "wd-item", default)]
    pub wd_item: Option<EntityId>,
    #[serde(default)]
    pub labels: IndexMap<String, String>,
    #[serde(default)]
    pub aliases: IndexMap<String, Vec<String>>,
    #[serde(default)]
    pub descriptions: IndexMap<String, String>,
    #[serde(default)]
    pub statements: IndexMap<String, Vec<StatementInput>>,
}

/// One statement as ingestion describes it. `value`, qualifier values and references are
/// deliberately untyped; the uploader decides what they become.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementInput {
    pub value: Value,
    #[serde(default)]
    pub quals: IndexMap<String, Value>,
    /// Each entry is a URL string or a stated-in map.
    #[serde(default)]
    pub refs: Vec<Value>,
}

impl StatementInput {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            quals: IndexMap::new(),
            refs: Vec::new(),
        }
    }

    pub fn with_qualifier(mut self, property: impl Into<String>, value: Value) -> Self {
        self.quals.insert(property.into(), value);
        self
    }

    pub fn with_ref(mut self, reference: Value) -> Self {
        self.refs.push(reference);
        self
    }
}

/// A single piece of multilingual text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEntry {
    pub language: String,
    pub value: String,
}

impl TextEntry {
    pub fn new(language: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            value: value.into(),
        }
    }
}

impl MonumentRecord {
    /// An uploadable record with no content, targeting `wd_item` (or a new item).
    pub fn new(wd_item: Option<EntityId>) -> Self {
        Self {
            upload: true,
            wd_item,
            labels: IndexMap::new(),
            aliases: IndexMap::new(),
            descriptions: IndexMap::new(),
            statements: IndexMap::new(),
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_json_value(value: Value) -> Result<Self, ModelError> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn label_entries(&self) -> Vec<TextEntry> {
        self.labels
            .iter()
            .map(|(lang, text)| TextEntry::new(lang, text))
            .collect()
    }

    /// One entry per alias, languages in record order, aliases in list order.
    pub fn alias_entries(&self) -> Vec<TextEntry> {
        self.aliases
            .iter()
            .flat_map(|(lang, names)| names.iter().map(move |name| TextEntry::new(lang, name)))
            .collect()
    }

    pub fn description_entries(&self) -> Vec<TextEntry> {
        self.descriptions
            .iter()
            .map(|(lang, text)| TextEntry::new(lang, text))
            .collect()
    }

    pub fn add_statement(&mut self, property: impl Into<String>, statement: StatementInput) {
        self.statements
            .entry(property.into())
            .or_default()
            .push(statement);
    }
}
