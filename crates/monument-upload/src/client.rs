//! The knowledge-base client surface the pipeline consumes.
//!
//! The pipeline never holds on to item state: every mutating step fetches a fresh
//! [`ItemState`] first, because earlier steps of the same upload change what later
//! steps must observe (an image claim added by one statement blocks the next).

use monument_model::{Claim, EntityId};
use std::collections::BTreeMap;

/// Snapshot of an item as last read from the knowledge base.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemState {
    pub id: EntityId,
    pub labels: BTreeMap<String, String>,
    pub descriptions: BTreeMap<String, String>,
    pub aliases: BTreeMap<String, Vec<String>>,
    pub claims: BTreeMap<String, Vec<Claim>>,
}

impl ItemState {
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            labels: BTreeMap::new(),
            descriptions: BTreeMap::new(),
            aliases: BTreeMap::new(),
            claims: BTreeMap::new(),
        }
    }

    /// Whether the item uses `property` at all, whatever the value.
    pub fn has_property(&self, property: &str) -> bool {
        self.claims
            .get(property)
            .is_some_and(|claims| !claims.is_empty())
    }

    pub fn claims_for(&self, property: &str) -> &[Claim] {
        self.claims.get(property).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_alias(&self, language: &str, text: &str) -> bool {
        self.aliases
            .get(language)
            .is_some_and(|aliases| aliases.iter().any(|a| a == text))
    }

    pub fn label(&self, language: &str) -> Option<&str> {
        self.labels.get(language).map(String::as_str)
    }

    pub fn with_label(mut self, language: &str, text: &str) -> Self {
        self.labels.insert(language.to_string(), text.to_string());
        self
    }

    pub fn with_alias(mut self, language: &str, text: &str) -> Self {
        self.aliases
            .entry(language.to_string())
            .or_default()
            .push(text.to_string());
        self
    }

    pub fn with_claim(mut self, claim: Claim) -> Self {
        self.claims
            .entry(claim.property.clone())
            .or_default()
            .push(claim);
        self
    }
}

/// Remote operations against the knowledge base.
///
/// Reads take `&self`; anything that edits the knowledge base takes `&mut self`.
/// Implementations own transport, authentication and retries of safe reads.
/// [`KnowledgeBase::create_item`] is not idempotent and must not be retried blindly.
pub trait KnowledgeBase {
    fn fetch_item(&self, id: &EntityId) -> anyhow::Result<ItemState>;

    /// Create a blank item and return its freshly assigned identifier.
    fn create_item(&mut self, summary: &str) -> anyhow::Result<EntityId>;

    /// No label in `language`: set it. A different label: add `text` as an alias.
    /// Same label: nothing.
    fn set_label_or_alias(
        &mut self,
        item: &EntityId,
        language: &str,
        text: &str,
        summary: &str,
    ) -> anyhow::Result<()>;

    fn add_aliases(
        &mut self,
        item: &EntityId,
        language: &str,
        aliases: &[String],
        summary: &str,
    ) -> anyhow::Result<()>;

    /// Create-or-overwrite is up to the implementation.
    fn set_description(
        &mut self,
        item: &EntityId,
        language: &str,
        text: &str,
        summary: &str,
    ) -> anyhow::Result<()>;

    fn add_claim(&mut self, item: &EntityId, claim: &Claim, summary: &str) -> anyhow::Result<()>;

    /// Turn an identifier into the canonical entity it denotes (following redirects).
    fn resolve_entity(&self, id: &EntityId) -> anyhow::Result<EntityId>;

    fn media_file_exists(&self, filename: &str) -> anyhow::Result<bool>;

    fn category_exists(&self, category: &str) -> anyhow::Result<bool>;
}

impl<K: KnowledgeBase + ?Sized> KnowledgeBase for &mut K {
    fn fetch_item(&self, id: &EntityId) -> anyhow::Result<ItemState> {
        (**self).fetch_item(id)
    }

    fn create_item(&mut self, summary: &str) -> anyhow::Result<EntityId> {
        (**self).create_item(summary)
    }

    fn set_label_or_alias(
        &mut self,
        item: &EntityId,
        language: &str,
        text: &str,
        summary: &str,
    ) -> anyhow::Result<()> {
        (**self).set_label_or_alias(item, language, text, summary)
    }

    fn add_aliases(
        &mut self,
        item: &EntityId,
        language: &str,
        aliases: &[String],
        summary: &str,
    ) -> anyhow::Result<()> {
        (**self).add_aliases(item, language, aliases, summary)
    }

    fn set_description(
        &mut self,
        item: &EntityId,
        language: &str,
        text: &str,
        summary: &str,
    ) -> anyhow::Result<()> {
        (**self).set_description(item, language, text, summary)
    }

    fn add_claim(&mut self, item: &EntityId, claim: &Claim, summary: &str) -> anyhow::Result<()> {
        (**self).add_claim(item, claim, summary)
    }

    fn resolve_entity(&self, id: &EntityId) -> anyhow::Result<EntityId> {
        (**self).resolve_entity(id)
    }

    fn media_file_exists(&self, filename: &str) -> anyhow::Result<bool> {
        (**self).media_file_exists(filename)
    }

    fn category_exists(&self, category: &str) -> anyhow::Result<bool> {
        (**self).category_exists(category)
    }
}
