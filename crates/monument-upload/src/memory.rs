//! In-process knowledge base.
//!
//! Implements the collaborator semantics the pipeline relies on (label-or-alias,
//! reference merging into identical claims, redirects) and journals every call, so it
//! doubles as a dry-run backend and as the test double for the pipeline.

use crate::client::{ItemState, KnowledgeBase};
use anyhow::{anyhow, bail};
use monument_model::{Claim, EntityId};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

/// One remote call, as seen by the knowledge base.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    FetchItem(EntityId),
    CreateItem,
    SetLabelOrAlias {
        item: EntityId,
        language: String,
        text: String,
    },
    AddAliases {
        item: EntityId,
        language: String,
        aliases: Vec<String>,
        summary: String,
    },
    SetDescription {
        item: EntityId,
        language: String,
        text: String,
    },
    AddClaim {
        item: EntityId,
        claim: Claim,
    },
    ResolveEntity(EntityId),
    MediaFileExists(String),
    CategoryExists(String),
}

impl Call {
    pub fn operation(&self) -> &'static str {
        match self {
            Call::FetchItem(_) => "fetch_item",
            Call::CreateItem => "create_item",
            Call::SetLabelOrAlias { .. } => "set_label_or_alias",
            Call::AddAliases { .. } => "add_aliases",
            Call::SetDescription { .. } => "set_description",
            Call::AddClaim { .. } => "add_claim",
            Call::ResolveEntity(_) => "resolve_entity",
            Call::MediaFileExists(_) => "media_file_exists",
            Call::CategoryExists(_) => "category_exists",
        }
    }

    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Call::CreateItem
                | Call::SetLabelOrAlias { .. }
                | Call::AddAliases { .. }
                | Call::SetDescription { .. }
                | Call::AddClaim { .. }
        )
    }
}

#[derive(Debug, Default)]
pub struct MemoryKnowledgeBase {
    items: BTreeMap<EntityId, ItemState>,
    redirects: BTreeMap<EntityId, EntityId>,
    media: BTreeSet<String>,
    categories: BTreeSet<String>,
    failing: BTreeSet<&'static str>,
    journal: RefCell<Vec<Call>>,
}

impl MemoryKnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(mut self, item: ItemState) -> Self {
        self.insert_item(item);
        self
    }

    pub fn with_media_file(mut self, filename: &str) -> Self {
        self.media.insert(filename.to_string());
        self
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.categories.insert(category.to_string());
        self
    }

    pub fn with_redirect(mut self, from: EntityId, to: EntityId) -> Self {
        self.redirects.insert(from, to);
        self
    }

    /// Make every call of `operation` (e.g. `"add_claim"`) fail.
    pub fn failing(mut self, operation: &'static str) -> Self {
        self.failing.insert(operation);
        self
    }

    pub fn insert_item(&mut self, item: ItemState) {
        self.items.insert(item.id.clone(), item);
    }

    pub fn item(&self, id: &EntityId) -> Option<&ItemState> {
        self.items.get(id)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.journal.borrow().clone()
    }

    pub fn writes(&self) -> Vec<Call> {
        self.journal
            .borrow()
            .iter()
            .filter(|c| c.is_write())
            .cloned()
            .collect()
    }

    pub fn count(&self, operation: &str) -> usize {
        self.journal
            .borrow()
            .iter()
            .filter(|c| c.operation() == operation)
            .count()
    }

    fn record(&self, call: Call) -> anyhow::Result<()> {
        let operation = call.operation();
        self.journal.borrow_mut().push(call);
        if self.failing.contains(operation) {
            bail!("{operation} rejected by knowledge base");
        }
        Ok(())
    }

    fn item_mut(&mut self, id: &EntityId) -> anyhow::Result<&mut ItemState> {
        self.items
            .get_mut(id)
            .ok_or_else(|| anyhow!("item {id} does not exist"))
    }

    fn next_id(&self) -> anyhow::Result<EntityId> {
        let last = self.items.keys().map(EntityId::number).max().unwrap_or(0);
        Ok(EntityId::from_number(last + 1)?)
    }
}

impl KnowledgeBase for MemoryKnowledgeBase {
    fn fetch_item(&self, id: &EntityId) -> anyhow::Result<ItemState> {
        self.record(Call::FetchItem(id.clone()))?;
        self.items
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow!("item {id} does not exist"))
    }

    fn create_item(&mut self, _summary: &str) -> anyhow::Result<EntityId> {
        self.record(Call::CreateItem)?;
        let id = self.next_id()?;
        self.items.insert(id.clone(), ItemState::new(id.clone()));
        Ok(id)
    }

    fn set_label_or_alias(
        &mut self,
        item: &EntityId,
        language: &str,
        text: &str,
        _summary: &str,
    ) -> anyhow::Result<()> {
        self.record(Call::SetLabelOrAlias {
            item: item.clone(),
            language: language.to_string(),
            text: text.to_string(),
        })?;
        let state = self.item_mut(item)?;
        match state.labels.get(language) {
            None => {
                state.labels.insert(language.to_string(), text.to_string());
            }
            Some(label) if label == text => {}
            Some(_) => {
                if !state.has_alias(language, text) {
                    state
                        .aliases
                        .entry(language.to_string())
                        .or_default()
                        .push(text.to_string());
                }
            }
        }
        Ok(())
    }

    fn add_aliases(
        &mut self,
        item: &EntityId,
        language: &str,
        aliases: &[String],
        summary: &str,
    ) -> anyhow::Result<()> {
        self.record(Call::AddAliases {
            item: item.clone(),
            language: language.to_string(),
            aliases: aliases.to_vec(),
            summary: summary.to_string(),
        })?;
        let state = self.item_mut(item)?;
        let existing = state.aliases.entry(language.to_string()).or_default();
        for alias in aliases {
            if !existing.contains(alias) {
                existing.push(alias.clone());
            }
        }
        Ok(())
    }

    fn set_description(
        &mut self,
        item: &EntityId,
        language: &str,
        text: &str,
        _summary: &str,
    ) -> anyhow::Result<()> {
        self.record(Call::SetDescription {
            item: item.clone(),
            language: language.to_string(),
            text: text.to_string(),
        })?;
        self.item_mut(item)?
            .descriptions
            .insert(language.to_string(), text.to_string());
        Ok(())
    }

    fn add_claim(&mut self, item: &EntityId, claim: &Claim, _summary: &str) -> anyhow::Result<()> {
        self.record(Call::AddClaim {
            item: item.clone(),
            claim: claim.clone(),
        })?;
        let claims = self
            .item_mut(item)?
            .claims
            .entry(claim.property.clone())
            .or_default();
        match claims.iter_mut().find(|c| c.same_statement(claim)) {
            Some(existing) => {
                for reference in &claim.references {
                    if !existing.has_reference(reference) {
                        existing.references.push(reference.clone());
                    }
                }
            }
            None => claims.push(claim.clone()),
        }
        Ok(())
    }

    fn resolve_entity(&self, id: &EntityId) -> anyhow::Result<EntityId> {
        self.record(Call::ResolveEntity(id.clone()))?;
        Ok(self.redirects.get(id).unwrap_or(id).clone())
    }

    fn media_file_exists(&self, filename: &str) -> anyhow::Result<bool> {
        self.record(Call::MediaFileExists(filename.to_string()))?;
        Ok(self.media.contains(filename))
    }

    fn category_exists(&self, category: &str) -> anyhow::Result<bool> {
        self.record(Call::CategoryExists(category.to_string()))?;
        Ok(self.categories.contains(category))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use monument_model::{ClaimValue, Reference, Snak, TimeValue};

    fn q(raw: &str) -> EntityId {
        EntityId::parse(raw).unwrap()
    }

    #[test]
    fn label_or_alias_rule() {
        let mut kb = MemoryKnowledgeBase::new().with_item(ItemState::new(q("Q1")));
        kb.set_label_or_alias(&q("Q1"), "en", "Church", "s").unwrap();
        kb.set_label_or_alias(&q("Q1"), "en", "Church", "s").unwrap();
        kb.set_label_or_alias(&q("Q1"), "en", "Old church", "s").unwrap();
        kb.set_label_or_alias(&q("Q1"), "en", "Old church", "s").unwrap();

        let item = kb.item(&q("Q1")).unwrap();
        assert_eq!(item.label("en"), Some("Church"));
        assert_eq!(item.aliases["en"], ["Old church"]);
    }

    #[test]
    fn created_items_get_fresh_ids() {
        let mut kb = MemoryKnowledgeBase::new().with_item(ItemState::new(q("Q41")));
        let a = kb.create_item("s").unwrap();
        let b = kb.create_item("s").unwrap();
        assert_eq!(a, q("Q42"));
        assert_eq!(b, q("Q43"));
        assert_eq!(kb.count("create_item"), 2);
    }

    #[test]
    fn identical_claims_merge_references_by_source() {
        let mut kb = MemoryKnowledgeBase::new().with_item(ItemState::new(q("Q1")));
        let cite = |year| {
            Reference::new(
                vec![Snak::new("P248", ClaimValue::EntityRef(q("Q17373699")))],
                vec![Snak::new("P577", ClaimValue::Time(TimeValue::year(year)))],
            )
        };
        let claim = Claim::new("P31", ClaimValue::EntityRef(q("Q16970")));

        kb.add_claim(&q("Q1"), &claim.clone().with_reference(cite(2014)), "s").unwrap();
        kb.add_claim(&q("Q1"), &claim.clone().with_reference(cite(2017)), "s").unwrap();
        kb.add_claim(&q("Q1"), &claim, "s").unwrap();

        let stored = kb.item(&q("Q1")).unwrap().claims_for("P31");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].references.len(), 1);
        assert_eq!(kb.count("add_claim"), 3);
    }

    #[test]
    fn injected_failures_are_journaled_and_returned() {
        let kb = MemoryKnowledgeBase::new().failing("media_file_exists");
        assert!(kb.media_file_exists("Foo.jpg").is_err());
        assert_eq!(kb.calls(), vec![Call::MediaFileExists("Foo.jpg".to_string())]);
        assert!(kb.writes().is_empty());
    }

    #[test]
    fn redirects_resolve_to_target() {
        let kb = MemoryKnowledgeBase::new().with_redirect(q("Q5"), q("Q6"));
        assert_eq!(kb.resolve_entity(&q("Q5")).unwrap(), q("Q6"));
        assert_eq!(kb.resolve_entity(&q("Q7")).unwrap(), q("Q7"));
        assert!(kb.fetch_item(&q("Q6")).is_err());
    }
}
