//! Labels, aliases and descriptions.
//!
//! Labels go through the knowledge base's label-or-alias rule, so a second name for an
//! already-labelled language ends up as an alias instead of overwriting the label.
//! Entries of the record's own `aliases` field are added directly as aliases.

use crate::audit::{note, AuditSink};
use crate::client::{ItemState, KnowledgeBase};
use crate::config::{AliasPolicy, UploadConfig};
use crate::error::{ErrorContext, Result, UploadError};
use monument_model::{EntityId, TextEntry};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelStats {
    pub labels: usize,
    pub aliases_added: usize,
    /// Aliases never looked at because processing stopped at a duplicate.
    pub aliases_abandoned: usize,
}

pub struct LabelMerger<'a> {
    config: &'a UploadConfig,
}

impl<'a> LabelMerger<'a> {
    pub fn new(config: &'a UploadConfig) -> Self {
        Self { config }
    }

    pub fn add_labels<K: KnowledgeBase + ?Sized>(
        &self,
        kb: &mut K,
        item: &EntityId,
        labels: &[TextEntry],
        aliases: &[TextEntry],
        mut log: AuditSink<'_>,
    ) -> Result<LabelStats> {
        let mut stats = LabelStats::default();

        for label in labels {
            refresh(&*kb, item)?;
            kb.set_label_or_alias(item, &label.language, &label.value, &self.config.edit_summary)
                .map_err(UploadError::remote(ErrorContext::new("set_label_or_alias").item(item)))?;
            stats.labels += 1;
            note(&mut log, || {
                format!("{item} ADDED LABEL {} {}", label.language, label.value)
            })?;
        }

        for (i, alias) in aliases.iter().enumerate() {
            let state = refresh(&*kb, item)?;
            if state.has_alias(&alias.language, &alias.value) {
                match self.config.alias_policy {
                    AliasPolicy::StopOnDuplicate => {
                        stats.aliases_abandoned = aliases.len() - i - 1;
                        debug!(
                            item = %item,
                            language = alias.language.as_str(),
                            abandoned = stats.aliases_abandoned,
                            "alias already present, stopping alias processing"
                        );
                        return Ok(stats);
                    }
                    AliasPolicy::SkipDuplicate => continue,
                }
            }

            let summary = format!(
                "Added [{}] alias to [[{item}]], {}",
                alias.language, self.config.edit_summary
            );
            kb.add_aliases(item, &alias.language, std::slice::from_ref(&alias.value), &summary)
                .map_err(UploadError::remote(ErrorContext::new("add_aliases").item(item)))?;
            stats.aliases_added += 1;
            info!(item = %item, language = alias.language.as_str(), "alias added");
            note(&mut log, || {
                format!("{item} ADDED ALIAS {} {}", alias.language, alias.value)
            })?;
        }

        Ok(stats)
    }

    pub fn add_descriptions<K: KnowledgeBase + ?Sized>(
        &self,
        kb: &mut K,
        item: &EntityId,
        descriptions: &[TextEntry],
        mut log: AuditSink<'_>,
    ) -> Result<usize> {
        for description in descriptions {
            refresh(&*kb, item)?;
            kb.set_description(
                item,
                &description.language,
                &description.value,
                &self.config.edit_summary,
            )
            .map_err(UploadError::remote(ErrorContext::new("set_description").item(item)))?;
            note(&mut log, || {
                format!(
                    "{item} ADDED DESCRIPTION {} {}",
                    description.language, description.value
                )
            })?;
        }
        Ok(descriptions.len())
    }
}

/// Re-read the item before mutating it.
fn refresh<K: KnowledgeBase + ?Sized>(kb: &K, item: &EntityId) -> Result<ItemState> {
    kb.fetch_item(item)
        .map_err(UploadError::remote(ErrorContext::new("fetch_item").item(item)))
}
