//! Which item a record's upload edits.

use crate::audit::{note, AuditSink};
use crate::client::KnowledgeBase;
use crate::config::{Mode, UploadConfig};
use crate::error::{ErrorContext, Result, UploadError};
use monument_model::EntityId;
use tracing::info;

pub struct ItemSelector<'a> {
    config: &'a UploadConfig,
}

impl<'a> ItemSelector<'a> {
    pub fn new(config: &'a UploadConfig) -> Self {
        Self { config }
    }

    /// Resolve the target item once, at the start of an upload.
    ///
    /// In live mode a record without an item gets a brand-new one. Item creation is not
    /// idempotent: calling this twice for the same record creates two items.
    pub fn select<K: KnowledgeBase + ?Sized>(
        &self,
        kb: &mut K,
        record_item: Option<&EntityId>,
        mut log: AuditSink<'_>,
    ) -> Result<EntityId> {
        match self.config.mode {
            Mode::Sandbox => Ok(self.config.sandbox_item.clone()),
            Mode::Live => match record_item {
                Some(id) => kb
                    .resolve_entity(id)
                    .map_err(UploadError::remote(ErrorContext::new("resolve_entity").item(id))),
                None => {
                    let id = kb
                        .create_item(&self.config.edit_summary)
                        .map_err(UploadError::remote(ErrorContext::new("create_item")))?;
                    info!(item = %id, "created item");
                    note(&mut log, || format!("{id} CREATE"))?;
                    Ok(id)
                }
            },
        }
    }
}
