//! Per-record upload: item selection, labels, descriptions, then claims.

use crate::audit::AuditLog;
use crate::claims::ClaimUploader;
use crate::client::KnowledgeBase;
use crate::config::{Mode, UploadConfig};
use crate::error::Result;
use crate::labels::LabelMerger;
use crate::selector::ItemSelector;
use monument_model::{EntityId, MonumentRecord, PropertyMap};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadReport {
    /// The record is flagged not to be uploaded; nothing was read or written.
    Skipped,
    Uploaded {
        item: EntityId,
        labels: usize,
        aliases_added: usize,
        descriptions: usize,
        claims_added: usize,
        statements_skipped: usize,
    },
}

pub struct Uploader<K> {
    kb: K,
    props: PropertyMap,
    config: UploadConfig,
    audit: Option<Box<dyn AuditLog>>,
}

impl<K: KnowledgeBase> Uploader<K> {
    pub fn new(kb: K, props: PropertyMap, config: UploadConfig) -> Self {
        match config.mode {
            Mode::Live => info!(summary = %config.edit_summary, "live mode"),
            Mode::Sandbox => info!(
                summary = %config.edit_summary,
                item = %config.sandbox_item,
                "sandbox mode"
            ),
        }
        Self {
            kb,
            props,
            config,
            audit: None,
        }
    }

    pub fn with_audit_log(mut self, log: impl AuditLog + 'static) -> Self {
        self.audit = Some(Box::new(log));
        self
    }

    pub fn knowledge_base(&self) -> &K {
        &self.kb
    }

    pub fn into_knowledge_base(self) -> K {
        self.kb
    }

    /// Upload one record. Stops at the first error; edits already made stay on the item.
    pub fn upload(&mut self, record: &MonumentRecord) -> Result<UploadReport> {
        if !record.upload {
            info!(item = ?record.wd_item, "record not flagged for upload, skipping");
            return Ok(UploadReport::Skipped);
        }

        let item = ItemSelector::new(&self.config).select(
            &mut self.kb,
            record.wd_item.as_ref(),
            self.audit.as_deref_mut(),
        )?;

        let labels = record.label_entries();
        let aliases = record.alias_entries();
        let descriptions = record.description_entries();

        let merger = LabelMerger::new(&self.config);
        let label_stats = merger.add_labels(
            &mut self.kb,
            &item,
            &labels,
            &aliases,
            self.audit.as_deref_mut(),
        )?;
        let descriptions = merger.add_descriptions(
            &mut self.kb,
            &item,
            &descriptions,
            self.audit.as_deref_mut(),
        )?;

        let claim_stats = ClaimUploader::new(&self.props, &self.config).add_claims(
            &mut self.kb,
            &item,
            &record.statements,
            self.audit.as_deref_mut(),
        )?;

        info!(
            item = %item,
            claims = claim_stats.added,
            skipped = claim_stats.skipped,
            "record uploaded"
        );
        Ok(UploadReport::Uploaded {
            item,
            labels: label_stats.labels,
            aliases_added: label_stats.aliases_added,
            descriptions,
            claims_added: claim_stats.added,
            statements_skipped: claim_stats.skipped,
        })
    }
}
