//! Statement map → claims on the target item.

use crate::audit::{note, AuditSink};
use crate::client::KnowledgeBase;
use crate::config::{ReferencePolicy, UploadConfig};
use crate::error::{ErrorContext, Result, UploadError};
use crate::reference::ReferenceBuilder;
use crate::resolve::{Resolution, ValueResolver};
use indexmap::IndexMap;
use monument_model::{Claim, EntityId, PropertyMap, Reference, Snak, StatementInput};
use serde_json::Value;
use tracing::{debug, info, warn};

/// What happened to a statement map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClaimStats {
    pub added: usize,
    pub skipped: usize,
}

pub struct ClaimUploader<'a> {
    resolver: ValueResolver<'a>,
    references: ReferenceBuilder<'a>,
    config: &'a UploadConfig,
}

impl<'a> ClaimUploader<'a> {
    pub fn new(props: &'a PropertyMap, config: &'a UploadConfig) -> Self {
        Self {
            resolver: ValueResolver::new(props),
            references: ReferenceBuilder::new(props),
            config,
        }
    }

    /// Add one claim per statement, properties and statements in input order.
    ///
    /// Only the image and coordinates properties are protected against duplicates (the
    /// resolver skips them when the item already uses the property); repeated uploads
    /// submit every other statement again.
    pub fn add_claims<K: KnowledgeBase + ?Sized>(
        &self,
        kb: &mut K,
        item: &EntityId,
        statements: &IndexMap<String, Vec<StatementInput>>,
        mut log: AuditSink<'_>,
    ) -> Result<ClaimStats> {
        let mut stats = ClaimStats::default();
        for (property, inputs) in statements {
            for input in inputs {
                if input.value.as_str() == Some("") {
                    stats.skipped += 1;
                    continue;
                }
                let added = self
                    .add_claim(kb, item, property, input, &mut log)
                    .map_err(|e| e.for_property(property).for_item(item))?;
                if added {
                    stats.added += 1;
                } else {
                    stats.skipped += 1;
                }
            }
        }
        Ok(stats)
    }

    fn add_claim<K: KnowledgeBase + ?Sized>(
        &self,
        kb: &mut K,
        item: &EntityId,
        property: &str,
        input: &StatementInput,
        log: &mut AuditSink<'_>,
    ) -> Result<bool> {
        // Earlier claims in this upload may have changed the item.
        let state = kb.fetch_item(item).map_err(UploadError::remote(
            ErrorContext::new("fetch_item").item(item).property(property),
        ))?;

        let value = match self
            .resolver
            .resolve(&*kb, &input.value, property, state.has_property(property))?
        {
            Resolution::Value(value) => value,
            Resolution::Skip(reason) => {
                debug!(item = %item, property, ?reason, "no claim for statement");
                return Ok(false);
            }
        };

        let mut claim = Claim::new(property, value);
        for (qualifier, raw) in &input.quals {
            match self.resolver.resolve(&*kb, raw, qualifier, false)? {
                Resolution::Value(value) => claim = claim.with_qualifier(Snak::new(qualifier, value)),
                Resolution::Skip(reason) => {
                    debug!(item = %item, property, qualifier = qualifier.as_str(), ?reason, "qualifier dropped")
                }
            }
        }
        if let Some(reference) = self.last_reference(property, &input.refs)? {
            claim = claim.with_reference(reference);
        }

        kb.add_claim(item, &claim, &self.config.edit_summary)
            .map_err(UploadError::remote(
                ErrorContext::new("add_claim").item(item).property(property),
            ))?;
        info!(item = %item, property, kind = claim.value.kind(), "claim added");
        note(log, || format!("{item} ADDED CLAIM {property}"))?;
        Ok(true)
    }

    /// Every entry is built, but only the last one is attached to the claim.
    // TODO: attach all references once the owners of the upload contract confirm that
    // multi-reference statements should keep every entry.
    fn last_reference(&self, property: &str, refs: &[Value]) -> Result<Option<Reference>> {
        let mut retained = None;
        for raw in refs {
            match self.references.build(raw) {
                Ok(reference) => retained = Some(reference),
                Err(err @ UploadError::MalformedReference { .. }) => match self.config.reference_policy {
                    ReferencePolicy::Abort => return Err(err),
                    ReferencePolicy::Detach => {
                        warn!(property, error = %err, "malformed reference, claim submitted without it");
                        retained = None;
                    }
                },
                Err(err) => return Err(err),
            }
        }
        Ok(retained)
    }
}
