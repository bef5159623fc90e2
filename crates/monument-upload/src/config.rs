//! Uploader configuration.

use crate::{ErrorContext, Result, UploadError};
use monument_model::{EntityId, PropertyMap};
use serde::{Deserialize, Serialize};

/// The shared test item every sandbox upload writes to.
pub const DEFAULT_SANDBOX_ITEM: &str = "Q4115189";
pub const DEFAULT_EDIT_SUMMARY: &str = "test";

/// Which item an upload targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Edit the record's own item, creating one when it has none.
    Live,
    /// Edit the fixed sandbox item regardless of the record.
    #[default]
    Sandbox,
}

/// What to do when an alias is already present on the item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AliasPolicy {
    /// Stop processing the remaining aliases of the record.
    #[default]
    StopOnDuplicate,
    /// Skip the duplicate and carry on with the next alias.
    SkipDuplicate,
}

/// What to do with a reference entry that is neither a URL nor a stated-in map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferencePolicy {
    /// Log it and submit the claim without a reference.
    #[default]
    Detach,
    /// Fail the record.
    Abort,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub mode: Mode,
    pub sandbox_item: EntityId,
    pub edit_summary: String,
    pub alias_policy: AliasPolicy,
    pub reference_policy: ReferencePolicy,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            sandbox_item: EntityId::parse(DEFAULT_SANDBOX_ITEM).unwrap(),
            edit_summary: DEFAULT_EDIT_SUMMARY.to_string(),
            alias_policy: AliasPolicy::default(),
            reference_policy: ReferencePolicy::default(),
        }
    }
}

impl UploadConfig {
    pub fn live() -> Self {
        Self {
            mode: Mode::Live,
            ..Self::default()
        }
    }

    pub fn sandbox() -> Self {
        Self::default()
    }

    pub fn with_edit_summary(mut self, summary: impl Into<String>) -> Self {
        self.edit_summary = summary.into();
        self
    }

    pub fn with_alias_policy(mut self, policy: AliasPolicy) -> Self {
        self.alias_policy = policy;
        self
    }

    pub fn with_reference_policy(mut self, policy: ReferencePolicy) -> Self {
        self.reference_policy = policy;
        self
    }

    pub fn with_sandbox_item(mut self, item: EntityId) -> Self {
        self.sandbox_item = item;
        self
    }
}

/// Look up a friendly property name, treating its absence as a deployment error.
pub fn require_property<'p>(props: &'p PropertyMap, name: &str) -> Result<&'p str> {
    props
        .get(name)
        .ok_or_else(|| UploadError::MissingProperty {
            name: name.to_string(),
            context: ErrorContext::new("property_lookup"),
        })
}
