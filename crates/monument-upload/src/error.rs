//! Error types for the upload pipeline.
//!
//! Benign skips (an image already on the item, a value with no claim shape) are *not*
//! errors; see [`crate::SkipReason`]. Everything here aborts the current record.

use monument_model::{EntityId, ModelError};
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, UploadError>;

/// Where a failing call happened: enough to diagnose without replaying the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    pub operation: &'static str,
    pub item: Option<EntityId>,
    pub property: Option<String>,
}

impl ErrorContext {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            item: None,
            property: None,
        }
    }

    pub fn item(mut self, item: &EntityId) -> Self {
        self.item = Some(item.clone());
        self
    }

    pub fn property(mut self, property: &str) -> Self {
        self.property = Some(property.to_string());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`", self.operation)?;
        if let Some(item) = &self.item {
            write!(f, " on {item}")?;
        }
        if let Some(property) = &self.property {
            write!(f, " for {property}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum UploadError {
    /// A friendly property name the pipeline needs is not in the property map.
    #[error("property `{name}` is not configured in the property map (needed by {context})")]
    MissingProperty { name: String, context: ErrorContext },

    /// A knowledge-base call failed. Writes already made stay in place.
    #[error("knowledge base call {context} failed: {source}")]
    Remote {
        context: ErrorContext,
        #[source]
        source: anyhow::Error,
    },

    #[error("malformed reference {context}: {reason}")]
    MalformedReference {
        context: ErrorContext,
        reason: String,
    },

    #[error("quantity unit {context} is not an item: {value}")]
    InvalidUnit { context: ErrorContext, value: String },

    #[error("audit log write failed: {source}")]
    Audit {
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl UploadError {
    pub(crate) fn remote(context: ErrorContext) -> impl FnOnce(anyhow::Error) -> UploadError {
        move |source| UploadError::Remote { context, source }
    }

    /// Fill in the target item on errors raised below the point where it is known.
    pub fn for_item(mut self, item: &EntityId) -> Self {
        if let Some(context) = self.context_mut() {
            context.item.get_or_insert_with(|| item.clone());
        }
        self
    }

    /// Fill in the statement or qualifier property, keeping one already recorded.
    pub fn for_property(mut self, property: &str) -> Self {
        if let Some(context) = self.context_mut() {
            context
                .property
                .get_or_insert_with(|| property.to_string());
        }
        self
    }

    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            UploadError::MissingProperty { context, .. }
            | UploadError::Remote { context, .. }
            | UploadError::MalformedReference { context, .. }
            | UploadError::InvalidUnit { context, .. } => Some(context),
            UploadError::Audit { .. } | UploadError::Model(_) => None,
        }
    }

    fn context_mut(&mut self) -> Option<&mut ErrorContext> {
        match self {
            UploadError::MissingProperty { context, .. }
            | UploadError::Remote { context, .. }
            | UploadError::MalformedReference { context, .. }
            | UploadError::InvalidUnit { context, .. } => Some(context),
            UploadError::Audit { .. } | UploadError::Model(_) => None,
        }
    }
}
