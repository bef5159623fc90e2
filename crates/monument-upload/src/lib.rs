//! Monument uploads onto knowledge-base items.
//!
//! ```text
//! MonumentRecord ──► ItemSelector ──► target item
//!                                      │
//!                    LabelMerger ◄─────┤   labels, aliases, descriptions
//!                    ClaimUploader ◄───┘   statements
//!                       ├─ ValueResolver     untyped value → claim value (or skip)
//!                       └─ ReferenceBuilder  URL / stated-in → reference
//! ```
//!
//! Everything talks to the knowledge base through the [`KnowledgeBase`] trait, and every
//! mutation is preceded by a fresh read of the target item. There is no transaction: an
//! error stops the record, and edits already made stay in place.

pub mod audit;
pub mod claims;
pub mod client;
pub mod config;
pub mod error;
pub mod labels;
pub mod memory;
pub mod reference;
pub mod resolve;
pub mod selector;
pub mod uploader;

pub use audit::{AuditLog, AuditSink, FileAuditLog, SharedAuditLog};
pub use claims::{ClaimStats, ClaimUploader};
pub use client::{ItemState, KnowledgeBase};
pub use config::{
    require_property, AliasPolicy, Mode, ReferencePolicy, UploadConfig, DEFAULT_EDIT_SUMMARY,
    DEFAULT_SANDBOX_ITEM,
};
pub use error::{ErrorContext, Result, UploadError};
pub use labels::{LabelMerger, LabelStats};
pub use memory::{Call, MemoryKnowledgeBase};
pub use reference::{is_valid_url, ReferenceBuilder};
pub use resolve::{Resolution, SkipReason, ValueResolver, COORDINATE_PRECISION};
pub use selector::ItemSelector;
pub use uploader::{UploadReport, Uploader};
