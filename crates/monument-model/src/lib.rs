//! Data model for monument uploads.
//!
//! Two halves live here:
//!
//! - the *input* side: [`MonumentRecord`] and its untyped [`StatementInput`]s, exactly as an
//!   ingestion step hands them over (JSON-shaped, order-preserving);
//! - the *output* side: typed [`ClaimValue`]s, [`Claim`]s and [`Reference`]s that a knowledge
//!   base client can write.
//!
//! Nothing in this crate talks to a knowledge base. Deciding how an input value becomes a
//! claim value is the job of `monument-upload`.

pub mod claim;
pub mod entity;
pub mod properties;
pub mod record;
pub mod time;

pub use claim::*;
pub use entity::*;
pub use properties::*;
pub use record::*;
pub use time::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid entity identifier `{0}`")]
    InvalidEntityId(String),
    #[error("invalid time value: {0}")]
    InvalidTime(String),
    #[error("invalid property map: {0}")]
    PropertyMap(String),
    #[error("invalid monument record: {0}")]
    Record(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
