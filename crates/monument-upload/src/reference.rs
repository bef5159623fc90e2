//! Provenance references for claims.
//!
//! Two input shapes are understood:
//!
//! - a bare URL string → one comparison snak `reference_url → url`;
//! - a stated-in map:
//!
//! ```json
//! {
//!   "source":        {"prop": "P248", "value": "Q17373699"},
//!   "published":     {"prop": "P577", "value": {"year": 2014}},
//!   "reference_url": {"prop": "P854", "value": "http://..."}
//! }
//! ```
//!
//! For stated-in references the publication date goes into the supplementary snaks, so two
//! citations of the same source recorded on different dates count as one reference.

use crate::config::require_property;
use crate::error::{ErrorContext, Result, UploadError};
use monument_model::{ClaimValue, EntityId, PropertyMap, Reference, Snak, TimeValue, REFERENCE_URL};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

#[derive(Debug, Deserialize)]
struct PropValue<T> {
    prop: String,
    value: T,
}

#[derive(Debug, Deserialize)]
struct StatedIn {
    source: PropValue<String>,
    published: PropValue<Value>,
    #[serde(default)]
    reference_url: Option<PropValue<String>>,
}

#[derive(Debug, Clone, Copy)]
pub struct ReferenceBuilder<'a> {
    props: &'a PropertyMap,
}

impl<'a> ReferenceBuilder<'a> {
    pub fn new(props: &'a PropertyMap) -> Self {
        Self { props }
    }

    pub fn build(&self, input: &Value) -> Result<Reference> {
        match input {
            Value::String(s) if is_valid_url(s) => self.url_reference(s),
            Value::String(s) => Err(malformed(format!("`{s}` is not a valid URL"))),
            Value::Object(_) => self.stated_in_reference(input),
            other => Err(malformed(format!("unexpected reference value {other}"))),
        }
    }

    pub fn url_reference(&self, url: &str) -> Result<Reference> {
        let prop = require_property(self.props, REFERENCE_URL)?;
        Ok(Reference::new(
            vec![Snak::new(prop, ClaimValue::Text(url.to_string()))],
            Vec::new(),
        ))
    }

    fn stated_in_reference(&self, input: &Value) -> Result<Reference> {
        let stated: StatedIn = serde_json::from_value(input.clone())
            .map_err(|e| malformed(format!("stated-in reference: {e}")))?;

        let source = EntityId::parse(&stated.source.value)
            .map_err(|e| malformed(format!("stated-in source: {e}")))?;
        let published = TimeValue::from_json(&stated.published.value)
            .map_err(|e| malformed(format!("publication date: {e}")))?;

        let mut comparison = vec![Snak::new(stated.source.prop, ClaimValue::EntityRef(source))];
        if let Some(url) = stated.reference_url {
            comparison.push(Snak::new(url.prop, ClaimValue::Text(url.value)));
        }
        let supplementary = vec![Snak::new(stated.published.prop, ClaimValue::Time(published))];

        Ok(Reference::new(comparison, supplementary))
    }
}

/// Absolute http(s) URL with a host.
pub fn is_valid_url(raw: &str) -> bool {
    match Url::parse(raw) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some(),
        Err(_) => false,
    }
}

fn malformed(reason: String) -> UploadError {
    UploadError::MalformedReference {
        context: ErrorContext::new("build_reference"),
        reason,
    }
}
