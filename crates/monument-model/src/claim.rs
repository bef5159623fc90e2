//! Typed claims, qualifiers and references as written to the knowledge base.

use crate::{EntityId, TimeValue};
use serde::{Deserialize, Serialize};

/// A typed claim value.
///
/// Serialized the way the knowledge base encodes values: `{"type": ..., "value": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ClaimValue {
    /// Points at another item.
    EntityRef(EntityId),
    Quantity {
        amount: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unit: Option<EntityId>,
    },
    Time(TimeValue),
    /// Latitude/longitude in degrees with the precision they are stored at.
    Coordinate {
        latitude: f64,
        longitude: f64,
        precision: f64,
    },
    /// A file name in the shared media repository.
    Media(String),
    Text(String),
}

impl ClaimValue {
    pub fn kind(&self) -> &'static str {
        match self {
            ClaimValue::EntityRef(_) => "entity",
            ClaimValue::Quantity { .. } => "quantity",
            ClaimValue::Time(_) => "time",
            ClaimValue::Coordinate { .. } => "coordinate",
            ClaimValue::Media(_) => "media",
            ClaimValue::Text(_) => "text",
        }
    }
}

/// A bare property/value pair: a qualifier, or one source claim inside a reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snak {
    pub property: String,
    pub value: ClaimValue,
}

impl Snak {
    pub fn new(property: impl Into<String>, value: ClaimValue) -> Self {
        Self {
            property: property.into(),
            value,
        }
    }
}

/// Provenance attached to a claim.
///
/// `comparison` snaks decide whether two references are "the same reference";
/// `supplementary` snaks are stored along with them but never compared (access and
/// publication dates legitimately differ between otherwise identical citations).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub comparison: Vec<Snak>,
    #[serde(default)]
    pub supplementary: Vec<Snak>,
}

impl Reference {
    pub fn new(comparison: Vec<Snak>, supplementary: Vec<Snak>) -> Self {
        Self {
            comparison,
            supplementary,
        }
    }

    /// Deduplication equality: only the comparison snaks count.
    pub fn same_source(&self, other: &Reference) -> bool {
        self.comparison == other.comparison
    }
}

/// A statement on an item: main value, qualifiers and references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub property: String,
    pub value: ClaimValue,
    #[serde(default)]
    pub qualifiers: Vec<Snak>,
    #[serde(default)]
    pub references: Vec<Reference>,
}

impl Claim {
    pub fn new(property: impl Into<String>, value: ClaimValue) -> Self {
        Self {
            property: property.into(),
            value,
            qualifiers: Vec::new(),
            references: Vec::new(),
        }
    }

    pub fn with_qualifier(mut self, qualifier: Snak) -> Self {
        self.qualifiers.push(qualifier);
        self
    }

    pub fn with_reference(mut self, reference: Reference) -> Self {
        self.references.push(reference);
        self
    }

    /// Same property, value and qualifiers; references are not considered.
    pub fn same_statement(&self, other: &Claim) -> bool {
        self.property == other.property
            && self.value == other.value
            && self.qualifiers == other.qualifiers
    }

    pub fn has_reference(&self, reference: &Reference) -> bool {
        self.references.iter().any(|r| r.same_source(reference))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stated_in(year: i64) -> Reference {
        Reference::new(
            vec![Snak::new(
                "P248",
                ClaimValue::EntityRef(EntityId::parse("Q17373699").unwrap()),
            )],
            vec![Snak::new("P577", ClaimValue::Time(TimeValue::year(year)))],
        )
    }

    #[test]
    fn references_differing_only_in_supplementary_snaks_are_the_same_source() {
        let a = stated_in(2014);
        let b = stated_in(2017);
        assert!(a.same_source(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn statement_identity_ignores_references() {
        let base = Claim::new("P31", ClaimValue::EntityRef(EntityId::parse("Q4989906").unwrap()));
        let cited = base.clone().with_reference(stated_in(2014));
        assert!(base.same_statement(&cited));
        assert!(cited.has_reference(&stated_in(2020)));
        assert!(!base.has_reference(&stated_in(2014)));

        let qualified = base.clone().with_qualifier(Snak::new("P580", ClaimValue::Time(TimeValue::year(1900))));
        assert!(!base.same_statement(&qualified));
    }

    #[test]
    fn claim_values_use_tagged_encoding() {
        let v = ClaimValue::Media("Foo.jpg".to_string());
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json, serde_json::json!({"type": "media", "value": "Foo.jpg"}));
        assert_eq!(v.kind(), "media");
    }
}
