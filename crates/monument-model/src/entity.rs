//! Knowledge-base entity identifiers (`Q42`-style item ids).

use crate::ModelError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static ITEM_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Q[1-9][0-9]*$").unwrap());

/// Identifier of an item in the knowledge base.
///
/// Always syntactically valid: the only way to build one is through [`EntityId::parse`]
/// (or serde, which goes through the same check).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId(String);

impl EntityId {
    pub fn parse(raw: &str) -> Result<Self, ModelError> {
        if Self::is_valid(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(ModelError::InvalidEntityId(raw.to_string()))
        }
    }

    /// Does `raw` look like an item identifier?
    pub fn is_valid(raw: &str) -> bool {
        ITEM_ID_RE.is_match(raw)
    }

    /// Build the identifier for item number `n` (`Q{n}`).
    pub fn from_number(n: u64) -> Result<Self, ModelError> {
        Self::parse(&format!("Q{n}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn number(&self) -> u64 {
        // The pattern guarantees digits after the prefix.
        self.0[1..].parse().unwrap_or(0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for EntityId {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if Self::is_valid(&value) {
            Ok(Self(value))
        } else {
            Err(ModelError::InvalidEntityId(value))
        }
    }
}

impl From<EntityId> for String {
    fn from(value: EntityId) -> Self {
        value.0
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_item_ids() {
        assert!(EntityId::is_valid("Q1"));
        assert!(EntityId::is_valid("Q11573"));
        assert_eq!(EntityId::parse("Q4115189").unwrap().number(), 4115189);
    }

    #[test]
    fn rejects_other_strings() {
        for raw in ["", "Q", "Q0", "Q012", "q42", "P18", "Q42 ", " Q42", "Foo.jpg", "Q4a"] {
            assert!(!EntityId::is_valid(raw), "{raw:?} should not be an item id");
        }
        assert!(matches!(
            EntityId::parse("P18"),
            Err(ModelError::InvalidEntityId(_))
        ));
    }

    #[test]
    fn serde_goes_through_validation() {
        let id: EntityId = serde_json::from_str("\"Q42\"").unwrap();
        assert_eq!(id.as_str(), "Q42");
        assert!(serde_json::from_str::<EntityId>("\"Douglas\"").is_err());
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"Q42\"");
    }

    proptest::proptest! {
        #[test]
        fn numbered_ids_parse_back_to_their_number(n in 1u64..u64::MAX / 10) {
            let id = EntityId::from_number(n).unwrap();
            proptest::prop_assert_eq!(id.number(), n);
            proptest::prop_assert_eq!(EntityId::parse(id.as_str()).unwrap(), id);
        }

        #[test]
        fn property_ids_are_never_item_ids(n in 1u64..1_000_000) {
            let raw = format!("P{n}");
            proptest::prop_assert!(!EntityId::is_valid(&raw));
        }
    }
}
