//! Friendly property names → knowledge-base property identifiers.
//!
//! Loaded once (usually from `properties.json`) and handed to whoever needs to know
//! which property id means "image" or "coordinates" in the target knowledge base.

use crate::ModelError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const IMAGE: &str = "image";
pub const COORDINATES: &str = "coordinates";
pub const COMMONS_CATEGORY: &str = "commonscat";
pub const REFERENCE_URL: &str = "reference_url";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyMap(BTreeMap<String, String>);

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn from_json_str(text: &str) -> Result<Self, ModelError> {
        let map: PropertyMap =
            serde_json::from_str(text).map_err(|e| ModelError::PropertyMap(e.to_string()))?;
        for (name, id) in &map.0 {
            if !is_property_id(id) {
                return Err(ModelError::PropertyMap(format!(
                    "`{name}` maps to `{id}`, which is not a property identifier"
                )));
            }
        }
        Ok(map)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn is_property_id(id: &str) -> bool {
    id.len() > 1 && id.starts_with('P') && id[1..].bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"image": "P18", "coordinates": "P625", "commonscat": "P373", "reference_url": "P854"}}"#
        )
        .unwrap();

        let props = PropertyMap::from_json_file(file.path()).unwrap();
        assert_eq!(props.len(), 4);
        assert_eq!(props.get(IMAGE), Some("P18"));
        assert_eq!(props.get(COORDINATES), Some("P625"));
        assert_eq!(props.get("heritage_status"), None);
    }

    #[test]
    fn rejects_non_property_ids() {
        assert!(matches!(
            PropertyMap::from_json_str(r#"{"image": "Q18"}"#),
            Err(ModelError::PropertyMap(_))
        ));
        assert!(PropertyMap::from_json_str("[1, 2]").is_err());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            PropertyMap::from_json_file(dir.path().join("properties.json")),
            Err(ModelError::Io(_))
        ));
    }
}
