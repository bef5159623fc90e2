//! Untyped input value + target property → typed claim value.
//!
//! Resolution is a priority chain; the first rule that applies decides, later rules are
//! never consulted:
//!
//! 1. a single-element list is unwrapped to its element
//! 2. an item identifier string → entity reference
//! 3. on the image property → media file, unless the item already has an image or the
//!    file is not in the media repository (skip)
//! 4. a `[lat, lon]` pair on the coordinates property → coordinate at fixed precision,
//!    unless the item already has coordinates (skip)
//! 5. a map with `quantity_value` → quantity (unit must be an item)
//! 6. a map with `time_value` → point in time
//! 7. on the commons category property → text, after checking the category exists
//! 8. anything else → text
//!
//! Any existing coordinate claim blocks new ones: re-uploading at a different precision
//! would create conflicting statements, and the store cannot yet "add if same precision".

use crate::client::KnowledgeBase;
use crate::config::require_property;
use crate::error::{ErrorContext, Result, UploadError};
use monument_model::{
    ClaimValue, EntityId, PropertyMap, TimeValue, COMMONS_CATEGORY, COORDINATES, IMAGE,
};
use serde_json::Value;
use tracing::{debug, warn};

/// Degrees. Every coordinate is written at this precision, whatever the input.
pub const COORDINATE_PRECISION: f64 = 0.0001;

pub const QUANTITY_KEY: &str = "quantity_value";
pub const UNIT_KEY: &str = "unit";
pub const TIME_KEY: &str = "time_value";

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Value(ClaimValue),
    /// No claim for this input; not an error.
    Skip(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Empty,
    ImageAlreadyPresent,
    MediaFileMissing,
    CoordinatesAlreadyPresent,
    /// The value has no claim shape (null, boolean, malformed quantity/time, nested data).
    Unresolvable,
}

#[derive(Debug, Clone, Copy)]
pub struct ValueResolver<'a> {
    props: &'a PropertyMap,
}

impl<'a> ValueResolver<'a> {
    pub fn new(props: &'a PropertyMap) -> Self {
        Self { props }
    }

    /// Resolve `value` for `property`.
    ///
    /// `item_has_property` is whether the target item already carries `property`; only
    /// the image and coordinates rules look at it. Pass `false` for qualifiers.
    pub fn resolve<K: KnowledgeBase + ?Sized>(
        &self,
        kb: &K,
        value: &Value,
        property: &str,
        item_has_property: bool,
    ) -> Result<Resolution> {
        self.resolve_value(kb, value, property, item_has_property)
            .map_err(|e| e.for_property(property))
    }

    fn resolve_value<K: KnowledgeBase + ?Sized>(
        &self,
        kb: &K,
        value: &Value,
        property: &str,
        item_has_property: bool,
    ) -> Result<Resolution> {
        let value = unwrap_single(value);

        if value.as_str() == Some("") {
            return Ok(Resolution::Skip(SkipReason::Empty));
        }

        if let Some(id) = entity_id(value) {
            let id = self.resolve_entity(kb, &id, property)?;
            return Ok(Resolution::Value(ClaimValue::EntityRef(id)));
        }

        if property == require_property(self.props, IMAGE)? {
            return self.resolve_image(kb, value, property, item_has_property);
        }

        if let Some((latitude, longitude)) = coordinate_pair(value) {
            if property == require_property(self.props, COORDINATES)? {
                if item_has_property {
                    debug!(property, "item already has coordinates, skipping");
                    return Ok(Resolution::Skip(SkipReason::CoordinatesAlreadyPresent));
                }
                return Ok(Resolution::Value(ClaimValue::Coordinate {
                    latitude,
                    longitude,
                    precision: COORDINATE_PRECISION,
                }));
            }
        }

        if let Some(map) = value.as_object() {
            if let Some(amount) = map.get(QUANTITY_KEY) {
                return self.resolve_quantity(kb, amount, map.get(UNIT_KEY), property);
            }
            if let Some(time) = map.get(TIME_KEY) {
                return Ok(resolve_time(time, property));
            }
        }

        if property == require_property(self.props, COMMONS_CATEGORY)? {
            if let Some(category) = value.as_str() {
                // Passed through either way; a missing category is only worth a note.
                let exists = kb.category_exists(category).map_err(UploadError::remote(
                    ErrorContext::new("category_exists").property(property),
                ))?;
                if !exists {
                    debug!(property, category, "commons category not found");
                }
            }
        }

        Ok(plain_text(value))
    }

    /// The entity branch of the chain on its own: for values that must name an item.
    pub fn resolve_entity_value<K: KnowledgeBase + ?Sized>(
        &self,
        kb: &K,
        value: &Value,
        property: &str,
    ) -> Result<Option<EntityId>> {
        match entity_id(unwrap_single(value)) {
            Some(id) => Ok(Some(self.resolve_entity(kb, &id, property)?)),
            None => Ok(None),
        }
    }

    fn resolve_entity<K: KnowledgeBase + ?Sized>(
        &self,
        kb: &K,
        id: &EntityId,
        property: &str,
    ) -> Result<EntityId> {
        kb.resolve_entity(id).map_err(UploadError::remote(
            ErrorContext::new("resolve_entity").property(property),
        ))
    }

    fn resolve_image<K: KnowledgeBase + ?Sized>(
        &self,
        kb: &K,
        value: &Value,
        property: &str,
        item_has_property: bool,
    ) -> Result<Resolution> {
        if item_has_property {
            debug!(property, "item already has an image, skipping");
            return Ok(Resolution::Skip(SkipReason::ImageAlreadyPresent));
        }
        let Some(filename) = value.as_str() else {
            return Ok(Resolution::Skip(SkipReason::Unresolvable));
        };
        let exists = kb.media_file_exists(filename).map_err(UploadError::remote(
            ErrorContext::new("media_file_exists").property(property),
        ))?;
        if exists {
            Ok(Resolution::Value(ClaimValue::Media(filename.to_string())))
        } else {
            debug!(property, filename, "file not in media repository, skipping");
            Ok(Resolution::Skip(SkipReason::MediaFileMissing))
        }
    }

    fn resolve_quantity<K: KnowledgeBase + ?Sized>(
        &self,
        kb: &K,
        amount: &Value,
        unit: Option<&Value>,
        property: &str,
    ) -> Result<Resolution> {
        let Some(amount) = number(amount) else {
            warn!(property, %amount, "quantity amount is not a number, skipping");
            return Ok(Resolution::Skip(SkipReason::Unresolvable));
        };
        let unit = match unit {
            None | Some(Value::Null) => None,
            Some(raw) => match self.resolve_entity_value(kb, raw, property)? {
                Some(id) => Some(id),
                None => {
                    return Err(UploadError::InvalidUnit {
                        context: ErrorContext::new("resolve_quantity").property(property),
                        value: raw.to_string(),
                    })
                }
            },
        };
        Ok(Resolution::Value(ClaimValue::Quantity { amount, unit }))
    }
}

fn resolve_time(raw: &Value, property: &str) -> Resolution {
    match TimeValue::from_json(raw) {
        Ok(time) => Resolution::Value(ClaimValue::Time(time)),
        Err(err) => {
            warn!(property, error = %err, "unusable time value, skipping");
            Resolution::Skip(SkipReason::Unresolvable)
        }
    }
}

fn plain_text(value: &Value) -> Resolution {
    match value {
        Value::String(s) => Resolution::Value(ClaimValue::Text(s.clone())),
        Value::Number(n) => Resolution::Value(ClaimValue::Text(n.to_string())),
        _ => Resolution::Skip(SkipReason::Unresolvable),
    }
}

/// `[x]` → `x`; anything else unchanged.
pub fn unwrap_single(value: &Value) -> &Value {
    match value {
        Value::Array(items) if items.len() == 1 => &items[0],
        other => other,
    }
}

fn entity_id(value: &Value) -> Option<EntityId> {
    value.as_str().and_then(|s| EntityId::parse(s).ok())
}

/// A two-element array of numbers.
pub fn coordinate_pair(value: &Value) -> Option<(f64, f64)> {
    match value.as_array()?.as_slice() {
        [lat, lon] => Some((lat.as_f64()?, lon.as_f64()?)),
        _ => None,
    }
}

/// A JSON number, or a string holding one.
fn number(value: &Value) -> Option<f64> {
    let n: Option<f64> = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{Call, MemoryKnowledgeBase};
    use monument_model::TimeValue;
    use proptest::prelude::*;
    use serde_json::json;

    fn props() -> PropertyMap {
        PropertyMap::from_pairs([
            ("image", "P18"),
            ("coordinates", "P625"),
            ("commonscat", "P373"),
            ("reference_url", "P854"),
        ])
    }

    fn q(raw: &str) -> EntityId {
        EntityId::parse(raw).unwrap()
    }

    fn resolve(kb: &MemoryKnowledgeBase, value: Value, property: &str, has: bool) -> Resolution {
        let props = props();
        ValueResolver::new(&props)
            .resolve(kb, &value, property, has)
            .unwrap()
    }

    #[test]
    fn item_ids_become_entity_refs() {
        let kb = MemoryKnowledgeBase::new();
        assert_eq!(
            resolve(&kb, json!("Q16970"), "P31", false),
            Resolution::Value(ClaimValue::EntityRef(q("Q16970")))
        );
        assert_eq!(kb.calls(), vec![Call::ResolveEntity(q("Q16970"))]);
    }

    #[test]
    fn entity_refs_follow_redirects() {
        let kb = MemoryKnowledgeBase::new().with_redirect(q("Q1"), q("Q2"));
        assert_eq!(
            resolve(&kb, json!(["Q1"]), "P31", false),
            Resolution::Value(ClaimValue::EntityRef(q("Q2")))
        );
    }

    #[test]
    fn entity_rule_wins_over_image_rule() {
        let kb = MemoryKnowledgeBase::new();
        assert_eq!(
            resolve(&kb, json!("Q5"), "P18", true),
            Resolution::Value(ClaimValue::EntityRef(q("Q5")))
        );
    }

    #[test]
    fn image_requires_file_and_no_existing_image() {
        let kb = MemoryKnowledgeBase::new().with_media_file("Foo.jpg");
        assert_eq!(
            resolve(&kb, json!("Foo.jpg"), "P18", false),
            Resolution::Value(ClaimValue::Media("Foo.jpg".to_string()))
        );
        assert_eq!(
            resolve(&kb, json!("Bar.jpg"), "P18", false),
            Resolution::Skip(SkipReason::MediaFileMissing)
        );

        let kb = MemoryKnowledgeBase::new().with_media_file("Foo.jpg");
        assert_eq!(
            resolve(&kb, json!("Foo.jpg"), "P18", true),
            Resolution::Skip(SkipReason::ImageAlreadyPresent)
        );
        assert_eq!(kb.count("media_file_exists"), 0);
    }

    #[test]
    fn coordinates_use_fixed_precision_and_respect_existing_claims() {
        let kb = MemoryKnowledgeBase::new();
        assert_eq!(
            resolve(&kb, json!([59.8586, 17.6389]), "P625", false),
            Resolution::Value(ClaimValue::Coordinate {
                latitude: 59.8586,
                longitude: 17.6389,
                precision: COORDINATE_PRECISION,
            })
        );
        assert_eq!(
            resolve(&kb, json!([59.8586, 17.6389]), "P625", true),
            Resolution::Skip(SkipReason::CoordinatesAlreadyPresent)
        );
    }

    #[test]
    fn coordinate_pair_on_other_property_is_not_a_coordinate() {
        let kb = MemoryKnowledgeBase::new();
        assert_eq!(
            resolve(&kb, json!([59.8586, 17.6389]), "P1234", false),
            Resolution::Skip(SkipReason::Unresolvable)
        );
    }

    #[test]
    fn quantity_with_unit() {
        let kb = MemoryKnowledgeBase::new();
        assert_eq!(
            resolve(&kb, json!({"quantity_value": 6.85, "unit": "Q11573"}), "P2048", false),
            Resolution::Value(ClaimValue::Quantity {
                amount: 6.85,
                unit: Some(q("Q11573")),
            })
        );
        assert_eq!(
            resolve(&kb, json!({"quantity_value": "12"}), "P1101", false),
            Resolution::Value(ClaimValue::Quantity {
                amount: 12.0,
                unit: None,
            })
        );
        assert_eq!(
            resolve(&kb, json!({"quantity_value": "many"}), "P1101", false),
            Resolution::Skip(SkipReason::Unresolvable)
        );
    }

    #[test]
    fn quantity_unit_must_be_an_item() {
        let props = props();
        let kb = MemoryKnowledgeBase::new();
        let err = ValueResolver::new(&props)
            .resolve(&kb, &json!({"quantity_value": 3, "unit": "metre"}), "P2048", false)
            .unwrap_err();
        assert!(matches!(err, UploadError::InvalidUnit { .. }));
        assert_eq!(err.context().unwrap().property.as_deref(), Some("P2048"));
    }

    #[test]
    fn time_values() {
        let kb = MemoryKnowledgeBase::new();
        assert_eq!(
            resolve(&kb, json!({"time_value": {"year": 1890}}), "P571", false),
            Resolution::Value(ClaimValue::Time(TimeValue::year(1890)))
        );
        assert_eq!(
            resolve(&kb, json!({"time_value": {"year": 1890, "month": 14}}), "P571", false),
            Resolution::Skip(SkipReason::Unresolvable)
        );
    }

    #[test]
    fn commons_category_is_checked_then_passed_through() {
        let kb = MemoryKnowledgeBase::new().with_category("Uppsala Cathedral");
        assert_eq!(
            resolve(&kb, json!("Uppsala Cathedral"), "P373", false),
            Resolution::Value(ClaimValue::Text("Uppsala Cathedral".to_string()))
        );
        assert_eq!(
            resolve(&kb, json!("Nowhere"), "P373", false),
            Resolution::Value(ClaimValue::Text("Nowhere".to_string()))
        );
        assert_eq!(kb.count("category_exists"), 2);
    }

    #[test]
    fn everything_else_is_text_or_unresolvable() {
        let kb = MemoryKnowledgeBase::new();
        assert_eq!(
            resolve(&kb, json!("21300000002805"), "P1260", false),
            Resolution::Value(ClaimValue::Text("21300000002805".to_string()))
        );
        assert_eq!(
            resolve(&kb, json!(42), "P1260", false),
            Resolution::Value(ClaimValue::Text("42".to_string()))
        );
        for value in [json!(null), json!(true), json!({"other": 1})] {
            assert_eq!(
                resolve(&kb, value, "P1260", false),
                Resolution::Skip(SkipReason::Unresolvable)
            );
        }
        assert_eq!(
            resolve(&kb, json!([""]), "P1260", false),
            Resolution::Skip(SkipReason::Empty)
        );
    }

    #[test]
    fn missing_property_configuration_is_fatal() {
        let props = PropertyMap::from_pairs([("coordinates", "P625")]);
        let kb = MemoryKnowledgeBase::new();
        let err = ValueResolver::new(&props)
            .resolve(&kb, &json!("Foo.jpg"), "P18", false)
            .unwrap_err();
        assert!(matches!(err, UploadError::MissingProperty { ref name, .. } if name == "image"));
        let context = err.context().unwrap();
        assert_eq!(context.operation, "property_lookup");
        assert_eq!(context.property.as_deref(), Some("P18"));

        // The entity rule does not need the property map.
        assert!(ValueResolver::new(&props)
            .resolve(&kb, &json!("Q1"), "P31", false)
            .is_ok());
    }

    #[test]
    fn remote_failures_carry_context() {
        let props = props();
        let kb = MemoryKnowledgeBase::new().failing("media_file_exists");
        let err = ValueResolver::new(&props)
            .resolve(&kb, &json!("Foo.jpg"), "P18", false)
            .unwrap_err();
        let context = err.context().unwrap();
        assert_eq!(context.operation, "media_file_exists");
        assert_eq!(context.property.as_deref(), Some("P18"));
    }

    proptest! {
        #[test]
        fn single_element_lists_resolve_like_their_element(text in "[a-z]{1,12}( [a-z]{1,12})?") {
            let kb = MemoryKnowledgeBase::new();
            prop_assert_eq!(
                resolve(&kb, json!([text.clone()]), "P1260", false),
                resolve(&kb, json!(text), "P1260", false)
            );
        }

        #[test]
        fn coordinates_always_get_fixed_precision(lat in -90.0f64..90.0, lon in -180.0f64..180.0) {
            let kb = MemoryKnowledgeBase::new();
            match resolve(&kb, json!([lat, lon]), "P625", false) {
                Resolution::Value(ClaimValue::Coordinate { precision, .. }) => {
                    prop_assert_eq!(precision, COORDINATE_PRECISION)
                }
                other => prop_assert!(false, "unexpected {:?}", other),
            }
        }

        #[test]
        fn existing_image_always_skips(name in "[A-Za-z]{1,10}\\.(jpg|png)") {
            let kb = MemoryKnowledgeBase::new().with_media_file(&name);
            prop_assert_eq!(
                resolve(&kb, json!(name), "P18", true),
                Resolution::Skip(SkipReason::ImageAlreadyPresent)
            );
        }
    }
}
