//! Point-in-time values.
//!
//! Mirrors the knowledge base's time datatype: calendar fields plus a precision code
//! (9 = year, 10 = month, 11 = day, ... 14 = second). Only year precision is exercised
//! by real monument data; finer fields are carried through but ranges are not supported.

use crate::ModelError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PRECISION_YEAR: u8 = 9;
pub const PRECISION_MONTH: u8 = 10;
pub const PRECISION_DAY: u8 = 11;
pub const PRECISION_SECOND: u8 = 14;

pub const GREGORIAN_CALENDAR: &str = "http://www.wikidata.org/entity/Q1985727";

fn default_calendar() -> String {
    GREGORIAN_CALENDAR.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeValue {
    pub year: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minute: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u8>,
    #[serde(default)]
    pub before: u32,
    #[serde(default)]
    pub after: u32,
    #[serde(default)]
    pub timezone: i32,
    #[serde(default = "default_calendar")]
    pub calendarmodel: String,
}

impl TimeValue {
    pub fn year(year: i64) -> Self {
        Self {
            year,
            month: None,
            day: None,
            hour: None,
            minute: None,
            second: None,
            precision: None,
            before: 0,
            after: 0,
            timezone: 0,
            calendarmodel: default_calendar(),
        }
    }

    /// Parse and validate the JSON field map of a time value
    /// (e.g. `{"year": 1890}` or `{"year": 1890, "month": 5, "precision": 10}`).
    pub fn from_json(value: &Value) -> Result<Self, ModelError> {
        let time: TimeValue = serde_json::from_value(value.clone())
            .map_err(|e| ModelError::InvalidTime(e.to_string()))?;
        time.validate()?;
        Ok(time)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        let check = |field: &str, v: Option<u8>, lo: u8, hi: u8| match v {
            Some(v) if v < lo || v > hi => Err(ModelError::InvalidTime(format!(
                "{field} {v} out of range {lo}..={hi}"
            ))),
            _ => Ok(()),
        };
        check("month", self.month, 1, 12)?;
        check("day", self.day, 1, 31)?;
        check("hour", self.hour, 0, 23)?;
        check("minute", self.minute, 0, 59)?;
        check("second", self.second, 0, 59)?;
        check("precision", self.precision, 0, PRECISION_SECOND)?;
        if self.day.is_some() && self.month.is_none() {
            return Err(ModelError::InvalidTime("day given without month".to_string()));
        }
        Ok(())
    }

    /// Explicit precision, or the one implied by the most specific field present.
    pub fn effective_precision(&self) -> u8 {
        if let Some(p) = self.precision {
            return p;
        }
        if self.second.is_some() {
            PRECISION_SECOND
        } else if self.minute.is_some() {
            13
        } else if self.hour.is_some() {
            12
        } else if self.day.is_some() {
            PRECISION_DAY
        } else if self.month.is_some() {
            PRECISION_MONTH
        } else {
            PRECISION_YEAR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn year_only_defaults_to_year_precision() {
        let t = TimeValue::from_json(&json!({"year": 1890})).unwrap();
        assert_eq!(t, TimeValue::year(1890));
        assert_eq!(t.effective_precision(), PRECISION_YEAR);
        assert_eq!(t.calendarmodel, GREGORIAN_CALENDAR);
    }

    #[test]
    fn precision_follows_most_specific_field() {
        let t = TimeValue::from_json(&json!({"year": 2014, "month": 6})).unwrap();
        assert_eq!(t.effective_precision(), PRECISION_MONTH);
        let t = TimeValue::from_json(&json!({"year": 2014, "month": 6, "day": 1})).unwrap();
        assert_eq!(t.effective_precision(), PRECISION_DAY);
        let t = TimeValue::from_json(&json!({"year": 2014, "month": 6, "precision": 9})).unwrap();
        assert_eq!(t.effective_precision(), PRECISION_YEAR);
    }

    #[test]
    fn rejects_out_of_range_and_unknown_fields() {
        assert!(TimeValue::from_json(&json!({"year": 2014, "month": 13})).is_err());
        assert!(TimeValue::from_json(&json!({"year": 2014, "day": 3})).is_err());
        assert!(TimeValue::from_json(&json!({"year": 2014, "decade": 201})).is_err());
        assert!(TimeValue::from_json(&json!({"month": 2})).is_err());
        assert!(TimeValue::from_json(&json!("2014")).is_err());
    }
}
