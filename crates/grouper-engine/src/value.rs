use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDateTime, Timelike};
use ordered_float::OrderedFloat;

/// A single cell of a [`crate::Table`].
///
/// `Value` is `Eq + Hash` so tuples of values can be used directly as partition keys. Two
/// [`Value::Empty`] cells compare equal, which makes grouping null-safe: rows whose key columns
/// are absent in the same positions land in the same partition.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Value {
    /// Absent / blank cell.
    #[default]
    Empty,
    /// IEEE-754 double precision number. Integers are stored here too, so `3` and `3.0` are the
    /// same value.
    Number(OrderedFloat<f64>),
    Text(Arc<str>),
    Boolean(bool),
    DateTime(NaiveDateTime),
}

impl Value {
    /// Build a numeric value, mapping `NaN` to [`Value::Empty`] and `-0.0` to `0.0`.
    pub fn number(n: f64) -> Self {
        if n.is_nan() {
            Value::Empty
        } else if n == 0.0 {
            Value::Number(OrderedFloat(0.0))
        } else {
            Value::Number(OrderedFloat(n))
        }
    }

    pub fn text(s: impl Into<Arc<str>>) -> Self {
        Value::Text(s.into())
    }

    /// Returns true for cells that carry no value.
    ///
    /// A `Number` holding `NaN` (only constructible by bypassing [`Value::number`]) counts as
    /// absent as well.
    pub fn is_absent(&self) -> bool {
        match self {
            Value::Empty => true,
            Value::Number(n) => n.0.is_nan(),
            _ => false,
        }
    }

    /// Canonical display string used for merge deduplication and ordering.
    ///
    /// Values that compare equal always produce the same string. Absent values have no canonical
    /// text.
    pub fn canonical_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::Empty => None,
            Value::Number(n) => canonical_number(n.0).map(Cow::Owned),
            Value::Text(s) => Some(Cow::Borrowed(s.as_ref())),
            Value::Boolean(b) => Some(Cow::Borrowed(if *b { "TRUE" } else { "FALSE" })),
            Value::DateTime(dt) => Some(Cow::Owned(canonical_datetime(dt))),
        }
    }
}

fn canonical_number(n: f64) -> Option<String> {
    if n.is_nan() {
        return None;
    }
    if n == 0.0 {
        return Some("0".to_string());
    }
    // Rust's float `Display` is shortest round-trip and prints whole numbers without a
    // fractional part (`3.0` -> `3`).
    Some(n.to_string())
}

fn canonical_datetime(dt: &NaiveDateTime) -> String {
    if dt.hour() == 0 && dt.minute() == 0 && dt.second() == 0 && dt.nanosecond() == 0 {
        dt.format("%Y-%m-%d").to_string()
    } else if dt.nanosecond() == 0 {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.canonical_text() {
            Some(text) => f.write_str(&text),
            None => Ok(()),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::number(value as f64)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::number(f64::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(Arc::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(Arc::from(value))
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn whole_numbers_have_no_fractional_suffix() {
        assert_eq!(Value::from(3i64).canonical_text().as_deref(), Some("3"));
        assert_eq!(Value::from(3.0).canonical_text().as_deref(), Some("3"));
        assert_eq!(Value::from(3i64), Value::from(3.0));
        assert_eq!(Value::from(2.5).canonical_text().as_deref(), Some("2.5"));
        assert_eq!(Value::from(-0.0).canonical_text().as_deref(), Some("0"));
    }

    #[test]
    fn nan_is_absent() {
        assert_eq!(Value::from(f64::NAN), Value::Empty);
        assert!(Value::Number(OrderedFloat(f64::NAN)).is_absent());
        assert_eq!(Value::Number(OrderedFloat(f64::NAN)).canonical_text(), None);
    }

    #[test]
    fn booleans_and_dates_render_like_a_spreadsheet() {
        assert_eq!(Value::from(true).to_string(), "TRUE");
        let day = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(
            Value::from(day.and_hms_opt(0, 0, 0).unwrap()).to_string(),
            "2024-03-09"
        );
        assert_eq!(
            Value::from(day.and_hms_opt(13, 5, 0).unwrap()).to_string(),
            "2024-03-09 13:05:00"
        );
        assert_eq!(
            Value::from(day.and_hms_milli_opt(13, 5, 0, 250).unwrap()).to_string(),
            "2024-03-09 13:05:00.250"
        );
    }

    #[test]
    fn empty_displays_as_empty_string() {
        assert_eq!(Value::Empty.to_string(), "");
        assert_eq!(Value::from(None::<&str>), Value::Empty);
    }
}
