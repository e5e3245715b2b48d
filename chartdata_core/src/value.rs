// Copyright 2025 the Chartdata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scalar field values and grouping keys.

extern crate alloc;

use alloc::string::{String, ToString};
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};

/// A single field value of a record.
///
/// Date-like fields are carried as numbers (seconds since the Unix epoch), matching how the
/// time scales downstream model time.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    /// A numeric value. May be non-finite; aggregations skip those.
    Number(f64),
    /// A string value.
    Text(String),
    /// A boolean value.
    Bool(bool),
    /// A missing value.
    #[default]
    Null,
}

impl Value {
    /// Returns the numeric value, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the string value, if this is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Ordering used by row sorts: numbers (total order), then text, then booleans, then nulls.
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        fn rank(v: &Value) -> u8 {
            match v {
                Value::Number(_) => 0,
                Value::Text(_) => 1,
                Value::Bool(_) => 2,
                Value::Null => 3,
            }
        }
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            _ => rank(self).cmp(&rank(other)),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// A key used to bucket records into groups.
///
/// Numeric keys compare and hash on their bit pattern after folding `-0.0` into `0.0`; `NaN` is
/// never a valid key. Numbers order before text.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum GroupKey {
    /// A numeric key (for example a year or a bin index).
    Number(f64),
    /// A categorical key.
    Text(String),
}

impl GroupKey {
    /// Creates a numeric key, or `None` for `NaN`.
    pub fn number(v: f64) -> Option<Self> {
        if v.is_nan() {
            None
        } else if v == 0.0 {
            Some(Self::Number(0.0))
        } else {
            Some(Self::Number(v))
        }
    }

    /// Creates a text key.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Derives a key from a record value. `Null` and `NaN` yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(v) => Self::number(*v),
            Value::Text(s) => Some(Self::Text(s.clone())),
            Value::Bool(b) => Some(Self::Text(b.to_string())),
            Value::Null => None,
        }
    }

    /// Converts this key back into a record value.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Number(v) => Value::Number(*v),
            Self::Text(s) => Value::Text(s.clone()),
        }
    }

    /// Returns the numeric key, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    fn bits(v: f64) -> u64 {
        if v == 0.0 { 0 } else { v.to_bits() }
    }
}

impl PartialEq for GroupKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => Self::bits(*a) == Self::bits(*b),
            (Self::Text(a), Self::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for GroupKey {}

impl Hash for GroupKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::Number(v) => {
                state.write_u8(0);
                state.write_u64(Self::bits(*v));
            }
            Self::Text(s) => {
                state.write_u8(1);
                s.hash(state);
            }
        }
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => {
                let a = if *a == 0.0 { 0.0 } else { *a };
                let b = if *b == 0.0 { 0.0 } else { *b };
                a.total_cmp(&b)
            }
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for GroupKey {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for GroupKey {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i32> for GroupKey {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

/// Returns the proleptic Gregorian (UTC) year for a timestamp in seconds since the Unix epoch.
///
/// Returns `None` for non-finite input or timestamps outside the `i64` range.
pub fn year_of_epoch_seconds(seconds: f64) -> Option<i64> {
    if !(-9.0e15..=9.0e15).contains(&seconds) {
        return None;
    }
    #[allow(
        clippy::cast_possible_truncation,
        reason = "range checked above"
    )]
    let mut secs = seconds as i64;
    // Truncation rounds toward zero; step back to the floor for negative fractions.
    if (secs as f64) > seconds {
        secs -= 1;
    }
    let days = secs.div_euclid(86_400);

    // Civil-from-days over 400-year eras.
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400;
    Some(if month <= 2 { year + 1 } else { year })
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn negative_zero_and_zero_are_the_same_key() {
        let a = GroupKey::number(0.0).unwrap();
        let b = GroupKey::number(-0.0).unwrap();
        assert_eq!(a, b);
        assert!(GroupKey::number(f64::NAN).is_none());
    }

    #[test]
    fn keys_order_numbers_before_text() {
        let mut keys: Vec<GroupKey> = vec!["b".into(), GroupKey::from(2006), "a".into(), 2005.into()];
        keys.sort();
        assert_eq!(
            keys,
            vec![2005.into(), GroupKey::from(2006), "a".into(), "b".into()]
        );
    }

    #[test]
    fn group_key_display_keeps_integers_short() {
        assert_eq!(std::format!("{}", GroupKey::from(2005)), "2005");
        assert_eq!(std::format!("{}", GroupKey::text("North")), "North");
    }

    #[test]
    fn year_from_epoch_seconds() {
        assert_eq!(year_of_epoch_seconds(0.0), Some(1970));
        // 2005-06-15T00:00:00Z
        assert_eq!(year_of_epoch_seconds(1_118_793_600.0), Some(2005));
        // 1969-12-31T23:59:59Z
        assert_eq!(year_of_epoch_seconds(-1.0), Some(1969));
        // 2000-02-29T12:00:00Z
        assert_eq!(year_of_epoch_seconds(951_825_600.0), Some(2000));
        assert_eq!(year_of_epoch_seconds(f64::NAN), None);
    }

    #[test]
    fn value_sort_cmp_puts_nulls_last() {
        let mut values = vec![Value::Null, Value::from("x"), Value::from(2.0), Value::from(1.0)];
        values.sort_by(Value::sort_cmp);
        assert_eq!(
            values,
            vec![Value::from(1.0), Value::from(2.0), Value::from("x"), Value::Null]
        );
    }
}
