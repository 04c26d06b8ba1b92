//! Field values and text formatting.
//!
//! Field extractors produce a [`FieldValue`]; text bindings render it with a
//! [`TextFormat`] before pushing it into a view.

use std::fmt;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDateTime, Utc};

/// Default rendering of [`FieldValue::Timestamp`].
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The current value of one data field.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    /// No value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Date and time value.
    Timestamp(NaiveDateTime),
}

impl FieldValue {
    /// Returns `true` if this is `FieldValue::Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Attempts to get the value as a boolean. Integers are `true` when non-zero.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            FieldValue::Int(n) => Some(*n != 0),
            _ => None,
        }
    }

    /// Attempts to get the value as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to get the value as a string slice.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Interpret the value as a point in time.
    ///
    /// Integers are read as milliseconds since the Unix epoch (UTC).
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            FieldValue::Timestamp(ts) => Some(*ts),
            FieldValue::Int(millis) => DateTime::<Utc>::from_timestamp_millis(*millis).map(|dt| dt.naive_utc()),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Int(n) => write!(f, "{n}"),
            FieldValue::Float(n) => write!(f, "{n}"),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Timestamp(ts) => write!(f, "{}", ts.format(DEFAULT_TIMESTAMP_FORMAT)),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Int(value.into())
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Int(value.into())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<f32> for FieldValue {
    fn from(value: f32) -> Self {
        FieldValue::Float(value.into())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_owned())
    }
}

impl From<&String> for FieldValue {
    fn from(value: &String) -> Self {
        FieldValue::Text(value.clone())
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(value: NaiveDateTime) -> Self {
        FieldValue::Timestamp(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

/// Errors raised while rendering a value as text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// A date format was applied to a value that is not a point in time.
    #[error("Value {0} cannot be formatted as a date")]
    NotATimestamp(String),

    /// The date pattern contains an unknown specifier.
    #[error("Invalid date pattern '{0}'")]
    InvalidDatePattern(String),
}

/// How a text binding renders a [`FieldValue`].
///
/// `Null` always renders as an empty string, whatever the format.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TextFormat {
    /// The value's `Display` form.
    #[default]
    Display,
    /// A pattern whose first `{}` is replaced by the value.
    Pattern(String),
    /// A `strftime` pattern applied to timestamps and epoch-millisecond integers.
    Date(String),
}

impl TextFormat {
    /// Create a `{}` pattern format.
    pub fn pattern(pattern: impl Into<String>) -> Self {
        TextFormat::Pattern(pattern.into())
    }

    /// Create a date format.
    pub fn date(pattern: impl Into<String>) -> Self {
        TextFormat::Date(pattern.into())
    }

    /// Render a value.
    pub fn apply(&self, value: &FieldValue) -> Result<String, FormatError> {
        if value.is_null() {
            return Ok(String::new());
        }
        match self {
            TextFormat::Display => Ok(value.to_string()),
            TextFormat::Pattern(pattern) => Ok(pattern.replacen("{}", &value.to_string(), 1)),
            TextFormat::Date(pattern) => {
                let timestamp = value
                    .as_timestamp()
                    .ok_or_else(|| FormatError::NotATimestamp(value.to_string()))?;
                let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
                if items.iter().any(|item| matches!(item, Item::Error)) {
                    return Err(FormatError::InvalidDatePattern(pattern.clone()));
                }
                Ok(timestamp.format_with_items(items.into_iter()).to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn moon_landing() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(1969, 7, 20)
            .unwrap()
            .and_hms_opt(20, 17, 40)
            .unwrap()
    }

    #[test]
    fn test_display_values() {
        assert_eq!(FieldValue::from("Ada").to_string(), "Ada");
        assert_eq!(FieldValue::from(36).to_string(), "36");
        assert_eq!(FieldValue::from(1.5).to_string(), "1.5");
        assert_eq!(FieldValue::from(true).to_string(), "true");
        assert_eq!(FieldValue::from(None::<i32>).to_string(), "");
        assert_eq!(FieldValue::from(moon_landing()).to_string(), "1969-07-20 20:17:40");
    }

    #[test]
    fn test_pattern_format() {
        let format = TextFormat::pattern("Age: {} years");
        assert_eq!(format.apply(&FieldValue::Int(36)).unwrap(), "Age: 36 years");
        assert_eq!(format.apply(&FieldValue::Null).unwrap(), "");

        let literal = TextFormat::pattern("fixed");
        assert_eq!(literal.apply(&FieldValue::Int(1)).unwrap(), "fixed");
    }

    #[test]
    fn test_date_format() {
        let format = TextFormat::date("%d/%m/%Y");
        assert_eq!(format.apply(&FieldValue::from(moon_landing())).unwrap(), "20/07/1969");

        // Epoch milliseconds.
        assert_eq!(format.apply(&FieldValue::Int(0)).unwrap(), "01/01/1970");
    }

    #[test]
    fn test_date_format_errors() {
        let format = TextFormat::date("%Y");
        assert_eq!(
            format.apply(&FieldValue::from("yesterday")),
            Err(FormatError::NotATimestamp("yesterday".into()))
        );

        let bad = TextFormat::date("%Q");
        assert_eq!(
            bad.apply(&FieldValue::from(moon_landing())),
            Err(FormatError::InvalidDatePattern("%Q".into()))
        );
    }

    #[test]
    fn test_conversions() {
        assert_eq!(FieldValue::Int(2).as_bool(), Some(true));
        assert_eq!(FieldValue::Int(0).as_bool(), Some(false));
        assert_eq!(FieldValue::from("x").as_bool(), None);
        assert_eq!(FieldValue::from("x").as_text(), Some("x"));
        assert_eq!(FieldValue::Int(7).as_int(), Some(7));
        assert!(FieldValue::default().is_null());
    }
}
