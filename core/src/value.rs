//! The value an option holds after parsing.

use serde::Serialize;

/// Current value of an option.
///
/// Serializes untagged: `null`, a boolean, a string, or an array of strings.
///
/// # Examples
///
/// ```
/// use optspec_core::Value;
///
/// let value = Value::Text("bar".into());
/// assert_eq!(value.as_str(), Some("bar"));
/// assert_eq!(value.as_bool(), None);
/// assert!(Value::Unset.is_unset());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Never assigned and no default declared.
    #[default]
    Unset,
    /// Switch state: `true` when matched, `false` when negated.
    Bool(bool),
    /// A single string value.
    Text(String),
    /// Accumulated values of a multi-valued option.
    List(Vec<String>),
}

impl Value {
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}
