//! Declared options and their per-parse value state.
//!
//! An [`OptionDef`] is the immutable result of a declaration. Parsing works
//! on a [`ParsedOption`] copy of each definition, whose only mutating
//! transition is [`ParsedOption::assign`].

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::{OptionFlags, Value};

/// An immutable option declaration.
///
/// Built by the declaration parser (see [`crate::parse_declaration`]); at
/// least one of `name` and `initial` is always set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionDef {
    /// Long form without dashes (e.g. `"verbose"`).
    pub name: Option<String>,
    /// Short form (e.g. `'v'`).
    pub initial: Option<char>,
    pub flags: OptionFlags,
    /// Value before any argument is applied.
    pub default: Value,
    /// Description for help output.
    pub description: Option<String>,
    /// Value placeholder for help output (e.g. `"FILE"`).
    pub value_label: Option<String>,
}

impl OptionDef {
    /// Creates a definition with no flags, default, or help metadata.
    pub(crate) fn bare(name: Option<String>, initial: Option<char>) -> Self {
        Self {
            name,
            initial,
            flags: OptionFlags::EMPTY,
            default: Value::Unset,
            description: None,
            value_label: None,
        }
    }

    pub fn is_required(&self) -> bool {
        self.flags.contains(OptionFlags::REQUIRED)
    }

    pub fn forbids_value(&self) -> bool {
        self.flags.contains(OptionFlags::FORBID_VALUE)
    }

    pub fn requires_value(&self) -> bool {
        self.flags.contains(OptionFlags::REQUIRE_VALUE)
    }

    pub fn allows_multiple(&self) -> bool {
        self.flags.contains(OptionFlags::MULTIPLE_VALUES)
    }

    pub fn allows_false(&self) -> bool {
        self.flags.contains(OptionFlags::ALLOW_FALSE)
    }

    /// Lookup key: the long name, falling back to the initial.
    pub fn key(&self) -> String {
        match (&self.name, self.initial) {
            (Some(name), _) => name.clone(),
            (None, Some(initial)) => initial.to_string(),
            (None, None) => String::new(),
        }
    }

    /// Command-line spelling (`--name`, falling back to `-i`).
    ///
    /// # Examples
    ///
    /// ```
    /// use optspec_core::{decl, parse_declaration, Declaration};
    ///
    /// let Declaration::Option(def) = parse_declaration(decl!["v", "verbose"]).unwrap() else {
    ///     unreachable!()
    /// };
    /// assert_eq!(def.display_name(), "--verbose");
    /// ```
    pub fn display_name(&self) -> String {
        match (&self.name, self.initial) {
            (Some(name), _) => format!("--{name}"),
            (None, Some(initial)) => format!("-{initial}"),
            (None, None) => String::new(),
        }
    }
}

/// A value being applied to an option by the matching engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assignment {
    /// The option token itself: `true`, or `false` when negated.
    Switch(bool),
    /// Inline `=value` or a following bare token.
    Text(String),
}

impl Assignment {
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }
}

/// Raised when a single-valued option receives a second value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("multiple values not allowed")]
pub struct MultipleValuesNotAllowed;

/// An option's state during and after a parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedOption {
    #[serde(flatten)]
    def: OptionDef,
    value: Value,
    present: bool,
}

impl ParsedOption {
    pub(crate) fn new(def: OptionDef) -> Self {
        let value = def.default.clone();
        Self {
            def,
            value,
            present: false,
        }
    }

    pub fn def(&self) -> &OptionDef {
        &self.def
    }

    pub fn name(&self) -> Option<&str> {
        self.def.name.as_deref()
    }

    pub fn initial(&self) -> Option<char> {
        self.def.initial
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Whether the option occurred in argv. A declared default does not count.
    pub fn present(&self) -> bool {
        self.present
    }

    /// Applies one value to the option.
    ///
    /// Lists append text after any declared default; a switch on a list is
    /// a no-op and a negation clears it. Scalars accept a value while not
    /// yet present, or text replacing the `true` placeholder left by the
    /// option token; anything else is a conflict.
    pub fn assign(&mut self, incoming: Assignment) -> Result<(), MultipleValuesNotAllowed> {
        match (&mut self.value, incoming) {
            (Value::List(items), Assignment::Text(text)) => items.push(text),
            (Value::List(_), Assignment::Switch(true)) => {}
            // A list cannot hold `false`; negation drops what was collected.
            (Value::List(items), Assignment::Switch(false)) => items.clear(),
            (current, incoming) => {
                let replaces_placeholder =
                    matches!(current, Value::Bool(true)) && incoming.is_text();
                if self.present && !replaces_placeholder {
                    return Err(MultipleValuesNotAllowed);
                }
                *current = match incoming {
                    Assignment::Switch(b) => Value::Bool(b),
                    Assignment::Text(text) => Value::Text(text),
                };
            }
        }
        self.present = true;
        Ok(())
    }
}

impl fmt::Display for ParsedOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Value::Text(text) => f.write_str(text),
            Value::Bool(true) => f.write_str(&self.def.key()),
            Value::List(items) => f.write_str(&items.join(",")),
            Value::Bool(false) | Value::Unset => Ok(()),
        }
    }
}
