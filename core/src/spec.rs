//! Declaration mini-language.
//!
//! A declaration is a short list of tokens describing one option, e.g.
//! `decl!["f", "foo", "=bar", "[FILE]", "Input file", OptionFlags::REQUIRE_VALUE]`.
//! Each text token is classified by the first matching pattern:
//!
//! | Pattern                   | Category    |
//! |---------------------------|-------------|
//! | one letter, digit or `?`  | initial     |
//! | letter, then `[a-z0-9-]+` | name        |
//! | `=` followed by text      | default     |
//! | `[...]`                   | value label |
//! | anything of length >= 2   | description |
//!
//! Flag tokens are OR-ed together. A declaration made of a single text
//! token containing whitespace is a help line rather than an option.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{SpecError, SpecErrorKind};
use crate::{OptionDef, OptionFlags, Value};

/// One token of a declaration.
///
/// Deserializes untagged, so a declaration file can mix strings and flag
/// lists: `["f", "foo", ["REQUIRE_VALUE"]]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpecToken {
    Text(String),
    Flags(OptionFlags),
}

impl From<&str> for SpecToken {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for SpecToken {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<OptionFlags> for SpecToken {
    fn from(flags: OptionFlags) -> Self {
        Self::Flags(flags)
    }
}

/// Builds a declaration (`Vec<SpecToken>`) from strings and flag sets.
///
/// # Examples
///
/// ```
/// use optspec_core::{decl, OptionFlags, SpecToken};
///
/// let tokens = decl!["f", "foo", OptionFlags::ALLOW_FALSE];
/// assert_eq!(tokens.len(), 3);
/// assert_eq!(tokens[2], SpecToken::Flags(OptionFlags::ALLOW_FALSE));
/// ```
#[macro_export]
macro_rules! decl {
    ($($token:expr),* $(,)?) => {
        vec![$($crate::SpecToken::from($token)),*]
    };
}

/// Outcome of parsing one declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Option(OptionDef),
    /// Free-text line kept for the help summary.
    HelpLine(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Initial,
    Name,
    Default,
    ValueLabel,
    Description,
}

impl Category {
    fn label(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Name => "option name",
            Self::Default => "default",
            Self::ValueLabel => "value label",
            Self::Description => "a description",
        }
    }
}

static PATTERNS: LazyLock<DeclarationPatterns> = LazyLock::new(DeclarationPatterns::new);

struct DeclarationPatterns {
    // Tried in order; the last capture group (or the whole match) is kept.
    matchers: [(Category, Regex); 5],
    help_line: Regex,
}

impl DeclarationPatterns {
    fn new() -> Self {
        Self {
            matchers: [
                (
                    Category::Initial,
                    Regex::new(r"^[a-zA-Z0-9?]$").expect("static regex must compile"),
                ),
                (
                    Category::Name,
                    Regex::new(r"^[a-zA-Z][a-zA-Z0-9-]+$").expect("static regex must compile"),
                ),
                (
                    Category::Default,
                    Regex::new(r"(?s)^=(.+)$").expect("static regex must compile"),
                ),
                (
                    Category::ValueLabel,
                    Regex::new(r"(?s)^\[(.+)\]$").expect("static regex must compile"),
                ),
                (
                    Category::Description,
                    Regex::new(r"(?s)^.{2,}$").expect("static regex must compile"),
                ),
            ],
            help_line: Regex::new(r"\s").expect("static regex must compile"),
        }
    }

    fn classify<'t>(&self, token: &'t str) -> Option<(Category, &'t str)> {
        self.matchers.iter().find_map(|(category, re)| {
            let caps = re.captures(token)?;
            let matched = caps.iter().flatten().last()?;
            Some((*category, matched.as_str()))
        })
    }
}

#[derive(Default)]
struct Fields {
    initial: Option<String>,
    name: Option<String>,
    default: Option<String>,
    value_label: Option<String>,
    description: Option<String>,
    flags: OptionFlags,
}

impl Fields {
    fn slot(&mut self, category: Category) -> &mut Option<String> {
        match category {
            Category::Initial => &mut self.initial,
            Category::Name => &mut self.name,
            Category::Default => &mut self.default,
            Category::ValueLabel => &mut self.value_label,
            Category::Description => &mut self.description,
        }
    }
}

/// Parses one declaration into an option definition or a help line.
///
/// # Errors
///
/// Returns [`SpecError`] for an unrecognized token, a repeated category,
/// a missing name and initial, or `FORBID_VALUE` combined with
/// `REQUIRE_VALUE`/`MULTIPLE_VALUES`.
///
/// # Examples
///
/// ```
/// use optspec_core::{decl, parse_declaration, Declaration, OptionFlags, Value};
///
/// let decl = parse_declaration(decl!["f", "foo", "=0", OptionFlags::FORBID_VALUE]).unwrap();
/// let Declaration::Option(def) = decl else { unreachable!() };
/// assert_eq!(def.initial, Some('f'));
/// assert_eq!(def.name.as_deref(), Some("foo"));
/// assert_eq!(def.default, Value::Bool(false));
///
/// let help = parse_declaration(decl!["Output options:"]).unwrap();
/// assert_eq!(help, Declaration::HelpLine("Output options:".into()));
/// ```
pub fn parse_declaration(tokens: Vec<SpecToken>) -> Result<Declaration, SpecError> {
    let patterns = &*PATTERNS;

    if let [SpecToken::Text(text)] = tokens.as_slice() {
        if patterns.help_line.is_match(text) {
            return Ok(Declaration::HelpLine(text.clone()));
        }
    }

    let mut fields = Fields::default();
    for token in &tokens {
        let text = match token {
            SpecToken::Flags(flags) => {
                fields.flags |= *flags;
                continue;
            }
            SpecToken::Text(text) => text,
        };

        let Some((category, matched)) = patterns.classify(text) else {
            return Err(SpecError::new(
                &tokens,
                SpecErrorKind::Unrecognized(text.clone()),
            ));
        };
        trace!(token = %text, category = category.label(), "Classified declaration token");

        let slot = fields.slot(category);
        if let Some(first) = slot.as_ref() {
            return Err(SpecError::new(
                &tokens,
                SpecErrorKind::DuplicateAttribute {
                    attribute: category.label(),
                    first: first.clone(),
                    second: matched.to_string(),
                },
            ));
        }
        *slot = Some(matched.to_string());
    }

    build_definition(&tokens, fields).map(Declaration::Option)
}

fn build_definition(tokens: &[SpecToken], fields: Fields) -> Result<OptionDef, SpecError> {
    let flags = fields.flags;

    if flags.contains(OptionFlags::FORBID_VALUE) {
        if flags.contains(OptionFlags::REQUIRE_VALUE) {
            return Err(SpecError::new(
                tokens,
                SpecErrorKind::ConflictingFlags("REQUIRE_VALUE"),
            ));
        }
        if flags.contains(OptionFlags::MULTIPLE_VALUES) {
            return Err(SpecError::new(
                tokens,
                SpecErrorKind::ConflictingFlags("MULTIPLE_VALUES"),
            ));
        }
    }

    let initial = fields.initial.and_then(|s| s.chars().next());
    if initial.is_none() && fields.name.is_none() {
        return Err(SpecError::new(tokens, SpecErrorKind::MissingIdentity));
    }

    let default = match fields.default {
        Some(raw) if flags.contains(OptionFlags::FORBID_VALUE) => Value::Bool(raw != "0"),
        Some(raw) if flags.contains(OptionFlags::MULTIPLE_VALUES) => Value::List(vec![raw]),
        Some(raw) => Value::Text(raw),
        None if flags.contains(OptionFlags::MULTIPLE_VALUES) => Value::List(Vec::new()),
        None => Value::Unset,
    };

    Ok(OptionDef {
        name: fields.name,
        initial,
        flags,
        default,
        description: fields.description,
        value_label: fields.value_label,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl;

    fn option(tokens: Vec<SpecToken>) -> OptionDef {
        match parse_declaration(tokens).expect("declaration should parse") {
            Declaration::Option(def) => def,
            Declaration::HelpLine(line) => panic!("unexpected help line {line:?}"),
        }
    }

    fn error_kind(tokens: Vec<SpecToken>) -> SpecErrorKind {
        parse_declaration(tokens).expect_err("declaration should fail").kind
    }

    #[test]
    fn test_classifies_every_category() {
        let def = option(decl!["f", "foo", "=bar", "[FILE]", "Input file"]);
        assert_eq!(def.initial, Some('f'));
        assert_eq!(def.name.as_deref(), Some("foo"));
        assert_eq!(def.default, Value::Text("bar".into()));
        assert_eq!(def.value_label.as_deref(), Some("FILE"));
        assert_eq!(def.description.as_deref(), Some("Input file"));
        assert!(def.flags.is_empty());
    }

    #[test]
    fn test_question_mark_and_digit_initials() {
        assert_eq!(option(decl!["?"]).initial, Some('?'));
        assert_eq!(option(decl!["4", "ipv4"]).initial, Some('4'));
    }

    #[test]
    fn test_single_word_description_collides_with_name() {
        // "Chatty" matches the name pattern before the description pattern.
        assert!(matches!(
            error_kind(decl!["v", "verbose", "Chatty"]),
            SpecErrorKind::DuplicateAttribute { attribute: "option name", .. }
        ));
        let def = option(decl!["v", "verbose", "Be chatty"]);
        assert_eq!(def.description.as_deref(), Some("Be chatty"));
    }

    #[test]
    fn test_flags_are_or_combined() {
        let def = option(decl![
            "foo",
            OptionFlags::REQUIRE_VALUE,
            OptionFlags::MULTIPLE_VALUES
        ]);
        assert_eq!(
            def.flags,
            OptionFlags::REQUIRE_VALUE | OptionFlags::MULTIPLE_VALUES
        );
        assert_eq!(def.default, Value::List(Vec::new()));
    }

    #[test]
    fn test_default_cast_by_flags() {
        let switch = option(decl!["foo", "=0", OptionFlags::FORBID_VALUE]);
        assert_eq!(switch.default, Value::Bool(false));

        let switch = option(decl!["foo", "=yes", OptionFlags::FORBID_VALUE]);
        assert_eq!(switch.default, Value::Bool(true));

        let list = option(decl!["foo", "=a", OptionFlags::MULTIPLE_VALUES]);
        assert_eq!(list.default, Value::List(vec!["a".into()]));
    }

    #[test]
    fn test_single_whitespace_token_is_help_line() {
        assert_eq!(
            parse_declaration(decl!["General options"]).unwrap(),
            Declaration::HelpLine("General options".into())
        );
    }

    #[test]
    fn test_rejects_duplicate_category() {
        assert_eq!(
            error_kind(decl!["f", "g"]),
            SpecErrorKind::DuplicateAttribute {
                attribute: "initial",
                first: "f".into(),
                second: "g".into(),
            }
        );
        assert!(matches!(
            error_kind(decl!["foo", "=a", "=b"]),
            SpecErrorKind::DuplicateAttribute { attribute: "default", .. }
        ));
    }

    #[test]
    fn test_rejects_unrecognized_token() {
        assert_eq!(
            error_kind(decl!["f", "-"]),
            SpecErrorKind::Unrecognized("-".into())
        );
        assert_eq!(error_kind(decl!["f", ""]), SpecErrorKind::Unrecognized(String::new()));
    }

    #[test]
    fn test_requires_name_or_initial() {
        assert_eq!(
            error_kind(decl!["=bar", "[FILE]"]),
            SpecErrorKind::MissingIdentity
        );
        assert_eq!(
            error_kind(decl![OptionFlags::REQUIRED]),
            SpecErrorKind::MissingIdentity
        );
    }

    #[test]
    fn test_rejects_forbid_value_with_value_flags() {
        assert_eq!(
            error_kind(decl![
                "foo",
                OptionFlags::FORBID_VALUE | OptionFlags::REQUIRE_VALUE
            ]),
            SpecErrorKind::ConflictingFlags("REQUIRE_VALUE")
        );
        assert_eq!(
            error_kind(decl![
                "foo",
                OptionFlags::FORBID_VALUE,
                OptionFlags::MULTIPLE_VALUES
            ]),
            SpecErrorKind::ConflictingFlags("MULTIPLE_VALUES")
        );
    }

    #[test]
    fn test_error_keeps_full_declaration() {
        let err = parse_declaration(decl!["f", "foo", "!"]).unwrap_err();
        assert_eq!(err.declaration, decl!["f", "foo", "!"]);
    }
}
