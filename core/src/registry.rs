//! Registry of declared options.
//!
//! Options are indexed by long name, by initial, and by declaration order.
//! Help lines are interleaved with options in [`Registry::entries`] so the
//! summary renderer can reproduce the declared layout.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::error::{SpecError, SpecErrorKind};
use crate::{Declaration, OptionDef, SpecToken, parse_declaration};

/// Handle to a declared option, valid for the registry that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct OptionId(pub(crate) usize);

impl OptionId {
    /// Position of the option in declaration order.
    pub fn index(self) -> usize {
        self.0
    }
}

/// One line of the declared layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEntry {
    Option(OptionId),
    HelpLine(String),
}

/// What a successful declaration registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declared {
    Option(OptionId),
    HelpLine,
}

impl Declared {
    /// The registered option, or `None` for a help line.
    pub fn option_id(self) -> Option<OptionId> {
        match self {
            Self::Option(id) => Some(id),
            Self::HelpLine => None,
        }
    }
}

/// Declared options and help lines.
///
/// # Examples
///
/// ```
/// use optspec_core::{decl, Registry};
///
/// let mut registry = Registry::new();
/// let id = registry.declare(decl!["f", "foo"]).unwrap().option_id().unwrap();
/// assert_eq!(registry.by_name("foo"), Some(id));
/// assert_eq!(registry.by_initial('f'), Some(id));
///
/// // Names and initials are unique across the registry.
/// assert!(registry.declare(decl!["foo"]).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Registry {
    options: Vec<OptionDef>,
    by_name: HashMap<String, OptionId>,
    by_initial: HashMap<char, OptionId>,
    entries: Vec<RegistryEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and registers one declaration.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError`] if the declaration is malformed or its name or
    /// initial is already registered. The registry is left unchanged.
    pub fn declare(&mut self, tokens: Vec<SpecToken>) -> Result<Declared, SpecError> {
        let def = match parse_declaration(tokens.clone())? {
            Declaration::HelpLine(line) => {
                self.entries.push(RegistryEntry::HelpLine(line));
                return Ok(Declared::HelpLine);
            }
            Declaration::Option(def) => def,
        };

        if let Some(initial) = def.initial {
            if self.by_initial.contains_key(&initial) {
                return Err(SpecError::new(
                    &tokens,
                    SpecErrorKind::DuplicateInitial(initial),
                ));
            }
        }
        if let Some(name) = &def.name {
            if self.by_name.contains_key(name) {
                return Err(SpecError::new(
                    &tokens,
                    SpecErrorKind::DuplicateName(name.clone()),
                ));
            }
        }

        let id = OptionId(self.options.len());
        if let Some(initial) = def.initial {
            self.by_initial.insert(initial, id);
        }
        if let Some(name) = &def.name {
            self.by_name.insert(name.clone(), id);
        }
        debug!(
            option = %def.display_name(),
            flags = %def.flags,
            index = id.0,
            "Registered option"
        );
        self.options.push(def);
        self.entries.push(RegistryEntry::Option(id));
        Ok(Declared::Option(id))
    }

    /// Registers several declarations in order, stopping at the first error.
    ///
    /// Declarations before the failing one stay registered.
    pub fn declare_all<I>(&mut self, declarations: I) -> Result<Vec<Declared>, SpecError>
    where
        I: IntoIterator<Item = Vec<SpecToken>>,
    {
        declarations
            .into_iter()
            .map(|tokens| self.declare(tokens))
            .collect()
    }

    pub fn get(&self, id: OptionId) -> Option<&OptionDef> {
        self.options.get(id.0)
    }

    pub fn by_name(&self, name: &str) -> Option<OptionId> {
        self.by_name.get(name).copied()
    }

    pub fn by_initial(&self, initial: char) -> Option<OptionId> {
        self.by_initial.get(&initial).copied()
    }

    /// Declared options in declaration order.
    pub fn options(&self) -> impl Iterator<Item = (OptionId, &OptionDef)> {
        self.options
            .iter()
            .enumerate()
            .map(|(index, def)| (OptionId(index), def))
    }

    /// Options and help lines in declaration order.
    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    /// Number of declared options (help lines excluded).
    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}
