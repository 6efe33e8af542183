//! The outcome of a successful parse.

use std::collections::HashMap;

use serde::Serialize;

use crate::{OptionDef, OptionId, ParsedOption, Value};

/// One entry of the ordered parse result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Slot {
    /// A token matched this option (repeats allowed).
    Option(OptionId),
    /// A positional argument.
    Argument(String),
}

/// A resolved entry of the ordered parse result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Item<'a> {
    Option(&'a ParsedOption),
    Argument(&'a str),
}

/// Ordered parse result plus the lookup indices derived from it.
///
/// Declared options occupy the first ids in declaration order; options
/// synthesized for undeclared tokens are appended after them.
#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    options: Vec<ParsedOption>,
    slots: Vec<Slot>,
    by_name: HashMap<String, OptionId>,
    by_initial: HashMap<char, OptionId>,
    matched: Vec<OptionId>,
    declared: usize,
}

impl ParseResult {
    pub(crate) fn new(declared: impl IntoIterator<Item = OptionDef>) -> Self {
        let options: Vec<ParsedOption> = declared.into_iter().map(ParsedOption::new).collect();
        Self {
            declared: options.len(),
            options,
            ..Default::default()
        }
    }

    pub(crate) fn option_mut(&mut self, id: OptionId) -> &mut ParsedOption {
        &mut self.options[id.0]
    }

    /// Adds an option for an undeclared token and returns its id.
    pub(crate) fn synthesize(&mut self, def: OptionDef) -> OptionId {
        let id = OptionId(self.options.len());
        self.options.push(ParsedOption::new(def));
        id
    }

    /// Matched undeclared option previously synthesized for this key.
    pub(crate) fn synthesized(&self, name: Option<&str>, initial: Option<char>) -> Option<OptionId> {
        let id = match (name, initial) {
            (Some(name), _) => self.by_name.get(name),
            (None, Some(initial)) => self.by_initial.get(&initial),
            (None, None) => None,
        }?;
        (id.0 >= self.declared).then_some(*id)
    }

    pub(crate) fn record_match(&mut self, id: OptionId) {
        self.slots.push(Slot::Option(id));
        if !self.matched.contains(&id) {
            self.matched.push(id);
        }
        let def = self.options[id.0].def();
        if let Some(name) = &def.name {
            self.by_name.insert(name.clone(), id);
        }
        if let Some(initial) = def.initial {
            self.by_initial.insert(initial, id);
        }
    }

    pub(crate) fn record_argument(&mut self, arg: String) {
        self.slots.push(Slot::Argument(arg));
    }

    /// Declared options that are still absent, in declaration order.
    pub(crate) fn missing_required(&self) -> impl Iterator<Item = &ParsedOption> {
        self.options[..self.declared]
            .iter()
            .filter(|opt| opt.def().is_required() && !opt.present())
    }

    /// Looks up a value by initial (one character) or long name.
    ///
    /// Matched options are consulted first; a declared option that never
    /// occurred yields its default. Unknown keys and unset values yield
    /// `None`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let value = self.lookup(key)?.value();
        (!value.is_unset()).then_some(value)
    }

    /// The option (matched or declared) addressed by `key`.
    pub fn lookup(&self, key: &str) -> Option<&ParsedOption> {
        let mut chars = key.chars();
        let id = match (chars.next(), chars.next()) {
            (Some(initial), None) => self.by_initial.get(&initial).copied().or_else(|| {
                self.declared_options()
                    .find(|(_, opt)| opt.initial() == Some(initial))
                    .map(|(id, _)| id)
            }),
            (Some(_), Some(_)) => self.by_name.get(key).copied().or_else(|| {
                self.declared_options()
                    .find(|(_, opt)| opt.name() == Some(key))
                    .map(|(id, _)| id)
            }),
            (None, _) => None,
        }?;
        self.options.get(id.0)
    }

    /// Whether the option addressed by `key` occurred in argv.
    pub fn is_present(&self, key: &str) -> bool {
        self.lookup(key).is_some_and(ParsedOption::present)
    }

    pub fn option(&self, id: OptionId) -> Option<&ParsedOption> {
        self.options.get(id.0)
    }

    /// Entry at `index` of the ordered result.
    pub fn item(&self, index: usize) -> Option<Item<'_>> {
        self.slots.get(index).map(|slot| self.resolve(slot))
    }

    /// All entries of the ordered result, options and arguments interleaved.
    pub fn items(&self) -> impl Iterator<Item = Item<'_>> {
        self.slots.iter().map(|slot| self.resolve(slot))
    }

    /// Positional arguments in their original relative order.
    pub fn arguments(&self) -> Vec<&str> {
        self.slots
            .iter()
            .filter_map(|slot| match slot {
                Slot::Argument(arg) => Some(arg.as_str()),
                Slot::Option(_) => None,
            })
            .collect()
    }

    /// Distinct matched options in order of first occurrence.
    pub fn matched(&self) -> impl Iterator<Item = &ParsedOption> {
        self.matched.iter().map(|id| &self.options[id.0])
    }

    /// Number of distinct matched options.
    pub fn len(&self) -> usize {
        self.matched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matched.is_empty()
    }

    fn declared_options(&self) -> impl Iterator<Item = (OptionId, &ParsedOption)> {
        self.options[..self.declared]
            .iter()
            .enumerate()
            .map(|(index, opt)| (OptionId(index), opt))
    }

    fn resolve<'a>(&'a self, slot: &'a Slot) -> Item<'a> {
        match slot {
            Slot::Option(id) => Item::Option(&self.options[id.0]),
            Slot::Argument(arg) => Item::Argument(arg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Assignment;

    fn def(name: Option<&str>, initial: Option<char>) -> OptionDef {
        OptionDef::bare(name.map(String::from), initial)
    }

    #[test]
    fn test_get_falls_back_to_declared_default() {
        let mut with_default = def(Some("foo"), Some('f'));
        with_default.default = Value::Text("bar".into());
        let result = ParseResult::new(vec![with_default, def(None, Some('b'))]);

        assert_eq!(result.get("foo"), Some(&Value::Text("bar".into())));
        assert_eq!(result.get("f"), Some(&Value::Text("bar".into())));
        assert_eq!(result.get("b"), None);
        assert_eq!(result.get("zzz"), None);
        assert_eq!(result.get(""), None);
        assert!(!result.is_present("foo"));
        assert_eq!(result.len(), 0);
    }

    #[test]
    fn test_record_match_counts_distinct_options() {
        let mut result = ParseResult::new(vec![def(Some("foo"), Some('f')), def(None, Some('x'))]);
        let foo = OptionId(0);
        result.record_match(foo);
        result.option_mut(foo).assign(Assignment::Switch(true)).unwrap();
        result.record_argument("file".into());
        result.record_match(foo);

        assert_eq!(result.len(), 1);
        assert!(result.is_present("f"));
        assert_eq!(result.arguments(), vec!["file"]);
        assert!(matches!(result.item(0), Some(Item::Option(opt)) if opt.name() == Some("foo")));
        assert_eq!(result.item(1), Some(Item::Argument("file")));
        assert_eq!(result.items().count(), 3);
        assert_eq!(result.item(3), None);
    }

    #[test]
    fn test_items_borrow_arguments_and_options_in_order() {
        let mut result = ParseResult::new(vec![def(Some("foo"), None)]);
        result.record_argument("first".into());
        result.record_match(OptionId(0));
        result.record_argument("last".into());

        let items: Vec<Item<'_>> = result.items().collect();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0], Item::Argument("first"));
        assert!(matches!(items[1], Item::Option(opt) if opt.name() == Some("foo")));
        assert_eq!(items[2], Item::Argument("last"));
    }

    #[test]
    fn test_synthesized_options_are_found_by_key() {
        let mut result = ParseResult::new(vec![def(Some("foo"), None)]);
        assert_eq!(result.synthesized(Some("foo"), None), None);

        let id = result.synthesize(def(Some("extra"), None));
        assert_eq!(result.synthesized(Some("extra"), None), None);
        result.record_match(id);
        assert_eq!(result.synthesized(Some("extra"), None), Some(id));

        result.record_match(OptionId(0));
        assert_eq!(result.synthesized(Some("foo"), None), None);
    }
}
