//! The option parser: declarations up front, one lazy parse on first query.

use std::sync::{LazyLock, OnceLock};

use parking_lot::RwLock;
use tracing::debug;

use crate::engine::{EngineSettings, match_arguments};
use crate::error::{ParseError, SpecError, SpecErrorKind};
use crate::{
    Declared, Item, OptionId, ParseResult, ParsedOption, ParserFlags, Registry, SpecToken, Value,
    render_summary,
};

static DEFAULT_NEGATION_PREFIX: LazyLock<RwLock<String>> =
    LazyLock::new(|| RwLock::new("no".to_string()));

/// Sets the process-wide negation prefix used by parsers that do not
/// override it. An empty prefix disables negation.
///
/// Parsers read the prefix when their parse runs, so this affects every
/// parser that has not parsed yet.
pub fn set_default_negation_prefix(prefix: impl Into<String>) {
    *DEFAULT_NEGATION_PREFIX.write() = prefix.into();
}

/// The process-wide negation prefix (initially `"no"`).
pub fn default_negation_prefix() -> String {
    DEFAULT_NEGATION_PREFIX.read().clone()
}

/// Declares options, then parses an argument vector on first query.
///
/// The parse runs exactly once, triggered by whichever accessor is called
/// first. Its outcome is kept: a failure is returned again by every later
/// accessor, and no declarations are accepted afterwards.
///
/// # Examples
///
/// ```
/// use optspec_core::{decl, OptionFlags, OptionParser, ParserFlags, Value};
///
/// let argv = ["-v", "--output", "out.txt", "input.txt"];
/// let mut parser = OptionParser::new(argv, ParserFlags::EMPTY);
/// parser.declare(decl!["v", "verbose", OptionFlags::FORBID_VALUE]).unwrap();
/// parser.declare(decl!["o", "output", "[FILE]", OptionFlags::REQUIRE_VALUE]).unwrap();
///
/// assert_eq!(parser.get("verbose").unwrap(), Some(&Value::Bool(true)));
/// assert_eq!(parser.get("o").unwrap(), Some(&Value::Text("out.txt".into())));
/// assert_eq!(parser.arguments().unwrap(), vec!["input.txt"]);
/// assert_eq!(parser.count().unwrap(), 2);
/// ```
#[derive(Debug)]
pub struct OptionParser {
    registry: Registry,
    argv: Vec<String>,
    flags: ParserFlags,
    negation_prefix: Option<String>,
    outcome: OnceLock<Result<ParseResult, ParseError>>,
}

impl OptionParser {
    pub fn new<I, S>(argv: I, flags: ParserFlags) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            registry: Registry::new(),
            argv: argv.into_iter().map(Into::into).collect(),
            flags,
            negation_prefix: None,
            outcome: OnceLock::new(),
        }
    }

    /// Parser over the current process arguments, program name excluded.
    pub fn from_env(flags: ParserFlags) -> Self {
        Self::new(std::env::args().skip(1), flags)
    }

    /// Overrides the process-wide negation prefix for this parser.
    pub fn set_negation_prefix(&mut self, prefix: impl Into<String>) {
        self.negation_prefix = Some(prefix.into());
    }

    /// Registers one declaration (an option or a help line).
    ///
    /// # Errors
    ///
    /// Fails if the declaration is invalid, collides with an earlier one,
    /// or arguments have already been parsed.
    pub fn declare(&mut self, tokens: Vec<SpecToken>) -> Result<Declared, SpecError> {
        self.ensure_unparsed(&tokens)?;
        self.registry.declare(tokens)
    }

    /// Registers declarations in order, stopping at the first error.
    pub fn declare_all<I>(&mut self, declarations: I) -> Result<Vec<Declared>, SpecError>
    where
        I: IntoIterator<Item = Vec<SpecToken>>,
    {
        declarations
            .into_iter()
            .map(|tokens| self.declare(tokens))
            .collect()
    }

    /// Registers an option declaration and returns its handle.
    pub fn option(&mut self, tokens: Vec<SpecToken>) -> Result<OptionId, SpecError> {
        let declaration = tokens.clone();
        self.declare(tokens)?
            .option_id()
            .ok_or_else(|| SpecError::new(&declaration, SpecErrorKind::NotAnOption))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn flags(&self) -> ParserFlags {
        self.flags
    }

    /// Runs the parse if it has not run yet and returns its outcome.
    pub fn parsed(&self) -> Result<&ParseResult, ParseError> {
        self.outcome
            .get_or_init(|| self.run())
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Value addressed by initial (one character) or long name.
    pub fn get(&self, key: &str) -> Result<Option<&Value>, ParseError> {
        Ok(self.parsed()?.get(key))
    }

    pub fn is_present(&self, key: &str) -> Result<bool, ParseError> {
        Ok(self.parsed()?.is_present(key))
    }

    pub fn value_of(&self, id: OptionId) -> Result<Option<&Value>, ParseError> {
        Ok(self.parsed()?.option(id).map(ParsedOption::value))
    }

    pub fn present(&self, id: OptionId) -> Result<bool, ParseError> {
        Ok(self.parsed()?.option(id).is_some_and(ParsedOption::present))
    }

    /// Entry at `index` of the ordered result.
    pub fn item(&self, index: usize) -> Result<Option<Item<'_>>, ParseError> {
        Ok(self.parsed()?.item(index))
    }

    pub fn arguments(&self) -> Result<Vec<&str>, ParseError> {
        Ok(self.parsed()?.arguments())
    }

    /// Number of distinct options that occurred.
    pub fn count(&self) -> Result<usize, ParseError> {
        Ok(self.parsed()?.len())
    }

    pub fn matched(&self) -> Result<impl Iterator<Item = &ParsedOption>, ParseError> {
        Ok(self.parsed()?.matched())
    }

    /// Help text for the declared options. Does not trigger the parse.
    pub fn summary(&self) -> String {
        render_summary(&self.registry)
    }

    fn ensure_unparsed(&self, tokens: &[SpecToken]) -> Result<(), SpecError> {
        match self.outcome.get() {
            Some(_) => Err(SpecError::new(tokens, SpecErrorKind::AlreadyParsed)),
            None => Ok(()),
        }
    }

    fn run(&self) -> Result<ParseResult, ParseError> {
        let prefix = self
            .negation_prefix
            .clone()
            .unwrap_or_else(default_negation_prefix);
        debug!(
            arguments = self.argv.len(),
            options = self.registry.len(),
            negation_prefix = %prefix,
            "Parsing arguments"
        );

        let settings = EngineSettings {
            allow_undeclared: self.flags.contains(ParserFlags::ALLOW_UNDECLARED),
            stop_at_double_dash: self.flags.contains(ParserFlags::STOP_AT_DOUBLE_DASH),
            negation_prefix: &prefix,
        };
        let outcome = match_arguments(&self.registry, &self.argv, settings);
        if let Err(err) = &outcome {
            debug!(error = %err, "Parse failed");
        }
        outcome
    }
}
