//! Matching engine: walks the normalized argv once and drives each matched
//! option's value state machine.
//!
//! Per token the engine decides between three cases:
//!
//! - an option token (`--name[=value]` or `-c[=value]`) is resolved against
//!   the registry, recorded, and assigned `true`/`false` or its inline value;
//! - a bare token while a *recent* option is still open becomes that
//!   option's value;
//! - any other bare token is a positional argument.
//!
//! The recent option is the last matched option that may still absorb a
//! following bare token. Options forbidding values never become recent;
//! single-valued options stop being recent once they receive text.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

use crate::error::{ArgumentErrorKind, InvalidArgument, ParseError};
use crate::{Assignment, OptionDef, OptionId, ParseResult, Registry, expand_clusters};

static OPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^(--[a-zA-Z][a-zA-Z0-9-]+|-[a-zA-Z0-9?])(=.+)?$")
        .expect("static regex must compile")
});

/// Parser-level settings consumed by the engine.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EngineSettings<'a> {
    pub allow_undeclared: bool,
    pub stop_at_double_dash: bool,
    /// Word before `-` that negates a long option; empty disables negation.
    pub negation_prefix: &'a str,
}

/// Runs the full parse pass over `argv`.
pub(crate) fn match_arguments(
    registry: &Registry,
    argv: &[String],
    settings: EngineSettings<'_>,
) -> Result<ParseResult, ParseError> {
    let args = expand_clusters(argv);
    let mut engine = Engine {
        registry,
        args: &args,
        settings,
        result: ParseResult::new(registry.options().map(|(_, def)| def.clone())),
        recent: None,
        recent_received: false,
    };
    engine.run()?;

    let result = engine.result;
    if let Some(missing) = result.missing_required().next() {
        return Err(ParseError::MissingRequired {
            option: missing.def().display_name(),
        });
    }

    debug!(
        arguments = args.len(),
        matched = result.len(),
        positional = result.arguments().len(),
        "Parsed arguments"
    );
    Ok(result)
}

struct Engine<'a> {
    registry: &'a Registry,
    args: &'a [String],
    settings: EngineSettings<'a>,
    result: ParseResult,
    recent: Option<OptionId>,
    // Whether `recent` has received text since it was matched.
    recent_received: bool,
}

impl Engine<'_> {
    fn run(&mut self) -> Result<(), ParseError> {
        let args = self.args;
        let mut options_ended = false;

        for (i, arg) in args.iter().enumerate() {
            if options_ended {
                self.result.record_argument(arg.clone());
                continue;
            }

            if self.settings.stop_at_double_dash && arg == "--" {
                trace!(index = i, "End of options");
                self.check_pending_value(i)?;
                self.recent = None;
                options_ended = true;
                continue;
            }

            let option = OPTION_RE.captures(arg).map(|caps| {
                let token = caps[1].to_string();
                let inline = caps.get(2).map(|m| m.as_str()[1..].to_string());
                (token, inline)
            });
            match option {
                Some((token, inline)) => self.option_token(i, &token, inline)?,
                None => self.bare_token(i, arg)?,
            }
        }

        self.check_pending_value(args.len())
    }

    /// Fails if the recent option requires a value it never received.
    /// `next` is the index of the token that closes it.
    fn check_pending_value(&self, next: usize) -> Result<(), ParseError> {
        let Some(id) = self.recent else {
            return Ok(());
        };
        let requires_value = self
            .result
            .option(id)
            .is_some_and(|opt| opt.def().requires_value());
        if requires_value && !self.recent_received {
            return Err(self.invalid(next - 1, ArgumentErrorKind::RequiresValue));
        }
        Ok(())
    }

    fn option_token(
        &mut self,
        i: usize,
        token: &str,
        inline: Option<String>,
    ) -> Result<(), ParseError> {
        self.check_pending_value(i)?;
        self.recent = None;

        let (id, candidate) = self.resolve(i, token)?;
        self.result.record_match(id);
        trace!(index = i, token, option = id.index(), negated = !candidate, "Matched option");

        let def = self.result.option_mut(id).def();
        let forbids_value = def.forbids_value();
        let allows_multiple = def.allows_multiple();
        if !candidate && !def.allows_false() {
            return Err(self.invalid(i, ArgumentErrorKind::CannotNegate));
        }

        if !forbids_value {
            self.recent = Some(id);
            self.recent_received = false;
        }

        let assignment = match inline {
            Some(_) if forbids_value => {
                return Err(self.invalid(i, ArgumentErrorKind::ValueForbidden));
            }
            Some(_) if !candidate => {
                return Err(self.invalid(i, ArgumentErrorKind::NegatedAssignment));
            }
            Some(text) => Assignment::Text(text),
            None => Assignment::Switch(candidate),
        };

        let is_text = assignment.is_text();
        if self.result.option_mut(id).assign(assignment).is_err() {
            return Err(self.invalid(i, ArgumentErrorKind::SpecifiedMoreThanOnce));
        }
        if is_text {
            self.recent_received = true;
            if !allows_multiple {
                self.recent = None;
            }
        }
        Ok(())
    }

    fn bare_token(&mut self, i: usize, arg: &str) -> Result<(), ParseError> {
        let Some(id) = self.recent else {
            trace!(index = i, arg, "Positional argument");
            self.result.record_argument(arg.to_string());
            return Ok(());
        };

        trace!(index = i, arg, option = id.index(), "Option value");
        let option = self.result.option_mut(id);
        let allows_multiple = option.def().allows_multiple();
        if option.assign(Assignment::Text(arg.to_string())).is_err() {
            return Err(self.invalid(i - 1, ArgumentErrorKind::SpecifiedMoreThanOnce));
        }
        self.recent_received = true;
        if !allows_multiple {
            self.recent = None;
        }
        Ok(())
    }

    /// Resolves an option token (`--name` or `-c`) to an option id and the
    /// switch value it implies (`false` when negated).
    fn resolve(&mut self, i: usize, token: &str) -> Result<(OptionId, bool), ParseError> {
        if let Some(long) = token.strip_prefix("--") {
            let (name, candidate) = self.strip_negation(long);
            let id = match self.registry.by_name(name) {
                Some(id) => id,
                None => self.undeclared(i, Some(name), None)?,
            };
            return Ok((id, candidate));
        }

        let initial = token.chars().nth(1).unwrap_or_default();
        let id = match self.registry.by_initial(initial) {
            Some(id) => id,
            None => self.undeclared(i, None, Some(initial))?,
        };
        Ok((id, true))
    }

    /// Splits `no-foo` into `("foo", false)` unless `no-foo` is itself declared.
    fn strip_negation<'t>(&self, long: &'t str) -> (&'t str, bool) {
        let prefix = self.settings.negation_prefix;
        if prefix.is_empty() || self.registry.by_name(long).is_some() {
            return (long, true);
        }
        match long
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('-'))
        {
            Some(name) if !name.is_empty() => (name, false),
            _ => (long, true),
        }
    }

    fn undeclared(
        &mut self,
        i: usize,
        name: Option<&str>,
        initial: Option<char>,
    ) -> Result<OptionId, ParseError> {
        if !self.settings.allow_undeclared {
            return Err(self.invalid(i, ArgumentErrorKind::UnknownOption));
        }
        if let Some(id) = self.result.synthesized(name, initial) {
            return Ok(id);
        }
        debug!(index = i, arg = %self.args[i], "Accepting undeclared option");
        Ok(self
            .result
            .synthesize(OptionDef::bare(name.map(String::from), initial)))
    }

    fn invalid(&self, index: usize, kind: ArgumentErrorKind) -> ParseError {
        InvalidArgument::new(self.args, index, kind).into()
    }
}
