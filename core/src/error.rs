//! Error types for declarations and argument parsing.
//!
//! Declaration problems surface as [`SpecError`] from the call that
//! registers the option. Argument problems surface as [`ParseError`] from
//! whichever accessor first triggers the parse.

use thiserror::Error;

use crate::SpecToken;

/// Why a declaration was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecErrorKind {
    /// A text token matched none of the declaration categories.
    #[error("invalid option spec '{0}'")]
    Unrecognized(String),
    /// A category (initial, name, default, ...) was filled twice.
    #[error("attempted to add {attribute} '{second}' after adding {attribute} '{first}'")]
    DuplicateAttribute {
        attribute: &'static str,
        first: String,
        second: String,
    },
    /// Neither a name nor an initial was given.
    #[error("please specify an initial or a long name (or both)")]
    MissingIdentity,
    /// `FORBID_VALUE` was combined with a value-taking flag.
    #[error("FORBID_VALUE cannot be combined with {0}")]
    ConflictingFlags(&'static str),
    /// Another option already uses this initial.
    #[error("option initial '{0}' used more than once")]
    DuplicateInitial(char),
    /// Another option already uses this name.
    #[error("option name '{0}' used more than once")]
    DuplicateName(String),
    /// Arguments were already parsed; the option set is frozen.
    #[error("options cannot be declared after arguments have been parsed")]
    AlreadyParsed,
    /// An option was expected but the declaration is a help line.
    #[error("expected an option declaration, found help text")]
    NotAnOption,
}

/// A rejected declaration, carrying the tokens it was made of.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} (declaration: {})", render_declaration(.declaration))]
pub struct SpecError {
    pub declaration: Vec<SpecToken>,
    pub kind: SpecErrorKind,
}

impl SpecError {
    pub(crate) fn new(declaration: &[SpecToken], kind: SpecErrorKind) -> Self {
        Self {
            declaration: declaration.to_vec(),
            kind,
        }
    }
}

fn render_declaration(declaration: &[SpecToken]) -> String {
    serde_json::to_string(declaration).unwrap_or_else(|_| format!("{declaration:?}"))
}

/// Why an argument was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArgumentErrorKind {
    #[error("unknown option")]
    UnknownOption,
    #[error("option requires a value")]
    RequiresValue,
    #[error("option cannot be assigned a value")]
    ValueForbidden,
    #[error("option negation with value assignment is not allowed")]
    NegatedAssignment,
    #[error("option cannot be negated")]
    CannotNegate,
    #[error("option was specified more than once")]
    SpecifiedMoreThanOnce,
}

/// An argument that failed to parse, with its position in the normalized argv.
///
/// `args` is the argument vector after cluster expansion, so `index` and
/// `arg` always agree with it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: '{arg}' (argument {index})")]
pub struct InvalidArgument {
    pub args: Vec<String>,
    pub index: usize,
    pub arg: String,
    pub kind: ArgumentErrorKind,
}

impl InvalidArgument {
    pub(crate) fn new(args: &[String], index: usize, kind: ArgumentErrorKind) -> Self {
        Self {
            args: args.to_vec(),
            index,
            arg: args.get(index).cloned().unwrap_or_default(),
            kind,
        }
    }
}

/// Failure of the parse pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),
    /// An option flagged `REQUIRED` never occurred.
    #[error("missing required option '{option}'")]
    MissingRequired { option: String },
}

impl ParseError {
    /// The offending argument, when the failure points at one.
    pub fn invalid_argument(&self) -> Option<&InvalidArgument> {
        match self {
            Self::InvalidArgument(err) => Some(err),
            Self::MissingRequired { .. } => None,
        }
    }
}

/// Any error produced by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Spec(#[from] SpecError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl From<InvalidArgument> for Error {
    fn from(err: InvalidArgument) -> Self {
        Self::Parse(err.into())
    }
}

/// Convenience alias for results with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
