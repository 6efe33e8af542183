//! Declarative command-line option parsing.
//!
//! Options are declared with a small token language and matched against an
//! argument vector on first query:
//!
//! - [`parse_declaration`] turns tokens such as `["f", "foo", "=bar",
//!   "[FILE]", "Input file", REQUIRE_VALUE]` into an [`OptionDef`] or a help
//!   line.
//! - [`Registry`] keeps declared options indexed by name and initial.
//! - [`expand_clusters`] rewrites `-xyz=v` into `-x -y -z=v`.
//! - [`OptionParser`] runs the matching pass once, lazily, and answers
//!   lookups from the resulting [`ParseResult`].
//! - [`render_summary`] renders declared options as help text.
//!
//! Declaration problems are reported as [`SpecError`] when the option is
//! declared; argument problems as [`ParseError`] from the first accessor.
//!
//! # Example
//!
//! ```
//! use optspec_core::*;
//!
//! let argv = ["-vx", "--no-color", "--include", "a", "b", "file.txt"];
//! let mut parser = OptionParser::new(argv, ParserFlags::EMPTY);
//! parser
//!     .declare_all(vec![
//!         decl!["v", "verbose", OptionFlags::FORBID_VALUE],
//!         decl!["x"],
//!         decl!["color", "=auto", OptionFlags::ALLOW_FALSE],
//!         decl!["i", "include", OptionFlags::MULTIPLE_VALUES],
//!     ])
//!     .unwrap();
//!
//! assert_eq!(parser.get("v").unwrap(), Some(&Value::Bool(true)));
//! assert_eq!(parser.get("color").unwrap(), Some(&Value::Bool(false)));
//! assert_eq!(
//!     parser.get("include").unwrap(),
//!     Some(&Value::List(vec!["a".into(), "b".into(), "file.txt".into()]))
//! );
//! assert_eq!(parser.count().unwrap(), 4);
//! ```

mod engine;
pub mod error;
mod flags;
mod normalize;
mod option;
mod parser;
mod registry;
mod result;
mod spec;
mod summary;
mod value;

pub use error::{
    ArgumentErrorKind, Error, InvalidArgument, ParseError, Result, SpecError, SpecErrorKind,
};
pub use flags::{OptionFlags, ParserFlags, UnknownFlag};
pub use normalize::expand_clusters;
pub use option::{Assignment, MultipleValuesNotAllowed, OptionDef, ParsedOption};
pub use parser::{OptionParser, default_negation_prefix, set_default_negation_prefix};
pub use registry::{Declared, OptionId, Registry, RegistryEntry};
pub use result::{Item, ParseResult};
pub use spec::{Declaration, SpecToken, parse_declaration};
pub use summary::render_summary;
pub use value::Value;
