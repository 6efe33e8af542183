//! Typed flag sets for option behavior and parser-level policy.
//!
//! Both sets are small bitmask newtypes. Flags combine with `|` and are
//! queried with [`OptionFlags::contains`]; there is no string lookup at
//! runtime except the [`FromStr`] path used when reading declaration files.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Behavior flags attached to a single declared option.
///
/// # Examples
///
/// ```
/// use optspec_core::OptionFlags;
///
/// let flags = OptionFlags::REQUIRE_VALUE | OptionFlags::MULTIPLE_VALUES;
/// assert!(flags.contains(OptionFlags::REQUIRE_VALUE));
/// assert!(!flags.contains(OptionFlags::ALLOW_FALSE));
/// assert_eq!(flags.names(), vec!["REQUIRE_VALUE", "MULTIPLE_VALUES"]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct OptionFlags(u8);

impl OptionFlags {
    /// No behavior flags.
    pub const EMPTY: Self = Self(0);
    /// Parsing fails when the option is absent from argv.
    pub const REQUIRED: Self = Self(0b1);
    /// The option is a switch; it never takes a value.
    pub const FORBID_VALUE: Self = Self(0b10);
    /// The option must receive a value, inline or as the next token.
    pub const REQUIRE_VALUE: Self = Self(0b100);
    /// Values accumulate into a list instead of conflicting.
    pub const MULTIPLE_VALUES: Self = Self(0b1000);
    /// The option may be negated with the negation prefix (`--no-foo`).
    pub const ALLOW_FALSE: Self = Self(0b10000);

    const NAMED: [(&'static str, Self); 5] = [
        ("REQUIRED", Self::REQUIRED),
        ("FORBID_VALUE", Self::FORBID_VALUE),
        ("REQUIRE_VALUE", Self::REQUIRE_VALUE),
        ("MULTIPLE_VALUES", Self::MULTIPLE_VALUES),
        ("ALLOW_FALSE", Self::ALLOW_FALSE),
    ];

    /// Returns `true` if every flag in `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if any flag in `other` is set.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Names of the set flags, in declaration order of the constants.
    pub fn names(self) -> Vec<&'static str> {
        Self::NAMED
            .iter()
            .filter(|(_, flag)| self.contains(*flag))
            .map(|(name, _)| *name)
            .collect()
    }
}

impl BitOr for OptionFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for OptionFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for OptionFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names().join("|"))
    }
}

/// Error returned when a flag name is not one of the known constants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown flag name '{0}'")]
pub struct UnknownFlag(pub String);

impl FromStr for OptionFlags {
    type Err = UnknownFlag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::NAMED
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, flag)| *flag)
            .ok_or_else(|| UnknownFlag(s.to_string()))
    }
}

impl TryFrom<Vec<String>> for OptionFlags {
    type Error = UnknownFlag;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        names
            .iter()
            .try_fold(Self::EMPTY, |acc, name| -> Result<Self, UnknownFlag> {
                Ok(acc | name.parse::<Self>()?)
            })
    }
}

impl From<OptionFlags> for Vec<String> {
    fn from(flags: OptionFlags) -> Self {
        flags.names().into_iter().map(String::from).collect()
    }
}

/// Parser-level policy flags.
///
/// # Examples
///
/// ```
/// use optspec_core::ParserFlags;
///
/// let flags = ParserFlags::ALLOW_UNDECLARED;
/// assert!(flags.contains(ParserFlags::ALLOW_UNDECLARED));
/// assert!(!flags.contains(ParserFlags::STOP_AT_DOUBLE_DASH));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ParserFlags(u8);

impl ParserFlags {
    pub const EMPTY: Self = Self(0);
    /// Accept options that were never declared, keyed by their literal token.
    pub const ALLOW_UNDECLARED: Self = Self(0b1);
    /// Treat a bare `--` as the end of options; later tokens are positional.
    pub const STOP_AT_DOUBLE_DASH: Self = Self(0b10);

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ParserFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ParserFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}
