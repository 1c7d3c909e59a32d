//! Error codes for all pattern-compiler diagnostics.
//!
//! The first digit names the stage:
//! - E2xxx: pattern validation
//! - E3xxx: exhaustiveness and redundancy
//! - E9xxx: internal compiler errors
//!
//! Schema extraction never fails, so it has no range of its own.

use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    /// Unknown field in a constructor pattern
    E2001,
    /// Unknown constructor or branch name
    E2002,
    /// Branch name resolves to more than one label
    E2003,
    /// Branch field read without pinning the discriminator
    E2004,
    /// Branch field read while the discriminator pins another branch
    E2005,
    /// Literal incompatible with the scrutinee type
    E2006,
    /// Suffixed literal out of range for its width
    E2007,
    /// Pattern shape does not apply to the scrutinee kind
    E2008,
    /// Wrong number of positional sub-patterns
    E2009,
    /// More than one spread in a destructure
    E2010,
    /// Spread outside of a positional destructure
    E2011,
    /// Fixed-length array cannot satisfy the pattern
    E2012,
    /// Alternation branches bind different names
    E2013,
    /// Alternation branches bind a name at incompatible types
    E2014,
    /// Name bound twice on one path
    E2015,
    /// Constructor type name does not name the scrutinee type
    E2016,
    /// Type test target is incompatible with the scrutinee
    E2017,
    /// Unknown enumeration member
    E2018,
    /// Guard references a name the arm does not bind
    E2019,
    /// Declared default incompatible with the element type
    E2020,
    /// Non-exhaustive match over a closed schema
    E3001,
    /// Arm can never be reached
    E3002,
    /// Internal compiler error
    E9001,
}

impl ErrorCode {
    pub const ALL: &'static [ErrorCode] = &[
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E2004,
        ErrorCode::E2005,
        ErrorCode::E2006,
        ErrorCode::E2007,
        ErrorCode::E2008,
        ErrorCode::E2009,
        ErrorCode::E2010,
        ErrorCode::E2011,
        ErrorCode::E2012,
        ErrorCode::E2013,
        ErrorCode::E2014,
        ErrorCode::E2015,
        ErrorCode::E2016,
        ErrorCode::E2017,
        ErrorCode::E2018,
        ErrorCode::E2019,
        ErrorCode::E2020,
        ErrorCode::E3001,
        ErrorCode::E3002,
        ErrorCode::E9001,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            ErrorCode::E2009 => "E2009",
            ErrorCode::E2010 => "E2010",
            ErrorCode::E2011 => "E2011",
            ErrorCode::E2012 => "E2012",
            ErrorCode::E2013 => "E2013",
            ErrorCode::E2014 => "E2014",
            ErrorCode::E2015 => "E2015",
            ErrorCode::E2016 => "E2016",
            ErrorCode::E2017 => "E2017",
            ErrorCode::E2018 => "E2018",
            ErrorCode::E2019 => "E2019",
            ErrorCode::E2020 => "E2020",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E9001 => "E9001",
        }
    }

    /// One-line explanation, used by `--explain`-style tooling.
    pub const fn description(self) -> &'static str {
        match self {
            ErrorCode::E2001 => "unknown field in constructor pattern",
            ErrorCode::E2002 => "unknown constructor or branch name",
            ErrorCode::E2003 => "ambiguous branch name",
            ErrorCode::E2004 => "branch field read without a discriminator test",
            ErrorCode::E2005 => "branch field read under a different branch",
            ErrorCode::E2006 => "literal does not match the scrutinee type",
            ErrorCode::E2007 => "literal out of range for its suffix",
            ErrorCode::E2008 => "pattern shape does not apply to this type",
            ErrorCode::E2009 => "wrong number of positional sub-patterns",
            ErrorCode::E2010 => "more than one spread in a destructure",
            ErrorCode::E2011 => "spread outside a positional destructure",
            ErrorCode::E2012 => "fixed-length array cannot satisfy the pattern",
            ErrorCode::E2013 => "alternation branches bind different names",
            ErrorCode::E2014 => "alternation branches bind incompatible types",
            ErrorCode::E2015 => "name bound more than once",
            ErrorCode::E2016 => "constructor names a different type",
            ErrorCode::E2017 => "type test can never succeed",
            ErrorCode::E2018 => "unknown enumeration member",
            ErrorCode::E2019 => "guard references an unbound name",
            ErrorCode::E2020 => "default value does not match the element type",
            ErrorCode::E3001 => "non-exhaustive match",
            ErrorCode::E3002 => "unreachable match arm",
            ErrorCode::E9001 => "internal compiler error",
        }
    }

    #[inline]
    pub const fn is_validation(self) -> bool {
        matches!(self.as_str().as_bytes()[1], b'2')
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
