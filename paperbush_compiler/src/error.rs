use thiserror::Error;

/// The failure to compile a specification (or a single fragment of one).
///
/// Compilation is all-or-nothing: no descriptor is produced for a fragment which fails.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    /// The fragment has no derivable argument name.
    #[error("name error: {0}")]
    Name(#[from] NameError),

    /// The fragment (or specification) violates the shorthand grammar.
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
}

/// Naming failures, raised while reading the leading name of a fragment.
#[allow(missing_docs)]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("empty option name in '{fragment}'.")]
    EmptyName { fragment: String },

    #[error("invalid number of leading hyphens ({count}) in '{fragment}'; expected 0, 1, or 2.")]
    LeadingHyphens { fragment: String, count: usize },
}

/// Grammar failures.
#[allow(missing_docs)]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("unmatching brackets {open:?} {close:?} in '{fragment}'.")]
    MismatchedBrackets {
        open: char,
        close: char,
        fragment: String,
    },

    #[error("closing bracket {close:?} has no opening bracket in '{fragment}'.")]
    UnopenedBracket { close: char, fragment: String },

    #[error("unexpected '{suffix}' after the argument name; expected one of ':', '+', '=', '!'.")]
    UnexpectedSuffix { suffix: String },

    #[error("unexpected '{suffix}'; expected a property (':') or a default value ('=').")]
    ExpectedProperty { suffix: String },

    #[error("empty property in '{fragment}'.")]
    EmptyProperty { fragment: String },

    #[error("too many properties; type, nargs, and choices are already set before '{property}'.")]
    TooManyProperties { property: String },

    #[error("nargs '{token}' is out of range.")]
    InvalidNargs { token: String },

    #[error("invalid value expression '{expression}': {reason}.")]
    InvalidValue { expression: String, reason: String },

    #[error("value reference ${index} is out of range ({available} values supplied).")]
    UnresolvedReference { index: usize, available: usize },
}
