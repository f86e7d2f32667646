use std::fmt::{self, Display, Formatter};

use crate::error::NameError;
use crate::value::{Value, ValueType};

/// The literal fragment which marks a separator.
pub const SEPARATOR: &str = "^";

/// The cardinality of inputs to match for an argument.
///
/// Inspired by argparse: <https://docs.python.org/3/library/argparse.html#nargs>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nargs {
    /// `N`: Precisely `N` values.
    Precisely(usize),
    /// `?`: Either `0` or `1` values.
    AtMostOne,
    /// `*`: May be any number of values, including `0`.
    Any,
    /// `+`: At least one value must be specified.
    AtLeastOne,
}

impl Nargs {
    pub(crate) fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "?" => Some(Nargs::AtMostOne),
            "*" => Some(Nargs::Any),
            "+" => Some(Nargs::AtLeastOne),
            _ => None,
        }
    }
}

impl Display for Nargs {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Nargs::Precisely(n) => write!(f, "{n}"),
            Nargs::AtMostOne => write!(f, "?"),
            Nargs::Any => write!(f, "*"),
            Nargs::AtLeastOne => write!(f, "+"),
        }
    }
}

/// A behaviour which overrides "consume one value".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// A boolean flag; consumes no values.
    StoreTrue,
    /// Increments on each repetition.
    Count,
}

impl Action {
    /// The argparse name of this action.
    pub fn name(&self) -> &'static str {
        match self {
            Action::StoreTrue => "store_true",
            Action::Count => "count",
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One compiled argument descriptor.
///
/// The descriptor only *describes* the argument; matching process arguments against it is left to the consumer.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pattern: String,
    name: Option<String>,
    short: Option<String>,
    pub(crate) nargs: Option<Nargs>,
    pub(crate) action: Option<Action>,
    pub(crate) required: Option<bool>,
    pub(crate) default: Option<Value>,
    pub(crate) choices: Option<Value>,
    pub(crate) type_: Option<ValueType>,
    pub(crate) infer_short: bool,
}

impl Argument {
    /// Create a bare argument descriptor.
    /// Empty names are treated as absent; at least one of `name` or `short` must be present.
    pub fn new(
        pattern: impl Into<String>,
        name: Option<String>,
        short: Option<String>,
    ) -> Result<Self, NameError> {
        let pattern = pattern.into();
        let name = name.filter(|n| !n.is_empty());
        let short = short.filter(|s| !s.is_empty());

        if name.is_none() && short.is_none() {
            return Err(NameError::EmptyName { fragment: pattern });
        }

        Ok(Self {
            pattern,
            name,
            short,
            nargs: None,
            action: None,
            required: None,
            default: None,
            choices: None,
            type_: None,
            infer_short: false,
        })
    }

    /// The fragment this argument was compiled from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The full name, including any leading hyphens (ex: `--verbose`, or `square` for a positional).
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The short alias, including its hyphen (ex: `-v`).
    ///
    /// When no alias was given explicitly and inference is permitted, this is derived from the first character of a `--long` name.
    pub fn short(&self) -> Option<String> {
        if let Some(short) = &self.short {
            return Some(short.clone());
        }

        if !self.infer_short {
            return None;
        }

        self.name
            .as_deref()
            .and_then(|name| name.strip_prefix("--"))
            .and_then(|name| name.trim_start_matches('-').chars().next())
            .map(|c| format!("-{c}"))
    }

    /// Whether this argument is an option (as opposed to a positional).
    pub fn is_option(&self) -> bool {
        self.short.is_some()
            || self
                .name
                .as_deref()
                .map_or(false, |name| name.starts_with('-'))
    }

    #[allow(missing_docs)]
    pub fn nargs(&self) -> Option<Nargs> {
        self.nargs
    }

    #[allow(missing_docs)]
    pub fn action(&self) -> Option<Action> {
        self.action
    }

    /// `None` means the consumer's default applies.
    pub fn required(&self) -> Option<bool> {
        self.required
    }

    #[allow(missing_docs)]
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    #[allow(missing_docs)]
    pub fn choices(&self) -> Option<&Value> {
        self.choices.as_ref()
    }

    #[allow(missing_docs)]
    pub fn type_(&self) -> Option<&ValueType> {
        self.type_.as_ref()
    }

    /// Whether short alias inference is permitted.
    pub fn infer_short(&self) -> bool {
        self.infer_short
    }

    /// The names to register this argument under: the short alias (if any) followed by the full name (if any).
    pub fn flags(&self) -> impl Iterator<Item = String> + '_ {
        self.short()
            .into_iter()
            .chain(self.name.iter().cloned())
    }

    /// The configuration to hand the consumer, omitting anything unset.
    ///
    /// ### Example
    /// ```
    /// # use paperbush_compiler::{parse_argument, Fragment, Keyword, Nargs, ValueType};
    /// let fragment = parse_argument("--size:int:+").unwrap();
    /// let argument = fragment.argument().unwrap();
    ///
    /// assert_eq!(
    ///     argument.keywords(),
    ///     vec![Keyword::Nargs(Nargs::AtLeastOne), Keyword::Type(ValueType::Int)]
    /// );
    /// ```
    pub fn keywords(&self) -> Vec<Keyword> {
        let mut keywords = Vec::default();

        if let Some(required) = self.required {
            keywords.push(Keyword::Required(required));
        }

        if let Some(nargs) = self.nargs {
            keywords.push(Keyword::Nargs(nargs));
        }

        if let Some(type_) = &self.type_ {
            keywords.push(Keyword::Type(type_.clone()));
        }

        if let Some(default) = &self.default {
            keywords.push(Keyword::Default(default.clone()));
        }

        if let Some(choices) = &self.choices {
            keywords.push(Keyword::Choices(choices.clone()));
        }

        if let Some(action) = self.action {
            keywords.push(Keyword::Action(action));
        }

        keywords
    }

    /// Whether `other` describes the same argument, regardless of where either came from.
    pub fn is_equivalent(&self, other: &Argument) -> bool {
        self.name == other.name
            && self.short() == other.short()
            && self.keywords() == other.keywords()
    }
}

#[cfg(feature = "unit_test")]
impl Argument {
    /// *Available using 'unit_test' crate feature only.*</br></br>
    /// Build an [`Argument`] for use in testing a consumer, without going through the compiler.
    pub fn test_dummy(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(name.clone(), Some(name), None)
            .expect("test dummy requires a non-empty name")
    }

    /// *Available using 'unit_test' crate feature only.*
    pub fn with_nargs(mut self, nargs: Nargs) -> Self {
        self.nargs = Some(nargs);
        self
    }

    /// *Available using 'unit_test' crate feature only.*
    pub fn with_action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    /// *Available using 'unit_test' crate feature only.*
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    /// *Available using 'unit_test' crate feature only.*
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// *Available using 'unit_test' crate feature only.*
    pub fn with_choices(mut self, choices: Value) -> Self {
        self.choices = Some(choices);
        self
    }

    /// *Available using 'unit_test' crate feature only.*
    pub fn with_type(mut self, type_: ValueType) -> Self {
        self.type_ = Some(type_);
        self
    }
}

impl Display for Argument {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Argument[{}]", self.pattern)
    }
}

/// A single configuration entry for the consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum Keyword {
    #[allow(missing_docs)]
    Required(bool),
    #[allow(missing_docs)]
    Nargs(Nargs),
    #[allow(missing_docs)]
    Type(ValueType),
    #[allow(missing_docs)]
    Default(Value),
    #[allow(missing_docs)]
    Choices(Value),
    #[allow(missing_docs)]
    Action(Action),
}

impl Keyword {
    /// The argparse keyword this configures.
    pub fn key(&self) -> &'static str {
        match self {
            Keyword::Required(_) => "required",
            Keyword::Nargs(_) => "nargs",
            Keyword::Type(_) => "type",
            Keyword::Default(_) => "default",
            Keyword::Choices(_) => "choices",
            Keyword::Action(_) => "action",
        }
    }
}

impl Display for Keyword {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let key = self.key();
        match self {
            Keyword::Required(true) => write!(f, "{key}=True"),
            Keyword::Required(false) => write!(f, "{key}=False"),
            Keyword::Nargs(Nargs::Precisely(n)) => write!(f, "{key}={n}"),
            Keyword::Nargs(nargs) => write!(f, "{key}='{nargs}'"),
            Keyword::Type(type_) => write!(f, "{key}={type_}"),
            Keyword::Default(value) | Keyword::Choices(value) => write!(f, "{key}={value}"),
            Keyword::Action(action) => write!(f, "{key}='{action}'"),
        }
    }
}

/// The result of compiling one fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// An argument descriptor.
    Argument(Argument),
    /// The `^` marker, delimiting groups of arguments.
    Separator,
}

impl Fragment {
    /// The argument, unless this is a separator.
    pub fn argument(&self) -> Option<&Argument> {
        match self {
            Fragment::Argument(argument) => Some(argument),
            Fragment::Separator => None,
        }
    }

    #[allow(missing_docs)]
    pub fn into_argument(self) -> Option<Argument> {
        match self {
            Fragment::Argument(argument) => Some(argument),
            Fragment::Separator => None,
        }
    }

    #[allow(missing_docs)]
    pub fn is_separator(&self) -> bool {
        matches!(self, Fragment::Separator)
    }
}

impl Display for Fragment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Fragment::Argument(argument) => write!(f, "{argument}"),
            Fragment::Separator => f.write_str(SEPARATOR),
        }
    }
}
