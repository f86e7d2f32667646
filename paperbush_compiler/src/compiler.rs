use crate::error::{CompileError, NameError, SyntaxError};
use crate::model::{Action, Argument, Fragment, Nargs, SEPARATOR};
use crate::schema::Schema;
use crate::splitter::split_args;
use crate::value::{evaluate, is_int, Value, ValueType};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// Options which apply across every fragment of a specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Whether arguments may infer their short alias from their `--long` name.
    pub infer_short: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self { infer_short: true }
    }
}

/// The shorthand compiler.
///
/// ### Example
/// ```
/// # use paperbush_compiler::{Compiler, Value};
/// let schema = Compiler::new()
///     .infer_short(false)
///     .values(vec![Value::Str("origin".to_string())])
///     .compile("remote=$0 --force")
///     .unwrap();
///
/// let arguments = schema.arguments();
/// assert_eq!(arguments[0].default(), Some(&Value::Str("origin".to_string())));
/// assert_eq!(arguments[1].short(), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompileOptions,
    values: Vec<Value>,
}

impl Compiler {
    /// Create a compiler with the default options and no reference values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every option at once.
    pub fn options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    /// Permit (or forbid) short alias inference.
    pub fn infer_short(mut self, infer_short: bool) -> Self {
        self.options.infer_short = infer_short;
        self
    }

    /// Supply the values which `$N` expressions refer to.
    /// If repeated, only the final values will apply.
    pub fn values(mut self, values: Vec<Value>) -> Self {
        self.values = values;
        self
    }

    /// Compile a full specification.
    ///
    /// Compilation is all-or-nothing; the first failing fragment fails the specification.
    pub fn compile(&self, specification: &str) -> Result<Schema, CompileError> {
        let fragments = split_args(specification)?
            .into_iter()
            .map(|fragment| self.parse_argument(fragment))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Schema::new(specification, fragments))
    }

    /// Compile a single fragment.
    pub fn parse_argument(&self, fragment: &str) -> Result<Fragment, CompileError> {
        let compiled = if fragment == SEPARATOR {
            Fragment::Separator
        } else {
            Fragment::Argument(self.compile_argument(fragment)?)
        };

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Compiled '{fragment}' into {compiled:?}.");
        }

        Ok(compiled)
    }

    fn compile_argument(&self, fragment: &str) -> Result<Argument, CompileError> {
        let mut cursor = Cursor::new(fragment);
        let mut argument = parse_name(&mut cursor)?;
        argument.infer_short = self.options.infer_short;

        if cursor.is_empty() {
            // Only a long or positional name makes a bare fragment a flag.
            if argument.name().is_some() {
                argument.action = Some(Action::StoreTrue);
            }
            return Ok(argument);
        }

        if !matches!(cursor.peek(), Some(b':' | b'+' | b'=' | b'!')) {
            return Err(SyntaxError::UnexpectedSuffix {
                suffix: cursor.rest().to_string(),
            }
            .into());
        }

        let (count, required) = parse_toggles(&mut cursor);
        argument.required = required;
        if count {
            argument.action = Some(Action::Count);
        }

        if cursor.is_empty() {
            return Ok(argument);
        }

        if !matches!(cursor.peek(), Some(b':' | b'=')) {
            return Err(SyntaxError::ExpectedProperty {
                suffix: cursor.rest().to_string(),
            }
            .into());
        }

        parse_properties(&mut cursor, &mut argument, &self.values)?;

        if !cursor.is_empty() {
            argument.default = Some(evaluate(cursor.rest(), &self.values)?);
        }

        Ok(argument)
    }
}

/// Compile a single fragment with the default options and no reference values.
///
/// ### Example
/// ```
/// # use paperbush_compiler::{parse_argument, Action, Fragment};
/// let fragment = parse_argument("--verbose").unwrap();
/// let argument = fragment.argument().unwrap();
/// assert_eq!(argument.name(), Some("--verbose"));
/// assert_eq!(argument.action(), Some(Action::StoreTrue));
///
/// assert_eq!(parse_argument("^").unwrap(), Fragment::Separator);
/// ```
pub fn parse_argument(fragment: &str) -> Result<Fragment, CompileError> {
    Compiler::default().parse_argument(fragment)
}

/// Compile a full specification with the default options and no reference values.
pub fn compile(specification: &str) -> Result<Schema, CompileError> {
    Compiler::default().compile(specification)
}

/// A forward-only position within a fragment.
#[derive(Debug)]
struct Cursor<'f> {
    fragment: &'f str,
    position: usize,
}

impl<'f> Cursor<'f> {
    fn new(fragment: &'f str) -> Self {
        Self {
            fragment,
            position: 0,
        }
    }

    fn rest(&self) -> &'f str {
        &self.fragment[self.position..]
    }

    fn is_empty(&self) -> bool {
        self.position == self.fragment.len()
    }

    fn peek(&self) -> Option<u8> {
        self.fragment.as_bytes().get(self.position).copied()
    }

    fn advance(&mut self, length: usize) {
        self.position = std::cmp::min(self.position + length, self.fragment.len());
    }

    /// Consume `prefix` if the remainder starts with it.
    fn eat(&mut self, prefix: &str) -> bool {
        if self.rest().starts_with(prefix) {
            self.advance(prefix.len());
            true
        } else {
            false
        }
    }

    fn take_while(&mut self, predicate: impl Fn(u8) -> bool) -> &'f str {
        let start = self.position;
        while matches!(self.peek(), Some(b) if predicate(b)) {
            self.position += 1;
        }
        &self.fragment[start..self.position]
    }
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-'
}

/// A name which is nothing but hyphens names nothing.
fn meaningful(name: &str) -> Option<String> {
    if name.trim_start_matches('-').is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

fn parse_name(cursor: &mut Cursor<'_>) -> Result<Argument, NameError> {
    let fragment = cursor.fragment;
    let leading_hyphens = fragment.bytes().take_while(|b| *b == b'-').count();

    if leading_hyphens == fragment.len() {
        return Err(NameError::EmptyName {
            fragment: fragment.to_string(),
        });
    }

    if leading_hyphens > 2 {
        return Err(NameError::LeadingHyphens {
            fragment: fragment.to_string(),
            count: leading_hyphens,
        });
    }

    let mut short = "";
    let mut name_allowed = true;

    if leading_hyphens == 1 {
        short = cursor.take_while(is_name_byte);
        // Permits the combined form `-x|--long-name`.
        name_allowed = cursor.eat("|");
    }

    let name = if name_allowed {
        cursor.take_while(is_name_byte)
    } else {
        ""
    };

    Argument::new(fragment, meaningful(name), meaningful(short))
}

/// Read the leading `++` (count) and `!` (required) toggles.
fn parse_toggles(cursor: &mut Cursor<'_>) -> (bool, Option<bool>) {
    if cursor.eat("++!") || cursor.eat("!++") {
        return (true, Some(true));
    }

    let count = cursor.eat("++");
    let required = if cursor.eat("!") { Some(true) } else { None };
    (count, required)
}

fn is_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Read the `:`-delimited properties (type, nargs, choices).
///
/// Leaves the cursor at the default value expression, if any, with its `=` consumed.
fn parse_properties(
    cursor: &mut Cursor<'_>,
    argument: &mut Argument,
    values: &[Value],
) -> Result<(), SyntaxError> {
    let mut type_: Option<ValueType> = None;
    let mut nargs: Option<Nargs> = None;
    let mut choices: Option<&str> = None;

    loop {
        match cursor.peek() {
            None => break,
            Some(b'=') => {
                cursor.advance(1);
                break;
            }
            // Otherwise, this is the ':' which opens the next property.
            Some(_) => cursor.advance(1),
        }

        let rest = cursor.rest();
        let length = rest.find([':', '=']).unwrap_or(rest.len());
        let property = &rest[..length];

        // Same-kind properties overwrite one another, but nothing may follow once all three kinds are set.
        if type_.is_some() && nargs.is_some() && choices.is_some() {
            return Err(SyntaxError::TooManyProperties {
                property: property.to_string(),
            });
        }

        if property.is_empty() {
            return Err(SyntaxError::EmptyProperty {
                fragment: argument.pattern().to_string(),
            });
        }

        cursor.advance(length);

        if is_identifier(property) {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Property '{property}' classified as type.");
            }
            type_ = Some(ValueType::from_identifier(property));
        } else if is_int(property) {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Property '{property}' classified as nargs.");
            }
            let count = property.parse().map_err(|_| SyntaxError::InvalidNargs {
                token: property.to_string(),
            })?;
            nargs = Some(Nargs::Precisely(count));
        } else if let Some(symbol) = Nargs::from_symbol(property) {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Property '{property}' classified as nargs.");
            }
            nargs = Some(symbol);
        } else {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Property '{property}' classified as choices.");
            }
            choices = Some(property);
        }
    }

    if type_.is_some() {
        argument.type_ = type_;
    }

    if nargs.is_some() {
        argument.nargs = nargs;
    }

    if let Some(choices) = choices {
        argument.choices = Some(evaluate(choices, values)?);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Keyword;
    use rstest::rstest;

    fn compile_argument(fragment: &str) -> Argument {
        parse_argument(fragment)
            .unwrap()
            .into_argument()
            .expect("fragment must compile to an argument")
    }

    fn int_list(items: &[i64]) -> Value {
        Value::List(items.iter().copied().map(Value::Int).collect())
    }

    #[test]
    fn separator() {
        assert_eq!(parse_argument("^").unwrap(), Fragment::Separator);
    }

    #[test]
    fn flag() {
        let argument = compile_argument("--verbose");
        assert_eq!(argument.name(), Some("--verbose"));
        assert_eq!(argument.short(), Some("-v".to_string()));
        assert_eq!(argument.action(), Some(Action::StoreTrue));
        assert_eq!(argument.nargs(), None);
        assert_eq!(argument.default(), None);
        assert_eq!(argument.required(), None);
        assert_eq!(argument.pattern(), "--verbose");
    }

    #[test]
    fn short_only() {
        let argument = compile_argument("-v");
        assert_eq!(argument.name(), None);
        assert_eq!(argument.short(), Some("-v".to_string()));
        assert_eq!(argument.action(), None);
    }

    #[test]
    fn positional() {
        let argument = compile_argument("x:int");
        assert_eq!(argument.name(), Some("x"));
        assert_eq!(argument.short(), None);
        assert!(!argument.is_option());
        assert_eq!(argument.type_(), Some(&ValueType::Int));
        assert_eq!(argument.action(), None);
    }

    #[test]
    fn bare_positional() {
        let argument = compile_argument("filename");
        assert_eq!(argument.name(), Some("filename"));
        assert!(!argument.is_option());
        assert_eq!(argument.action(), Some(Action::StoreTrue));
        assert_eq!(argument.keywords(), vec![Keyword::Action(Action::StoreTrue)]);
    }

    #[rstest]
    #[case("--verbose", Some(Action::StoreTrue))]
    #[case("verbose", Some(Action::StoreTrue))]
    #[case("-v|--verbose", Some(Action::StoreTrue))]
    #[case("-v", None)]
    #[case("-v|", None)]
    #[case("--verbose!", None)]
    #[case("verbose:int", None)]
    fn implicit_flag(#[case] fragment: &str, #[case] action: Option<Action>) {
        assert_eq!(compile_argument(fragment).action(), action);
    }

    #[rstest]
    #[case("--verbosity++", Some(Action::Count), None)]
    #[case("--verbosity++!", Some(Action::Count), Some(true))]
    #[case("--verbosity!++", Some(Action::Count), Some(true))]
    #[case("--connection-string!", None, Some(true))]
    #[case("--level!:int", None, Some(true))]
    #[case("--level++:int", Some(Action::Count), None)]
    fn toggles(
        #[case] fragment: &str,
        #[case] action: Option<Action>,
        #[case] required: Option<bool>,
    ) {
        let argument = compile_argument(fragment);
        assert_eq!(argument.action(), action);
        assert_eq!(argument.required(), required);
    }

    #[test]
    fn combined_names() {
        let argument = compile_argument("-expn|--experiment-name=None");
        assert_eq!(argument.short(), Some("-expn".to_string()));
        assert_eq!(argument.name(), Some("--experiment-name"));
        assert_eq!(argument.default(), Some(&Value::None));
        assert_eq!(argument.action(), None);
    }

    #[test]
    fn short_alias_inference() {
        let argument = compile_argument("--name");
        assert_eq!(argument.short(), Some("-n".to_string()));
        assert!(argument.infer_short());

        let argument = Compiler::new()
            .infer_short(false)
            .parse_argument("--name")
            .unwrap()
            .into_argument()
            .unwrap();
        assert_eq!(argument.short(), None);
        assert!(!argument.infer_short());

        let argument = Compiler::new()
            .options(CompileOptions { infer_short: false })
            .parse_argument("--name")
            .unwrap()
            .into_argument()
            .unwrap();
        assert_eq!(argument.short(), None);
    }

    #[rstest]
    #[case("x:int", Some(ValueType::Int), None, None)]
    #[case("x:3", None, Some(Nargs::Precisely(3)), None)]
    #[case("x:?", None, Some(Nargs::AtMostOne), None)]
    #[case("x:*", None, Some(Nargs::Any), None)]
    #[case("x:+", None, Some(Nargs::AtLeastOne), None)]
    #[case("x:[1, 2]", None, None, Some(int_list(&[1, 2])))]
    #[case("x:int:+:[1, 2]", Some(ValueType::Int), Some(Nargs::AtLeastOne), Some(int_list(&[1, 2])))]
    #[case("x:[1, 2]:+:int", Some(ValueType::Int), Some(Nargs::AtLeastOne), Some(int_list(&[1, 2])))]
    #[case("x:Path", Some(ValueType::Named("Path".to_string())), None, None)]
    // Same-kind properties: last one wins.
    #[case("x:int:float", Some(ValueType::Float), None, None)]
    #[case("x:1:2:+", None, Some(Nargs::AtLeastOne), None)]
    #[case("x:int:float:+:[1]", Some(ValueType::Float), Some(Nargs::AtLeastOne), Some(int_list(&[1])))]
    fn properties(
        #[case] fragment: &str,
        #[case] type_: Option<ValueType>,
        #[case] nargs: Option<Nargs>,
        #[case] choices: Option<Value>,
    ) {
        let argument = compile_argument(fragment);
        assert_eq!(argument.type_(), type_.as_ref());
        assert_eq!(argument.nargs(), nargs);
        assert_eq!(argument.choices(), choices.as_ref());
        assert_eq!(argument.default(), None);
    }

    #[rstest]
    #[case("x=5", None, Value::Int(5))]
    #[case("--size:int=5", Some(ValueType::Int), Value::Int(5))]
    #[case("--size:int:+=[1, 2]", Some(ValueType::Int), int_list(&[1, 2]))]
    #[case("--name='a:b=c'", None, Value::Str("a:b=c".to_string()))]
    #[case("--name:str=\"x y\"", Some(ValueType::Str), Value::Str("x y".to_string()))]
    #[case("--ratio:float=-0.5", Some(ValueType::Float), Value::Float(-0.5))]
    #[case("--dry-run!=False", None, Value::Bool(false))]
    fn default_value(
        #[case] fragment: &str,
        #[case] type_: Option<ValueType>,
        #[case] default: Value,
    ) {
        let argument = compile_argument(fragment);
        assert_eq!(argument.type_(), type_.as_ref());
        assert_eq!(argument.default(), Some(&default));
    }

    #[test]
    fn empty_default() {
        let argument = compile_argument("x:int=");
        assert_eq!(argument.type_(), Some(&ValueType::Int));
        assert_eq!(argument.default(), None);
    }

    #[test]
    fn references() {
        let compiler = Compiler::new().values(vec![
            Value::Str("main".to_string()),
            int_list(&[1, 2, 3]),
        ]);

        let argument = compiler
            .parse_argument("--branch:$1=$0")
            .unwrap()
            .into_argument()
            .unwrap();
        assert_eq!(argument.choices(), Some(&int_list(&[1, 2, 3])));
        assert_eq!(argument.default(), Some(&Value::Str("main".to_string())));

        assert_eq!(
            compiler.parse_argument("--branch=$2").unwrap_err(),
            CompileError::Syntax(SyntaxError::UnresolvedReference {
                index: 2,
                available: 2,
            })
        );
    }

    #[rstest]
    #[case("-")]
    #[case("--")]
    #[case("")]
    #[case("-:int")]
    #[case("--:int")]
    #[case("-|--")]
    fn empty_name(#[case] fragment: &str) {
        assert_matches!(
            parse_argument(fragment),
            Err(CompileError::Name(NameError::EmptyName { .. }))
        );
    }

    #[rstest]
    #[case("---x", 3)]
    #[case("----x", 4)]
    fn leading_hyphens(#[case] fragment: &str, #[case] count: usize) {
        assert_eq!(
            parse_argument(fragment).unwrap_err(),
            CompileError::Name(NameError::LeadingHyphens {
                fragment: fragment.to_string(),
                count,
            })
        );
    }

    #[rstest]
    #[case("x?", "?")]
    #[case("--name@", "@")]
    #[case("--name|--other", "|--other")]
    #[case("x,y", ",y")]
    fn unexpected_suffix(#[case] fragment: &str, #[case] suffix: &str) {
        assert_eq!(
            parse_argument(fragment).unwrap_err(),
            CompileError::Syntax(SyntaxError::UnexpectedSuffix {
                suffix: suffix.to_string(),
            })
        );
    }

    #[test]
    fn short_name_run() {
        // The short name takes the whole run of name characters.
        let argument = compile_argument("-x--name");
        assert_eq!(argument.short(), Some("-x--name".to_string()));
        assert_eq!(argument.name(), None);

        let argument = compile_argument("-x|");
        assert_eq!(argument.short(), Some("-x".to_string()));
        assert_eq!(argument.name(), None);
        assert_eq!(argument.action(), None);
    }

    #[rstest]
    #[case("--level+", "+")]
    #[case("--level+:int", "+:int")]
    #[case("--level!!", "!")]
    #[case("--level++!!", "!")]
    fn expected_property(#[case] fragment: &str, #[case] suffix: &str) {
        assert_eq!(
            parse_argument(fragment).unwrap_err(),
            CompileError::Syntax(SyntaxError::ExpectedProperty {
                suffix: suffix.to_string(),
            })
        );
    }

    #[rstest]
    #[case("x:int:+:[1]:float")]
    #[case("x:int:+:[1]:[2]")]
    fn too_many_properties(#[case] fragment: &str) {
        assert_matches!(
            parse_argument(fragment),
            Err(CompileError::Syntax(SyntaxError::TooManyProperties { .. }))
        );
    }

    #[rstest]
    #[case("x:")]
    #[case("x::int")]
    #[case("x:int:")]
    #[case("x:int:=5")]
    fn empty_property(#[case] fragment: &str) {
        assert_matches!(
            parse_argument(fragment),
            Err(CompileError::Syntax(SyntaxError::EmptyProperty { .. }))
        );
    }

    #[rstest]
    #[case("x:1 + 1")]
    #[case("x=os.system('ls')")]
    #[case("x:int=[1,")]
    #[case("x=__import__")]
    // After '=' everything is the default, never another property.
    #[case("x=int")]
    #[case("x=5:int")]
    fn invalid_value(#[case] fragment: &str) {
        assert_matches!(
            parse_argument(fragment),
            Err(CompileError::Syntax(SyntaxError::InvalidValue { .. }))
        );
    }

    #[test]
    fn deeply_nested_default() {
        let fragment = format!("x={}{}", "[".repeat(5000), "]".repeat(5000));
        assert_matches!(
            parse_argument(&fragment),
            Err(CompileError::Syntax(SyntaxError::InvalidValue { reason, .. })) if reason.contains("nesting too deep")
        );
    }

    #[test]
    fn invalid_nargs() {
        assert_matches!(
            parse_argument("x:99999999999999999999999"),
            Err(CompileError::Syntax(SyntaxError::InvalidNargs { .. }))
        );
    }

    #[rstest]
    #[case("--verbose")]
    #[case("-v")]
    #[case("x:int")]
    #[case("--verbosity++!")]
    #[case("--connection-string!")]
    #[case("-expn|--experiment-name=None")]
    #[case("--size:int:+:[1, 2, 3]=[1]")]
    #[case("--ratio:float:?=0.5")]
    fn reparse_pattern(#[case] fragment: &str) {
        let argument = compile_argument(fragment);
        let reparsed = compile_argument(argument.pattern());
        assert!(argument.is_equivalent(&reparsed));
        assert_eq!(argument, reparsed);
    }

    #[rstest]
    #[case("--name", true)]
    #[case("-n", true)]
    #[case("name", false)]
    #[case("n-ame", false)]
    fn cursor_name(#[case] fragment: &str, #[case] is_option: bool) {
        let mut cursor = Cursor::new(fragment);
        let argument = parse_name(&mut cursor).unwrap();
        assert!(cursor.is_empty());
        assert_eq!(argument.is_option(), is_option);
    }

    #[rstest]
    #[case("++!", true, Some(true), "")]
    #[case("!++", true, Some(true), "")]
    #[case("++", true, None, "")]
    #[case("++:int", true, None, ":int")]
    #[case("!", false, Some(true), "")]
    #[case("!=1", false, Some(true), "=1")]
    #[case(":int", false, None, ":int")]
    #[case("+", false, None, "+")]
    fn toggle_consumption(
        #[case] suffix: &str,
        #[case] count: bool,
        #[case] required: Option<bool>,
        #[case] rest: &str,
    ) {
        let mut cursor = Cursor::new(suffix);
        assert_eq!(parse_toggles(&mut cursor), (count, required));
        assert_eq!(cursor.rest(), rest);
    }

    #[rstest]
    #[case("int", true)]
    #[case("_private", true)]
    #[case("Path2", true)]
    #[case("2x", false)]
    #[case("", false)]
    #[case("a-b", false)]
    #[case("+", false)]
    fn identifier(#[case] token: &str, #[case] expected: bool) {
        assert_eq!(is_identifier(token), expected);
    }
}
