use std::fmt::{self, Display, Formatter, Write};

use crate::error::SyntaxError;

/// A literal value, as written in a default or choices expression.
///
/// This is the complete set of values the compiler is able to produce.
/// There is no general-purpose evaluation: an expression is either a `$N` reference into the supplied values, or a literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `None`
    None,
    /// `True` or `False`
    Bool(bool),
    /// A signed integer, ex: `-12`.
    Int(i64),
    /// A signed float, ex: `0.5` or `1e3`.
    Float(f64),
    /// A single or double quoted string.
    Str(String),
    /// `[..]`
    List(Vec<Value>),
    /// `(..)`
    Tuple(Vec<Value>),
    /// `{..}`, de-duplicated in order of first occurrence.
    Set(Vec<Value>),
}

impl Value {
    /// The items of a `List`, `Tuple`, or `Set`.
    pub fn items(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Tuple(items) | Value::Set(items) => Some(items),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => {
                if x.is_finite() && x.fract() == 0.0 {
                    write!(f, "{x:.1}")
                } else {
                    write!(f, "{x}")
                }
            }
            Value::Str(s) => {
                f.write_char('\'')?;
                for c in s.chars() {
                    match c {
                        '\\' => f.write_str("\\\\")?,
                        '\'' => f.write_str("\\'")?,
                        '\n' => f.write_str("\\n")?,
                        '\t' => f.write_str("\\t")?,
                        '\r' => f.write_str("\\r")?,
                        '\0' => f.write_str("\\0")?,
                        _ => f.write_char(c)?,
                    }
                }
                f.write_char('\'')
            }
            Value::List(items) => write_items(f, "[", items, "]"),
            Value::Tuple(items) if items.len() == 1 => write!(f, "({},)", items[0]),
            Value::Tuple(items) => write_items(f, "(", items, ")"),
            Value::Set(items) => write_items(f, "{", items, "}"),
        }
    }
}

fn write_items(f: &mut Formatter<'_>, open: &str, items: &[Value], close: &str) -> fmt::Result {
    f.write_str(open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    f.write_str(close)
}

/// The value conversion to apply to an argument's input tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// `int`
    Int,
    /// `float`
    Float,
    /// `str`
    Str,
    /// `bool`
    Bool,
    /// Any other identifier; resolving it is up to the consumer.
    Named(String),
}

impl ValueType {
    /// Resolve a type identifier.
    pub fn from_identifier(identifier: &str) -> Self {
        match identifier {
            "int" => ValueType::Int,
            "float" => ValueType::Float,
            "str" => ValueType::Str,
            "bool" => ValueType::Bool,
            other => ValueType::Named(other.to_string()),
        }
    }

    /// The identifier this type was written as.
    pub fn identifier(&self) -> &str {
        match self {
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Str => "str",
            ValueType::Bool => "bool",
            ValueType::Named(name) => name,
        }
    }
}

impl Display for ValueType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

pub(crate) fn is_int(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

/// Evaluate a value expression: either a `$N` reference into `values`, or a literal.
///
/// ### Example
/// ```
/// # use paperbush_compiler::{evaluate, Value};
/// let values = vec![Value::Str("main".to_string())];
/// assert_eq!(evaluate("$0", &values).unwrap(), Value::Str("main".to_string()));
/// assert_eq!(
///     evaluate("[1, 'a', None]", &values).unwrap(),
///     Value::List(vec![Value::Int(1), Value::Str("a".to_string()), Value::None]),
/// );
/// assert!(evaluate("__import__('os')", &values).is_err());
/// ```
pub fn evaluate(expression: &str, values: &[Value]) -> Result<Value, SyntaxError> {
    let mut reader = LiteralReader {
        expression,
        bytes: expression.as_bytes(),
        position: 0,
        depth: 0,
        values,
    };
    reader.skip_whitespace();
    let value = reader.value()?;
    reader.skip_whitespace();

    if reader.position != reader.bytes.len() {
        return Err(reader.invalid(format!(
            "unexpected '{}'",
            &expression[reader.position..]
        )));
    }

    Ok(value)
}

/// The deepest collection nesting a literal may have.
const MAX_DEPTH: usize = 64;

struct LiteralReader<'e, 'v> {
    expression: &'e str,
    bytes: &'e [u8],
    position: usize,
    // Collections currently open.
    depth: usize,
    values: &'v [Value],
}

impl<'e, 'v> LiteralReader<'e, 'v> {
    fn invalid(&self, reason: impl Into<String>) -> SyntaxError {
        SyntaxError::InvalidValue {
            expression: self.expression.to_string(),
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.position).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.position += 1;
        }
    }

    fn take_while(&mut self, predicate: impl Fn(u8) -> bool) -> &'e str {
        let start = self.position;
        while matches!(self.peek(), Some(b) if predicate(b)) {
            self.position += 1;
        }
        &self.expression[start..self.position]
    }

    fn value(&mut self) -> Result<Value, SyntaxError> {
        match self.peek() {
            None => Err(self.invalid("expected a value")),
            Some(b'$') => self.reference(),
            Some(b'\'') | Some(b'"') => self.string(),
            Some(b'[') => Ok(Value::List(self.items(b'[', b']')?)),
            Some(b'{') => {
                let items = self.items(b'{', b'}')?;
                if items.is_empty() {
                    return Err(self.invalid("'{}' is not a set literal"));
                }
                let mut unique: Vec<Value> = Vec::with_capacity(items.len());
                for item in items {
                    if !unique.contains(&item) {
                        unique.push(item);
                    }
                }
                Ok(Value::Set(unique))
            }
            Some(b'(') => self.parenthesized(),
            Some(b) if b.is_ascii_digit() || b == b'-' || b == b'+' || b == b'.' => {
                self.number()
            }
            Some(b) if b.is_ascii_alphabetic() || b == b'_' => {
                let word = self.take_while(|b| b.is_ascii_alphanumeric() || b == b'_');
                match word {
                    "None" => Ok(Value::None),
                    "True" => Ok(Value::Bool(true)),
                    "False" => Ok(Value::Bool(false)),
                    _ => Err(self.invalid(format!("'{word}' is not a literal"))),
                }
            }
            Some(_) => Err(self.invalid(format!(
                "unexpected '{}'",
                &self.expression[self.position..]
            ))),
        }
    }

    fn reference(&mut self) -> Result<Value, SyntaxError> {
        // Skip the '$'.
        self.position += 1;
        let digits = self.take_while(|b| b.is_ascii_digit());

        if digits.is_empty() {
            return Err(self.invalid("'$' must be followed by an index"));
        }

        let index: usize = digits
            .parse()
            .map_err(|_| self.invalid(format!("index '{digits}' is out of range")))?;

        self.values
            .get(index)
            .cloned()
            .ok_or(SyntaxError::UnresolvedReference {
                index,
                available: self.values.len(),
            })
    }

    fn string(&mut self) -> Result<Value, SyntaxError> {
        let quote = self.bytes[self.position];
        self.position += 1;
        let mut out = String::default();
        let mut chars = self.expression[self.position..].char_indices();

        while let Some((offset, c)) = chars.next() {
            if c as u32 == quote as u32 {
                self.position += offset + 1;
                return Ok(Value::Str(out));
            }

            if c == '\\' {
                let escaped = match chars.next() {
                    Some((_, '\\')) => '\\',
                    Some((_, '\'')) => '\'',
                    Some((_, '"')) => '"',
                    Some((_, 'n')) => '\n',
                    Some((_, 't')) => '\t',
                    Some((_, 'r')) => '\r',
                    Some((_, '0')) => '\0',
                    Some((_, other)) => {
                        return Err(self.invalid(format!("unknown escape '\\{other}'")))
                    }
                    None => break,
                };
                out.push(escaped);
            } else {
                out.push(c);
            }
        }

        Err(self.invalid("unterminated string"))
    }

    fn number(&mut self) -> Result<Value, SyntaxError> {
        let start = self.position;
        if matches!(self.peek(), Some(b'-') | Some(b'+')) {
            self.position += 1;
        }
        let integral = self.take_while(|b| b.is_ascii_digit());
        let mut is_float = false;

        if self.peek() == Some(b'.') {
            is_float = true;
            self.position += 1;
            let fraction = self.take_while(|b| b.is_ascii_digit());
            if integral.is_empty() && fraction.is_empty() {
                return Err(self.invalid("expected digits"));
            }
        } else if integral.is_empty() {
            return Err(self.invalid("expected digits"));
        }

        if matches!(self.peek(), Some(b'e') | Some(b'E')) {
            is_float = true;
            self.position += 1;
            if matches!(self.peek(), Some(b'-') | Some(b'+')) {
                self.position += 1;
            }
            if self.take_while(|b| b.is_ascii_digit()).is_empty() {
                return Err(self.invalid("expected exponent digits"));
            }
        }

        let literal = &self.expression[start..self.position];

        if is_float {
            literal
                .parse()
                .map(Value::Float)
                .map_err(|_| self.invalid(format!("'{literal}' is not a float")))
        } else {
            literal
                .parse()
                .map(Value::Int)
                .map_err(|_| self.invalid(format!("integer '{literal}' is out of range")))
        }
    }

    fn parenthesized(&mut self) -> Result<Value, SyntaxError> {
        let (items, trailing_comma) = self.delimited(b'(', b')')?;

        // `(x)` only groups; `(x,)` is a one-tuple.
        if items.len() == 1 && !trailing_comma {
            Ok(items.into_iter().next().unwrap_or(Value::None))
        } else {
            Ok(Value::Tuple(items))
        }
    }

    fn items(&mut self, open: u8, close: u8) -> Result<Vec<Value>, SyntaxError> {
        self.delimited(open, close).map(|(items, _)| items)
    }

    fn delimited(&mut self, open: u8, close: u8) -> Result<(Vec<Value>, bool), SyntaxError> {
        debug_assert_eq!(self.peek(), Some(open));

        if self.depth == MAX_DEPTH {
            return Err(self.invalid(format!(
                "nesting too deep (more than {MAX_DEPTH} levels)"
            )));
        }

        self.position += 1;
        self.depth += 1;
        let mut items = Vec::default();
        let mut trailing_comma = false;

        loop {
            self.skip_whitespace();

            if self.peek() == Some(close) {
                self.position += 1;
                self.depth -= 1;
                return Ok((items, trailing_comma));
            }

            items.push(self.value()?);
            self.skip_whitespace();

            match self.peek() {
                Some(b',') => {
                    self.position += 1;
                    trailing_comma = true;
                }
                Some(b) if b == close => {
                    trailing_comma = false;
                }
                Some(_) => {
                    return Err(self.invalid(format!("expected ',' or '{}'", close as char)))
                }
                None => return Err(self.invalid(format!("missing '{}'", close as char))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn s(value: &str) -> Value {
        Value::Str(value.to_string())
    }

    #[rstest]
    #[case("None", Value::None)]
    #[case("True", Value::Bool(true))]
    #[case("False", Value::Bool(false))]
    #[case("0", Value::Int(0))]
    #[case("-12", Value::Int(-12))]
    #[case("+7", Value::Int(7))]
    #[case("0.5", Value::Float(0.5))]
    #[case(".5", Value::Float(0.5))]
    #[case("3.", Value::Float(3.0))]
    #[case("1e3", Value::Float(1000.0))]
    #[case("-2.5E-1", Value::Float(-0.25))]
    #[case("'abc'", s("abc"))]
    #[case("\"a b\"", s("a b"))]
    #[case("'it\\'s'", s("it's"))]
    #[case("'a\\nb'", s("a\nb"))]
    #[case("\"x'y\"", s("x'y"))]
    #[case("[]", Value::List(vec![]))]
    #[case("[0, 1, 2]", Value::List(vec![Value::Int(0), Value::Int(1), Value::Int(2)]))]
    #[case("[ 'a' ,None, ]", Value::List(vec![s("a"), Value::None]))]
    #[case("()", Value::Tuple(vec![]))]
    #[case("(1,)", Value::Tuple(vec![Value::Int(1)]))]
    #[case("(1)", Value::Int(1))]
    #[case("(1, 'b')", Value::Tuple(vec![Value::Int(1), s("b")]))]
    #[case("{1, 2, 1}", Value::Set(vec![Value::Int(1), Value::Int(2)]))]
    #[case("[[1], (2,), {3}]", Value::List(vec![
        Value::List(vec![Value::Int(1)]),
        Value::Tuple(vec![Value::Int(2)]),
        Value::Set(vec![Value::Int(3)]),
    ]))]
    #[case("  42  ", Value::Int(42))]
    fn evaluate_literal(#[case] expression: &str, #[case] expected: Value) {
        assert_eq!(evaluate(expression, &[]).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("int")]
    #[case("__import__('os').system('ls')")]
    #[case("1 + 1")]
    #[case("[1, 2")]
    #[case("[1 2]")]
    #[case("{}")]
    #[case("'abc")]
    #[case("'\\q'")]
    #[case("-")]
    #[case("1e")]
    #[case("$")]
    #[case("$x")]
    #[case("99999999999999999999")]
    #[case("lambda: 0")]
    fn evaluate_invalid(#[case] expression: &str) {
        assert_matches!(
            evaluate(expression, &[]),
            Err(SyntaxError::InvalidValue { expression: e, .. }) if e == expression
        );
    }

    #[rstest]
    #[case("[", "]", 64, true)]
    #[case("[", "]", 65, false)]
    #[case("(", ",)", 64, true)]
    #[case("{", "}", 65, false)]
    #[case("[", "]", 5000, false)]
    fn evaluate_nesting(
        #[case] open: &str,
        #[case] close: &str,
        #[case] levels: usize,
        #[case] accepted: bool,
    ) {
        let expression = format!("{}1{}", open.repeat(levels), close.repeat(levels));

        match evaluate(&expression, &[]) {
            Ok(_) => assert!(accepted),
            Err(SyntaxError::InvalidValue { reason, .. }) => {
                assert!(!accepted);
                assert!(reason.contains("nesting too deep"), "{reason}");
            }
            Err(error) => panic!("unexpected error: {error}"),
        }
    }

    #[test]
    fn evaluate_reference() {
        let values = vec![Value::Int(5), s("five")];

        assert_eq!(evaluate("$0", &values).unwrap(), Value::Int(5));
        assert_eq!(evaluate("$1", &values).unwrap(), s("five"));
        assert_eq!(
            evaluate("[$1, $0]", &values).unwrap(),
            Value::List(vec![s("five"), Value::Int(5)])
        );
        assert_eq!(
            evaluate("$2", &values).unwrap_err(),
            SyntaxError::UnresolvedReference {
                index: 2,
                available: 2,
            }
        );
    }

    #[rstest]
    #[case(Value::None, "None")]
    #[case(Value::Bool(true), "True")]
    #[case(Value::Float(2.0), "2.0")]
    #[case(Value::Float(0.25), "0.25")]
    #[case(s("it's"), "'it\\'s'")]
    #[case(Value::Tuple(vec![Value::Int(1)]), "(1,)")]
    #[case(Value::Set(vec![Value::Int(1), Value::Int(2)]), "{1, 2}")]
    #[case(Value::List(vec![s("a"), Value::None]), "['a', None]")]
    fn display(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(value.to_string(), expected);
        // Rendering is itself a valid literal.
        assert_eq!(evaluate(expected, &[]).unwrap(), value);
    }

    #[rstest]
    #[case("int", ValueType::Int)]
    #[case("float", ValueType::Float)]
    #[case("str", ValueType::Str)]
    #[case("bool", ValueType::Bool)]
    #[case("Path", ValueType::Named("Path".to_string()))]
    fn from_identifier(#[case] identifier: &str, #[case] expected: ValueType) {
        let value_type = ValueType::from_identifier(identifier);
        assert_eq!(value_type, expected);
        assert_eq!(value_type.to_string(), identifier);
    }
}
