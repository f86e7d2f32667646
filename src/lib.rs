//! `paperbush` compiles a compact, single-line shorthand for command line arguments into argument descriptors.
//!
//! Each descriptor carries what a conventional argument parser needs to configure an argument: its name and short alias, value type, cardinality (`nargs`), default, choices, whether it is required, and its action.
//! `paperbush` only *describes* arguments; parsing the process arguments against the descriptors is left to the consuming argument parser.
//!
//! # Usage
//! ```no_run
#![doc = include_str!("../demos/compile_pattern.rs")]
//! ```
//!
//! Running the demo with its built-in pattern produces:
//! ```console
//! $ cargo run --example compile_pattern
//! add_argument('square', type=int)
//! add_argument('-v', '--verbosity', type=int, default=0, choices=[0, 1, 2])
//! # separator
//! add_argument('-q', '--quiet', action='store_true')
//! add_argument('-o', '--output', default=None)
//! # linked: [1, 2]
//! ```
//!
//! # Shorthand Syntax
//! A specification is a whitespace separated list of *fragments*.
//! Words are merged into one fragment while a bracket (`[]`, `()`, `{}`) or quote group is still open, so `--level:[0, 1, 2]` is a single fragment.
//!
//! Each fragment is either the separator `^`, or an argument:
//! ```console
//! fragment     := "^" | name suffix?
//! name         := ("-" short_chars ("|" "--" ident)?) | ("--"? ident)
//! suffix       := toggles? properties? ("=" value_expr)?
//! toggles      := "++!" | "!++" | "++" | "!"
//! properties   := ":" prop (":" prop)*
//! prop         := ident | integer | "?" | "+" | "*" | choices_expr
//! value_expr   := "$" integer | literal
//! ```
//!
//! ### Names
//! * `name` (no hyphens) is a positional argument.
//! * `--name` is an option; its short alias `-n` is inferred unless disabled via [`Compiler::infer_short`].
//! * `-n` is a short-only option, and `-n|--name` gives both explicitly.
//!
//! A fragment with no suffix is a flag (`action='store_true'`) when it has a long or positional name, so `--quiet` and `quiet` are flags while `-q` alone takes a value.
//!
//! ### Toggles
//! * `++` makes the argument a counter (`action='count'`).
//! * `!` makes the argument required.
//! * `++!` (or `!++`) does both.
//!
//! ### Properties
//! An `=` always ends the properties: everything after it is the default value expression, so a property can only be introduced by `:`.
//!
//! Each `:`-delimited property is classified by its shape:
//! * An identifier (ex: `int`, `float`, `str`, `bool`) is the [`ValueType`].
//! * An integer, `?`, `*`, or `+` is the [`Nargs`].
//! * Anything else is a choices expression.
//!
//! Repeating a kind of property overwrites it, but once all three kinds are set no further property is allowed.
//!
//! ### Values
//! Defaults (after `=`) and choices are *literals*, never evaluated code:
//! `None`, `True`, `False`, integers, floats, quoted strings, and `[..]`, `(..)`, `{..}` collections of these.
//! `$N` refers to the `N`th value supplied via [`Compiler::values`].
//!
//! ```
//! use paperbush::{Compiler, Nargs, Value, ValueType};
//!
//! let schema = Compiler::new()
//!     .values(vec![Value::Str("main".to_string())])
//!     .compile("--branch=$0 files:str:+ --jobs:int=4")
//!     .unwrap();
//! let arguments = schema.arguments();
//!
//! assert_eq!(arguments[0].default(), Some(&Value::Str("main".to_string())));
//! assert_eq!(arguments[1].nargs(), Some(Nargs::AtLeastOne));
//! assert_eq!(arguments[2].type_(), Some(&ValueType::Int));
//! ```
//!
//! ### Separators
//! The `^` fragment links the arguments on either side of it; [`Schema::groups`] reports the linked groups.
//!
//! # Errors
//! Compilation is all-or-nothing.
//! A fragment without a usable name fails with [`CompileError::Name`], and any other grammar violation (including unmatched brackets) fails with [`CompileError::Syntax`].
//!
//! # Features
//! * `unit_test`: For features that help with unit testing.
//! * `tracing_debug`: Emit `tracing` debug events while compiling.
pub use paperbush_compiler::*;
