//! Compiler module for `paperbush`.
//! See [documentation root](https://docs.rs/paperbush/latest/paperbush/index.html) for full details.
#![deny(missing_docs)]
mod compiler;
mod error;
mod model;
mod schema;
mod splitter;
mod value;

pub use compiler::{compile, parse_argument, CompileOptions, Compiler};
pub use error::*;
pub use model::*;
pub use schema::Schema;
pub use splitter::split_args;
pub use value::{evaluate, Value, ValueType};

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
