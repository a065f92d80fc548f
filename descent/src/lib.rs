//! Recursive-descent parser combinators over text.
//!
//! Grammars are built from two primitive matchers, [`literal`] and [`pattern`],
//! composed with the combinators of [`ParserExt`]. Every parser is a grammar node
//! with a stable identity; [`Parser::display`] renders the grammar rooted at a node
//! as a [`Repr`], expanding each node once and referring back to it afterwards, so
//! recursive grammars built with [`Lazy`] still display as finite structures.
//!
//! ```
//! use descent::*;
//!
//! let digit = pattern("[0-9]").unwrap();
//! let number = digit.clone().and(digit.star()).map(|(first, rest)| {
//!     rest.into_iter().fold(first, |acc, d| acc + &d).parse::<u32>().unwrap()
//! });
//! let sum = number.clone().and(literal("+").and_keep_right(number).star());
//!
//! let (first, rest) = sum.parse_all("1+20+300").unwrap();
//! assert_eq!(first + rest.iter().sum::<u32>(), 321);
//! assert!(sum.parse_all("1+").is_err());
//! ```
//!
//! Parsing is purely functional over the input: a parse either succeeds with a
//! [`PartialParse`] whose `remaining` is a suffix of the input, or fails with a
//! [`ParseError`] that says whether the input or the grammar is at fault.

mod arena;
pub mod combinator;
pub mod error;
pub mod parser;
pub mod primitive;
pub mod recursive;
pub mod repr;

pub use crate::{
    arena::Arena,
    error::{DefinitionFault, ErrorKind, GrammarError, ParseError},
    parser::{BoxedParser, NodeId, ParseResult, Parser, ParserExt, PartialParse, Visited},
    primitive::{literal, pattern, pattern_with, Literal, Pattern, PatternOptions},
    recursive::{lazy, Lazy},
    repr::{Node, Repr},
};
