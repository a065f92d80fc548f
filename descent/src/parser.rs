//! Basic definitions for working with parsers.
//!
//! A parser is anything implementing [`Parser`]: it takes a text slice, tries to
//! match a prefix of it, and returns either a [`PartialParse`] pairing the produced
//! value with the unconsumed rest of the slice, or a [`ParseError`].
//!
//! Parsers are grammar nodes. Each node carries a [`NodeId`] assigned once when the
//! node is built, which [`Parser::display`] uses to render cyclic grammars as
//! finite structures.

use std::{
    fmt,
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering},
};

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::{
    combinator::{And, AndKeepLeft, AndKeepRight, Map, Named, Optional, Or, Repeat, Star},
    error::ParseError,
    repr::{Node, Repr},
};

/// The stable identity of a grammar node.
///
/// Identities are allocated from a process-wide counter when a node is built, so
/// two structurally identical parsers built separately are distinct nodes. Cloning
/// a parser keeps its identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        NodeId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The identities already expanded during one [`Parser::display`] walk.
pub type Visited = FxHashSet<NodeId>;

/// A successful parse of a prefix of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartialParse<'a, T> {
    /// The value produced from the consumed prefix.
    pub output: T,
    /// The unconsumed suffix of the input.
    pub remaining: &'a str,
}

impl<'a, T> PartialParse<'a, T> {
    pub fn new(output: T, remaining: &'a str) -> Self {
        Self { output, remaining }
    }

    /// Transform the output, keeping the remaining input.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> PartialParse<'a, U> {
        PartialParse {
            output: f(self.output),
            remaining: self.remaining,
        }
    }

    /// The prefix of `input` this parse consumed.
    ///
    /// `input` must be the slice that was given to the parser.
    pub fn consumed<'b>(&self, input: &'b str) -> &'b str {
        &input[..input.len() - self.remaining.len()]
    }
}

/// The outcome of running a parser.
pub type ParseResult<'a, T> = Result<PartialParse<'a, T>, ParseError>;

/// A grammar node.
///
/// # Writing a Parser
///
/// [`parse`](Parser::parse) must match at the very start of `input`, never scan
/// ahead, and on success return a `remaining` that is a suffix of `input`. It must
/// have no effect besides computing its result.
///
/// [`kind`](Parser::kind) renders one level of structure, delegating to
/// [`describe`](Parser::describe) on children so that shared and recursive
/// children are only expanded once.
pub trait Parser {
    type Output;

    /// Try to match a prefix of `input`.
    fn parse<'a>(&self, input: &'a str) -> ParseResult<'a, Self::Output>;

    /// The identity of this node.
    fn id(&self) -> NodeId;

    /// A short one-line description, used in error messages.
    fn label(&self) -> String;

    /// The kind tag and children of this node.
    fn kind(&self, visited: &mut Visited) -> Node;

    /// Describe this node, or refer back to it if it was already described.
    ///
    /// The identity is marked before the children are walked, so a node reachable
    /// from itself renders as a back reference the second time.
    fn describe(&self, visited: &mut Visited) -> Repr {
        let id = self.id();
        if !visited.insert(id) {
            return Repr::BackRef { id };
        }
        Repr::Expanded {
            id,
            value: self.kind(visited),
        }
    }

    /// The full structure of the grammar rooted at this node.
    fn display(&self) -> Repr {
        self.describe(&mut Visited::default())
    }

    /// Parse the whole of `input`.
    ///
    /// Fails with [`ParseError::Unconsumed`] when the parse succeeds but leaves
    /// trailing text.
    fn parse_all(&self, input: &str) -> Result<Self::Output, ParseError> {
        let PartialParse { output, remaining } = self.parse(input)?;
        if remaining.is_empty() {
            Ok(output)
        } else {
            Err(ParseError::unconsumed(self.label(), input, remaining, None))
        }
    }
}

impl<P: Parser + ?Sized> Parser for &P {
    type Output = P::Output;

    fn parse<'a>(&self, input: &'a str) -> ParseResult<'a, Self::Output> {
        (**self).parse(input)
    }

    fn id(&self) -> NodeId {
        (**self).id()
    }

    fn label(&self) -> String {
        (**self).label()
    }

    fn kind(&self, visited: &mut Visited) -> Node {
        (**self).kind(visited)
    }

    fn describe(&self, visited: &mut Visited) -> Repr {
        (**self).describe(visited)
    }

    fn parse_all(&self, input: &str) -> Result<Self::Output, ParseError> {
        (**self).parse_all(input)
    }
}

/// A cheaply clonable, type-erased parser.
///
/// Boxing is transparent: the boxed parser keeps the identity and structure of the
/// parser it wraps.
pub struct BoxedParser<T> {
    inner: Rc<dyn Parser<Output = T>>,
}

impl<T> Clone for BoxedParser<T> {
    fn clone(&self) -> Self {
        BoxedParser {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for BoxedParser<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BoxedParser").field(&self.inner.label()).finish()
    }
}

impl<T: 'static> BoxedParser<T> {
    pub fn new(parser: impl Parser<Output = T> + 'static) -> Self {
        BoxedParser {
            inner: Rc::new(parser),
        }
    }
}

impl<T> Parser for BoxedParser<T> {
    type Output = T;

    fn parse<'a>(&self, input: &'a str) -> ParseResult<'a, T> {
        self.inner.parse(input)
    }

    fn id(&self) -> NodeId {
        self.inner.id()
    }

    fn label(&self) -> String {
        self.inner.label()
    }

    fn kind(&self, visited: &mut Visited) -> Node {
        self.inner.kind(visited)
    }

    fn describe(&self, visited: &mut Visited) -> Repr {
        self.inner.describe(visited)
    }

    fn parse_all(&self, input: &str) -> Result<T, ParseError> {
        self.inner.parse_all(input)
    }
}

/// Combinators available on every parser.
pub trait ParserExt: Parser + Sized {
    /// Transform the output on success.
    fn map<U, F>(self, f: F) -> Map<Self, F>
    where
        F: Fn(Self::Output) -> U,
    {
        Map::new(self, f)
    }

    /// Run `other` on what this parser leaves, keeping both outputs.
    fn and<Q: Parser>(self, other: Q) -> And<Self, Q> {
        And::new(self, other)
    }

    /// Run `other` on what this parser leaves, keeping only this output.
    fn and_keep_left<Q: Parser>(self, other: Q) -> AndKeepLeft<Self, Q> {
        AndKeepLeft::new(self, other)
    }

    /// Run `other` on what this parser leaves, keeping only its output.
    fn and_keep_right<Q: Parser>(self, other: Q) -> AndKeepRight<Self, Q> {
        AndKeepRight::new(self, other)
    }

    /// Try this parser, then `other` on the same input.
    fn or<Q>(self, other: Q) -> Or<Self, Q>
    where
        Q: Parser<Output = Self::Output>,
    {
        Or::new(self, other)
    }

    /// Succeed with `None` instead of failing.
    fn optional(self) -> Optional<Self> {
        Optional::new(self)
    }

    /// Apply this parser zero or more times.
    fn star(self) -> Star<Self> {
        Star::new(self)
    }

    /// Apply this parser exactly `count` times.
    fn repeat(self, count: usize) -> Repeat<Self> {
        Repeat::new(self, count)
    }

    /// Give this parser a name for display and error messages.
    fn named(self, name: impl Into<String>) -> Named<Self> {
        Named::new(self, name.into())
    }

    /// Erase the type of this parser.
    fn boxed(self) -> BoxedParser<Self::Output>
    where
        Self: 'static,
        Self::Output: 'static,
    {
        BoxedParser::new(self)
    }
}

impl<P: Parser> ParserExt for P {}
