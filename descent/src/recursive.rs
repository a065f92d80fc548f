//! Deferred and recursive rules.
//!
//! A [`Lazy`] is a handle to a parser that is built at most once, on first use.
//! Handles are cheap to clone and every clone refers to the same built parser, so a
//! rule referenced from several places, including from inside itself, is a single
//! grammar node.
//!
//! ```
//! # use descent::*;
//! let arena = Arena::new();
//! let nested: Lazy<usize> = Lazy::declare(&arena);
//! nested
//!     .define(
//!         literal("(")
//!             .and_keep_right(nested.clone())
//!             .and_keep_left(literal(")"))
//!             .map(|depth| depth + 1)
//!             .or(literal("").map(|_| 0)),
//!     )
//!     .unwrap();
//! assert_eq!(nested.parse_all("((()))").unwrap(), 3);
//! ```

use std::{fmt, rc::Rc};

use crate::{
    arena::{Arena, Slot},
    error::{DefinitionFault, GrammarError, ParseError},
    parser::{BoxedParser, NodeId, ParseResult, Parser, Visited},
    repr::{Node, Repr},
};

pub struct Lazy<T> {
    inner: Slot<BoxedParser<T>>,
}

impl<T> Clone for Lazy<T> {
    fn clone(&self) -> Self {
        Lazy {
            inner: self.inner.clone(),
        }
    }
}

impl<T> fmt::Debug for Lazy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Lazy").field(&self.inner.id()).finish()
    }
}

impl<T: 'static> Lazy<T> {
    /// A rule built by `build` the first time it is parsed with or displayed.
    pub fn new<P>(arena: &Rc<Arena>, build: impl FnOnce() -> P + 'static) -> Self
    where
        P: Parser<Output = T> + 'static,
    {
        Lazy {
            inner: arena.alloc_with(move || BoxedParser::new(build())),
        }
    }

    /// A rule to be given its definition later with [`define`](Lazy::define).
    pub fn declare(arena: &Rc<Arena>) -> Self {
        Lazy {
            inner: arena.alloc(),
        }
    }

    /// Give a declared rule its definition. A rule can only be defined once.
    pub fn define(&self, parser: impl Parser<Output = T> + 'static) -> Result<(), GrammarError> {
        self.inner.store(BoxedParser::new(parser))
    }

    pub fn is_defined(&self) -> bool {
        self.inner.is_defined()
    }

    /// The built parser.
    pub fn force(&self) -> Result<Rc<BoxedParser<T>>, DefinitionFault> {
        self.inner.get()
    }
}

impl<T: 'static> Parser for Lazy<T> {
    type Output = T;

    fn parse<'a>(&self, input: &'a str) -> ParseResult<'a, T> {
        match self.force() {
            Ok(parser) => parser.parse(input),
            Err(fault) => Err(ParseError::definition(self.label(), input, fault)),
        }
    }

    /// The identity of the handle. Once built, the rule displays under the identity
    /// of the parser it wraps.
    fn id(&self) -> NodeId {
        self.inner.id()
    }

    fn label(&self) -> String {
        match self.inner.get() {
            Ok(parser) => parser.label(),
            Err(_) => format!("lazy{}", self.inner.id()),
        }
    }

    fn kind(&self, visited: &mut Visited) -> Node {
        match self.force() {
            Ok(parser) => parser.kind(visited),
            Err(_) => Node::Unresolved,
        }
    }

    fn describe(&self, visited: &mut Visited) -> Repr {
        match self.force() {
            Ok(parser) => parser.describe(visited),
            Err(_) => {
                let id = self.id();
                if visited.insert(id) {
                    Repr::Expanded {
                        id,
                        value: Node::Unresolved,
                    }
                } else {
                    Repr::BackRef { id }
                }
            }
        }
    }

    fn parse_all(&self, input: &str) -> Result<T, ParseError> {
        match self.force() {
            Ok(parser) => parser.parse_all(input),
            Err(fault) => Err(ParseError::definition(self.label(), input, fault)),
        }
    }
}

/// Shorthand for [`Lazy::new`].
pub fn lazy<T, P>(arena: &Rc<Arena>, build: impl FnOnce() -> P + 'static) -> Lazy<T>
where
    T: 'static,
    P: Parser<Output = T> + 'static,
{
    Lazy::new(arena, build)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::{
        error::ErrorKind,
        parser::ParserExt,
        primitive::literal,
    };

    #[test]
    fn and_with_lazy_right() {
        let arena = Arena::new();
        let parser = literal("a").and(lazy(&arena, || literal("b")));
        let parse = parser.parse("ab").unwrap();
        assert_eq!(parse.output, ("a".to_owned(), "b".to_owned()));
        assert_eq!(parse.remaining, "");
        assert!(parser.parse("ac").is_err());
    }

    #[test]
    fn build_is_deferred_and_memoized() {
        let arena = Arena::new();
        let builds = Rc::new(Cell::new(0));
        let counter = builds.clone();
        let rule = Lazy::new(&arena, move || {
            counter.set(counter.get() + 1);
            literal("x")
        });
        assert_eq!(builds.get(), 0);
        rule.parse("x").unwrap();
        rule.clone().parse("x").unwrap();
        assert_eq!(rule.display(), rule.clone().display());
        assert_eq!(builds.get(), 1);
    }

    #[test]
    fn undefined_rule_is_a_definition_error() {
        let arena = Arena::new();
        let rule: Lazy<String> = Lazy::declare(&arena);
        let error = rule.parse("x").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Definition);
        assert_eq!(error.fault(), Some(DefinitionFault::Undefined));
        assert_eq!(rule.display().node(), Some(&Node::Unresolved));
    }

    #[test]
    fn rule_defined_twice_is_rejected() {
        let arena = Arena::new();
        let rule = Lazy::declare(&arena);
        rule.define(literal("a")).unwrap();
        assert!(matches!(
            rule.define(literal("b")),
            Err(GrammarError::AlreadyDefined(_))
        ));
        assert_eq!(rule.parse("a").unwrap().output, "a");
    }

    #[test]
    fn dropped_arena_is_reported() {
        let arena = Arena::new();
        let rule = lazy(&arena, || literal("a"));
        drop(arena);
        assert_eq!(
            rule.parse("a").unwrap_err().fault(),
            Some(DefinitionFault::Detached)
        );
    }

    #[test]
    fn self_reference_displays_as_back_reference() {
        let arena = Arena::new();
        let list: Lazy<Vec<String>> = Lazy::declare(&arena);
        let item = literal("x");
        list.define(
            item.clone()
                .and(literal(",").and_keep_right(list.clone()).optional())
                .map(|(head, tail)| {
                    let mut items = vec![head];
                    items.extend(tail.unwrap_or_default());
                    items
                }),
        )
        .unwrap();

        assert_eq!(list.parse_all("x,x,x").unwrap().len(), 3);

        let repr = list.display();
        assert!(repr.is_well_formed());
        let root = repr.id();
        let mut expansions = 0;
        let mut back_refs = 0;
        repr.walk(&mut |entry| match entry {
            Repr::Expanded { id, .. } if *id == root => expansions += 1,
            Repr::BackRef { id } if *id == root => back_refs += 1,
            _ => {}
        });
        assert_eq!((expansions, back_refs), (1, 1));
    }
}
