//! Combinators building parsers out of other parsers.
//!
//! Every combinator is itself a grammar node with its own identity. Sequencing
//! combinators wrap the match failures of their children with their own context;
//! definition errors pass through every combinator untouched.

use crate::{
    error::{DefinitionFault, ParseError},
    parser::{NodeId, ParseResult, Parser, PartialParse, Visited},
    repr::Node,
};

#[derive(Clone, Copy)]
pub struct Map<P, F> {
    id: NodeId,
    parser: P,
    f: F,
}

impl<P, F> Map<P, F> {
    pub fn new(parser: P, f: F) -> Self {
        Self {
            id: NodeId::fresh(),
            parser,
            f,
        }
    }
}

impl<T, U, P, F> Parser for Map<P, F>
where
    P: Parser<Output = T>,
    F: Fn(T) -> U,
{
    type Output = U;

    fn parse<'a>(&self, input: &'a str) -> ParseResult<'a, U> {
        self.parser.parse(input).map(|parse| parse.map(&self.f))
    }

    fn id(&self) -> NodeId {
        self.id
    }

    fn label(&self) -> String {
        format!("map{}", self.id)
    }

    fn kind(&self, visited: &mut Visited) -> Node {
        Node::Map(Box::new(self.parser.describe(visited)))
    }
}

/// Run `left`, then `right` on what it left over.
fn sequence<'a, P, Q>(
    left: &P,
    right: &Q,
    input: &'a str,
) -> Result<(P::Output, PartialParse<'a, Q::Output>), ParseError>
where
    P: Parser,
    Q: Parser,
{
    let first = left.parse(input)?;
    let second = right.parse(first.remaining)?;
    Ok((first.output, second))
}

#[derive(Clone, Copy)]
pub struct And<P, Q> {
    id: NodeId,
    left: P,
    right: Q,
}

impl<P, Q> And<P, Q> {
    pub fn new(left: P, right: Q) -> Self {
        Self {
            id: NodeId::fresh(),
            left,
            right,
        }
    }
}

impl<P: Parser, Q: Parser> Parser for And<P, Q> {
    type Output = (P::Output, Q::Output);

    fn parse<'a>(&self, input: &'a str) -> ParseResult<'a, Self::Output> {
        match sequence(&self.left, &self.right, input) {
            Ok((first, second)) => Ok(second.map(|second| (first, second))),
            Err(error) => Err(error.within(self.label(), input)),
        }
    }

    fn id(&self) -> NodeId {
        self.id
    }

    fn label(&self) -> String {
        format!("and{}", self.id)
    }

    fn kind(&self, visited: &mut Visited) -> Node {
        let left = self.left.describe(visited);
        let right = self.right.describe(visited);
        Node::And(Box::new(left), Box::new(right))
    }
}

#[derive(Clone, Copy)]
pub struct AndKeepLeft<P, Q> {
    id: NodeId,
    left: P,
    right: Q,
}

impl<P, Q> AndKeepLeft<P, Q> {
    pub fn new(left: P, right: Q) -> Self {
        Self {
            id: NodeId::fresh(),
            left,
            right,
        }
    }
}

impl<P: Parser, Q: Parser> Parser for AndKeepLeft<P, Q> {
    type Output = P::Output;

    fn parse<'a>(&self, input: &'a str) -> ParseResult<'a, P::Output> {
        match sequence(&self.left, &self.right, input) {
            Ok((first, second)) => Ok(second.map(|_| first)),
            Err(error) => Err(error.within(self.label(), input)),
        }
    }

    fn id(&self) -> NodeId {
        self.id
    }

    fn label(&self) -> String {
        format!("andKeepLeft{}", self.id)
    }

    fn kind(&self, visited: &mut Visited) -> Node {
        let left = self.left.describe(visited);
        let right = self.right.describe(visited);
        Node::AndKeepLeft(Box::new(left), Box::new(right))
    }
}

#[derive(Clone, Copy)]
pub struct AndKeepRight<P, Q> {
    id: NodeId,
    left: P,
    right: Q,
}

impl<P, Q> AndKeepRight<P, Q> {
    pub fn new(left: P, right: Q) -> Self {
        Self {
            id: NodeId::fresh(),
            left,
            right,
        }
    }
}

impl<P: Parser, Q: Parser> Parser for AndKeepRight<P, Q> {
    type Output = Q::Output;

    fn parse<'a>(&self, input: &'a str) -> ParseResult<'a, Q::Output> {
        match sequence(&self.left, &self.right, input) {
            Ok((_, second)) => Ok(second),
            Err(error) => Err(error.within(self.label(), input)),
        }
    }

    fn id(&self) -> NodeId {
        self.id
    }

    fn label(&self) -> String {
        format!("andKeepRight{}", self.id)
    }

    fn kind(&self, visited: &mut Visited) -> Node {
        let left = self.left.describe(visited);
        let right = self.right.describe(visited);
        Node::AndKeepRight(Box::new(left), Box::new(right))
    }
}

/// Ordered choice.
///
/// Any failure of the first branch, including a grammar defect, moves on to the
/// second. When both fail, the reported error is the second branch's failure and
/// the first branch's details are dropped.
#[derive(Clone, Copy)]
pub struct Or<P, Q> {
    id: NodeId,
    left: P,
    right: Q,
}

impl<P, Q> Or<P, Q> {
    pub fn new(left: P, right: Q) -> Self {
        Self {
            id: NodeId::fresh(),
            left,
            right,
        }
    }
}

impl<T, P, Q> Parser for Or<P, Q>
where
    P: Parser<Output = T>,
    Q: Parser<Output = T>,
{
    type Output = T;

    fn parse<'a>(&self, input: &'a str) -> ParseResult<'a, T> {
        match self.left.parse(input) {
            Ok(parse) => Ok(parse),
            Err(_) => {
                log::trace!("{} falls back to {}", self.label(), self.right.label());
                self.right
                    .parse(input)
                    .map_err(|error| error.within(self.label(), input))
            }
        }
    }

    fn id(&self) -> NodeId {
        self.id
    }

    fn label(&self) -> String {
        format!("or{}", self.id)
    }

    fn kind(&self, visited: &mut Visited) -> Node {
        let left = self.left.describe(visited);
        let right = self.right.describe(visited);
        Node::Or(Box::new(left), Box::new(right))
    }
}

#[derive(Clone, Copy)]
pub struct Optional<P> {
    id: NodeId,
    parser: P,
}

impl<P> Optional<P> {
    pub fn new(parser: P) -> Self {
        Self {
            id: NodeId::fresh(),
            parser,
        }
    }
}

impl<T, P> Parser for Optional<P>
where
    P: Parser<Output = T>,
{
    type Output = Option<T>;

    fn parse<'a>(&self, input: &'a str) -> ParseResult<'a, Option<T>> {
        match self.parser.parse(input) {
            Ok(parse) => Ok(parse.map(Some)),
            Err(_) => Ok(PartialParse::new(None, input)),
        }
    }

    fn id(&self) -> NodeId {
        self.id
    }

    fn label(&self) -> String {
        format!("optional{}", self.id)
    }

    fn kind(&self, visited: &mut Visited) -> Node {
        Node::Optional(Box::new(self.parser.describe(visited)))
    }
}

/// Zero or more repetitions.
///
/// A repetition that succeeds without consuming anything is a grammar bug and
/// fails with [`DefinitionFault::ZeroProgress`].
#[derive(Clone, Copy)]
pub struct Star<P> {
    id: NodeId,
    parser: P,
}

impl<P> Star<P> {
    pub fn new(parser: P) -> Self {
        Self {
            id: NodeId::fresh(),
            parser,
        }
    }
}

impl<T, P> Star<P>
where
    P: Parser<Output = T>,
{
    /// Repeat until the inner parser fails, returning the collected parse and the
    /// failure that ended it.
    fn run<'a>(&self, input: &'a str) -> Result<(PartialParse<'a, Vec<T>>, ParseError), ParseError> {
        let mut values = Vec::new();
        let mut remaining = input;
        loop {
            match self.parser.parse(remaining) {
                Ok(parse) if parse.remaining.len() == remaining.len() => {
                    log::debug!("{} made no progress on {remaining:?}", self.label());
                    return Err(ParseError::definition(
                        self.label(),
                        remaining,
                        DefinitionFault::ZeroProgress,
                    ));
                }
                Ok(parse) => {
                    values.push(parse.output);
                    remaining = parse.remaining;
                }
                Err(error) => return Ok((PartialParse::new(values, remaining), error)),
            }
        }
    }
}

impl<T, P> Parser for Star<P>
where
    P: Parser<Output = T>,
{
    type Output = Vec<T>;

    fn parse<'a>(&self, input: &'a str) -> ParseResult<'a, Vec<T>> {
        self.run(input).map(|(parse, _)| parse)
    }

    fn id(&self) -> NodeId {
        self.id
    }

    fn label(&self) -> String {
        format!("star{}", self.id)
    }

    fn kind(&self, visited: &mut Visited) -> Node {
        Node::Star(Box::new(self.parser.describe(visited)))
    }

    /// Like the default, but the error names the failure that stopped the
    /// repetition short of the end.
    fn parse_all(&self, input: &str) -> Result<Vec<T>, ParseError> {
        let (PartialParse { output, remaining }, last) = self.run(input)?;
        if remaining.is_empty() {
            Ok(output)
        } else {
            Err(ParseError::unconsumed(
                self.label(),
                input,
                remaining,
                Some(last),
            ))
        }
    }
}

/// Exactly `count` repetitions.
#[derive(Clone, Copy)]
pub struct Repeat<P> {
    id: NodeId,
    parser: P,
    count: usize,
}

impl<P> Repeat<P> {
    pub fn new(parser: P, count: usize) -> Self {
        Self {
            id: NodeId::fresh(),
            parser,
            count,
        }
    }
}

impl<T, P> Parser for Repeat<P>
where
    P: Parser<Output = T>,
{
    type Output = Vec<T>;

    fn parse<'a>(&self, input: &'a str) -> ParseResult<'a, Vec<T>> {
        let mut values = Vec::with_capacity(self.count);
        let mut remaining = input;
        for _ in 0..self.count {
            let parse = self
                .parser
                .parse(remaining)
                .map_err(|error| error.within(self.label(), remaining))?;
            values.push(parse.output);
            remaining = parse.remaining;
        }
        Ok(PartialParse::new(values, remaining))
    }

    fn id(&self) -> NodeId {
        self.id
    }

    fn label(&self) -> String {
        format!("repeat{}", self.id)
    }

    fn kind(&self, visited: &mut Visited) -> Node {
        Node::Repeat {
            count: self.count,
            inner: Box::new(self.parser.describe(visited)),
        }
    }
}

/// A parser with a name, shown in place of its structure in error messages.
#[derive(Clone)]
pub struct Named<P> {
    id: NodeId,
    parser: P,
    name: String,
}

impl<P> Named<P> {
    pub fn new(parser: P, name: String) -> Self {
        Self {
            id: NodeId::fresh(),
            parser,
            name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T, P> Parser for Named<P>
where
    P: Parser<Output = T>,
{
    type Output = T;

    fn parse<'a>(&self, input: &'a str) -> ParseResult<'a, T> {
        self.parser
            .parse(input)
            .map_err(|error| error.within(self.label(), input))
    }

    fn id(&self) -> NodeId {
        self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }

    fn kind(&self, visited: &mut Visited) -> Node {
        Node::Named {
            name: self.name.clone(),
            inner: Box::new(self.parser.describe(visited)),
        }
    }
}
