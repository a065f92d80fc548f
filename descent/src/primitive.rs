//! Primitive matchers: literal strings and anchored patterns.

use regex_automata::{meta::Regex, Anchored, Input};

use crate::{
    error::{GrammarError, ParseError},
    parser::{NodeId, ParseResult, Parser, PartialParse, Visited},
    repr::Node,
};

/// Matches a fixed string at the start of the input.
#[derive(Debug, Clone)]
pub struct Literal {
    id: NodeId,
    literal: String,
}

impl Literal {
    pub fn new(literal: impl Into<String>) -> Self {
        Self {
            id: NodeId::fresh(),
            literal: literal.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.literal
    }
}

/// Match `literal` exactly, byte for byte.
pub fn literal(literal: impl Into<String>) -> Literal {
    Literal::new(literal)
}

impl Parser for Literal {
    type Output = String;

    fn parse<'a>(&self, input: &'a str) -> ParseResult<'a, String> {
        match input.strip_prefix(self.literal.as_str()) {
            Some(remaining) => Ok(PartialParse::new(self.literal.clone(), remaining)),
            None => Err(ParseError::mismatch(self.label(), input)),
        }
    }

    fn id(&self) -> NodeId {
        self.id
    }

    fn label(&self) -> String {
        format!("{:?}", self.literal)
    }

    fn kind(&self, _: &mut Visited) -> Node {
        Node::Literal(self.literal.clone())
    }
}

/// Options for compiling a [`Pattern`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternOptions {
    /// `^` and `$` match at line boundaries.
    pub multi_line: bool,
    /// Letters match regardless of case.
    pub case_insensitive: bool,
}

impl Default for PatternOptions {
    fn default() -> Self {
        Self {
            multi_line: true,
            case_insensitive: false,
        }
    }
}

/// Matches a regular expression anchored at the start of the input.
///
/// The match never starts later in the input: a pattern that only matches after
/// some leading text fails.
#[derive(Debug, Clone)]
pub struct Pattern {
    id: NodeId,
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(pattern: &str) -> Result<Self, GrammarError> {
        Self::with_options(pattern, PatternOptions::default())
    }

    pub fn with_options(pattern: &str, options: PatternOptions) -> Result<Self, GrammarError> {
        let hir = regex_syntax::ParserBuilder::new()
            .multi_line(options.multi_line)
            .case_insensitive(options.case_insensitive)
            .build()
            .parse(pattern)
            .map_err(|source| GrammarError::Syntax {
                pattern: pattern.to_owned(),
                source: Box::new(source),
            })?;
        if hir.properties().minimum_len() == Some(0) {
            log::debug!("pattern {pattern:?} can match the empty string");
        }
        let regex = Regex::builder()
            .build_from_hir(&hir)
            .map_err(|source| GrammarError::Build {
                pattern: pattern.to_owned(),
                source: Box::new(source),
            })?;
        Ok(Self {
            id: NodeId::fresh(),
            source: pattern.to_owned(),
            regex,
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// Match the regular expression `pattern` at the start of the input.
pub fn pattern(pattern: &str) -> Result<Pattern, GrammarError> {
    Pattern::new(pattern)
}

/// Like [`pattern`], with explicit compile options.
pub fn pattern_with(pattern: &str, options: PatternOptions) -> Result<Pattern, GrammarError> {
    Pattern::with_options(pattern, options)
}

impl Parser for Pattern {
    type Output = String;

    fn parse<'a>(&self, input: &'a str) -> ParseResult<'a, String> {
        let search = Input::new(input).anchored(Anchored::Yes);
        match self.regex.search_half(&search) {
            Some(end) => {
                let (matched, remaining) = input.split_at(end.offset());
                Ok(PartialParse::new(matched.to_owned(), remaining))
            }
            None => Err(ParseError::mismatch(self.label(), input)),
        }
    }

    fn id(&self) -> NodeId {
        self.id
    }

    fn label(&self) -> String {
        format!("/{}/", self.source)
    }

    fn kind(&self, _: &mut Visited) -> Node {
        Node::Pattern(self.source.clone())
    }
}
