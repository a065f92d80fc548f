//! Errors produced while building and running parsers.
//!
//! Parse failures are plain values: every parser returns a [`ParseResult`] and
//! every combinator decides whether to recover from its children's failures or to
//! pass them on. There are two kinds of failure, see [`ErrorKind`].
//!
//! [`ParseResult`]: crate::ParseResult

use thiserror::Error;

use crate::parser::NodeId;

/// The two kinds of parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The expected input shape was not found. Recoverable by the caller.
    Match,
    /// The grammar itself is broken. Never recovered from.
    Definition,
}

/// A defect in how a grammar was put together, detected while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum DefinitionFault {
    /// A repeated parser succeeded without consuming anything.
    #[error("infinite match")]
    ZeroProgress,
    /// A recursive rule was declared but never defined.
    #[error("undefined recursive rule")]
    Undefined,
    /// A recursive rule was needed while it was still being built.
    #[error("recursive rule forced during its own construction")]
    Reentrant,
    /// The arena owning a recursive rule no longer exists.
    #[error("grammar arena dropped")]
    Detached,
}

/// An error that occurred during parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A parser could not match at the start of `input`.
    #[error("could not parse {input:?} using {grammar}")]
    Mismatch {
        /// Description of the rule that failed.
        grammar: String,
        /// The start of the input the rule was given.
        input: String,
        /// The failure of a sub-rule, if this rule is a composite.
        #[source]
        cause: Option<Box<ParseError>>,
    },
    /// A parse succeeded but did not consume the whole input.
    #[error("{remaining:?} remained when parsing {input:?} using {grammar}")]
    Unconsumed {
        /// Description of the top-level rule.
        grammar: String,
        /// The start of the complete input.
        input: String,
        /// The trailing text that was left over.
        remaining: String,
        /// The failure that stopped the parse early, when one is known.
        #[source]
        cause: Option<Box<ParseError>>,
    },
    /// The grammar is malformed.
    #[error("{fault} while parsing {input:?} using {grammar}")]
    Definition {
        /// Description of the rule that exposed the defect.
        grammar: String,
        /// The input that triggered it.
        input: String,
        /// What is wrong with the grammar.
        fault: DefinitionFault,
    },
}

/// Errors keep at most this many characters of the input they were given.
const INPUT_PREVIEW: usize = 64;

fn preview(input: &str) -> String {
    match input.char_indices().nth(INPUT_PREVIEW) {
        Some((end, _)) => input[..end].to_owned(),
        None => input.to_owned(),
    }
}

impl ParseError {
    pub(crate) fn mismatch(grammar: String, input: &str) -> Self {
        ParseError::Mismatch {
            grammar,
            input: preview(input),
            cause: None,
        }
    }

    pub(crate) fn definition(grammar: String, input: &str, fault: DefinitionFault) -> Self {
        ParseError::Definition {
            grammar,
            input: preview(input),
            fault,
        }
    }

    pub(crate) fn unconsumed(
        grammar: String,
        input: &str,
        remaining: &str,
        cause: Option<ParseError>,
    ) -> Self {
        ParseError::Unconsumed {
            grammar,
            input: preview(input),
            remaining: remaining.to_owned(),
            cause: cause.map(Box::new),
        }
    }

    /// Wrap a match failure with the context of the composite rule that saw it.
    ///
    /// Definition errors are returned unchanged.
    pub(crate) fn within(self, grammar: String, input: &str) -> Self {
        if self.is_definition() {
            return self;
        }
        ParseError::Mismatch {
            grammar,
            input: preview(input),
            cause: Some(Box::new(self)),
        }
    }

    /// Which of the two failure kinds this is.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::Mismatch { .. } | ParseError::Unconsumed { .. } => ErrorKind::Match,
            ParseError::Definition { .. } => ErrorKind::Definition,
        }
    }

    /// Whether this error is a grammar defect rather than unexpected input.
    pub fn is_definition(&self) -> bool {
        self.kind() == ErrorKind::Definition
    }

    /// The description of the rule that reported this error.
    pub fn grammar(&self) -> &str {
        match self {
            ParseError::Mismatch { grammar, .. }
            | ParseError::Unconsumed { grammar, .. }
            | ParseError::Definition { grammar, .. } => grammar,
        }
    }

    /// The start of the input slice the failing rule was given, at most
    /// 64 characters.
    pub fn input(&self) -> &str {
        match self {
            ParseError::Mismatch { input, .. }
            | ParseError::Unconsumed { input, .. }
            | ParseError::Definition { input, .. } => input,
        }
    }

    /// The next error in the diagnostic chain.
    pub fn cause(&self) -> Option<&ParseError> {
        match self {
            ParseError::Mismatch { cause, .. } | ParseError::Unconsumed { cause, .. } => {
                cause.as_deref()
            }
            ParseError::Definition { .. } => None,
        }
    }

    /// The innermost error of the chain.
    pub fn root_cause(&self) -> &ParseError {
        let mut error = self;
        while let Some(cause) = error.cause() {
            error = cause;
        }
        error
    }

    /// The grammar defect, if this is a definition error.
    pub fn fault(&self) -> Option<DefinitionFault> {
        match self {
            ParseError::Definition { fault, .. } => Some(*fault),
            _ => None,
        }
    }
}

/// An error raised while constructing a grammar.
#[derive(Debug, Error)]
pub enum GrammarError {
    /// The pattern is not valid regular expression syntax.
    #[error("invalid pattern {pattern:?}")]
    Syntax {
        pattern: String,
        #[source]
        source: Box<regex_syntax::Error>,
    },
    /// The pattern parsed but could not be compiled.
    #[error("could not compile pattern {pattern:?}")]
    Build {
        pattern: String,
        #[source]
        source: Box<regex_automata::meta::BuildError>,
    },
    /// A recursive rule was given a second definition.
    #[error("recursive rule {0} is already defined")]
    AlreadyDefined(NodeId),
    /// The arena owning a recursive rule no longer exists.
    #[error("grammar arena dropped")]
    Detached,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> ParseError {
        ParseError::mismatch("\"b\"".to_owned(), "c")
            .within("and#2".to_owned(), "ac")
            .within("named".to_owned(), "ac")
    }

    #[test]
    fn root_cause_walks_to_innermost() {
        let error = chain();
        assert_eq!(error.grammar(), "named");
        assert_eq!(error.root_cause().grammar(), "\"b\"");
        assert_eq!(error.root_cause().input(), "c");
    }

    #[test]
    fn source_follows_cause() {
        use std::error::Error as _;

        let error = chain();
        let source = error.source().map(|source| source.to_string());
        assert_eq!(
            source.as_deref(),
            Some("could not parse \"ac\" using and#2")
        );
    }

    #[test]
    fn long_input_is_cut_to_a_preview() {
        let input = "é".repeat(1000);
        let error = ParseError::mismatch("\"a\"".to_owned(), &input)
            .within("and#4".to_owned(), &input);
        assert_eq!(error.input().chars().count(), INPUT_PREVIEW);
        assert!(input.starts_with(error.input()));
        assert_eq!(error.root_cause().input().chars().count(), INPUT_PREVIEW);

        let error = ParseError::unconsumed("star#5".to_owned(), &input, "é", None);
        assert_eq!(error.input().chars().count(), INPUT_PREVIEW);
        assert!(matches!(error, ParseError::Unconsumed { ref remaining, .. } if remaining == "é"));
    }

    #[test]
    fn definition_errors_are_not_wrapped() {
        let error = ParseError::definition("star#1".to_owned(), "x", DefinitionFault::ZeroProgress)
            .within("and#3".to_owned(), "yx");
        assert_eq!(error.kind(), ErrorKind::Definition);
        assert_eq!(error.fault(), Some(DefinitionFault::ZeroProgress));
        assert_eq!(error.grammar(), "star#1");
        assert_eq!(
            error.to_string(),
            "infinite match while parsing \"x\" using star#1"
        );
    }
}
