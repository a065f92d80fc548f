use std::rc::Rc;

use descent::{
    combinator::{Named, Optional},
    literal, pattern, pattern_with, Arena, BoxedParser, GrammarError, Lazy, ParseError, Parser,
    ParserExt, Pattern, PatternOptions,
};

use crate::ast::{
    GenericArgument, Identifier, NamespacedName, TupleElement, TypeRef, UsingDirective, Variance,
};

/// Optional whitespace between tokens.
type Gap = Optional<Named<Pattern>>;

/// `open item ("," item)* close`, with optional whitespace around every token.
fn delimited_list<P>(
    open: &str,
    item: P,
    close: &str,
    gap: Gap,
) -> impl Parser<Output = Vec<P::Output>> + Clone
where
    P: Parser + Clone,
{
    let rest = gap
        .clone()
        .and_keep_right(literal(","))
        .and_keep_right(gap.clone())
        .and_keep_right(item.clone())
        .star();
    literal(open)
        .and_keep_right(gap.clone())
        .and_keep_right(item)
        .and(rest)
        .and_keep_left(gap)
        .and_keep_left(literal(close))
        .map(|(first, rest)| {
            let mut items = vec![first];
            items.extend(rest);
            items
        })
}

/// A fragment of C# syntax: type names, generic argument lists, tuple types and
/// `using` directives.
///
/// ```text
/// identifier      = [A-Za-z_][A-Za-z0-9_]*
/// namespaced name = (identifier ".")* identifier
/// type            = (tuple | namespaced name generic arguments?) ("[" "]")*
/// generic args    = "<" argument ("," argument)* ">"
/// argument        = ("in" | "out")? type
/// tuple           = "(" element ("," element)* ")"
/// element         = type identifier?
/// using           = "using" (identifier "=" type | namespaced name) ";"
/// ```
///
/// `type` is recursive through both generic arguments and tuples.
pub struct CSharpGrammar {
    /// Owns the recursive rules.
    _arena: Rc<Arena>,
    identifier: BoxedParser<Identifier>,
    namespaced_name: BoxedParser<NamespacedName>,
    type_ref: Lazy<TypeRef>,
    generic_arguments: Lazy<Vec<GenericArgument>>,
    tuple: BoxedParser<Vec<TupleElement>>,
    using: BoxedParser<UsingDirective>,
    usings: BoxedParser<Vec<UsingDirective>>,
}

impl CSharpGrammar {
    pub fn new() -> Result<Self, GrammarError> {
        let arena = Arena::new();

        let spaces = pattern(r"\s+")?.named("spaces");
        let gap: Gap = spaces.clone().optional();

        let identifier = pattern("[A-Za-z_][A-Za-z0-9_]*")?
            .map(Identifier)
            .named("identifier")
            .boxed();

        let namespaced_name = identifier
            .clone()
            .and_keep_left(gap.clone())
            .and_keep_left(literal("."))
            .and_keep_left(gap.clone())
            .star()
            .and(identifier.clone())
            .map(|(mut segments, last)| {
                segments.push(last);
                NamespacedName(segments)
            })
            .named("namespaced name")
            .boxed();

        let type_ref: Lazy<TypeRef> = Lazy::declare(&arena);

        let variance = pattern_with(
            "in|out",
            PatternOptions {
                case_insensitive: true,
                ..PatternOptions::default()
            },
        )?
        .and_keep_left(spaces.clone())
        .map(|keyword| {
            if keyword.eq_ignore_ascii_case("in") {
                Variance::In
            } else {
                Variance::Out
            }
        })
        .named("variance");

        let argument = variance
            .optional()
            .and(type_ref.clone())
            .map(|(variance, ty)| GenericArgument { variance, ty })
            .named("generic argument");
        let generic_arguments = Lazy::new(&arena, {
            let gap = gap.clone();
            move || delimited_list("<", argument, ">", gap).named("generic arguments")
        });

        let element = type_ref
            .clone()
            .and(spaces.clone().and_keep_right(identifier.clone()).optional())
            .map(|(ty, name)| TupleElement { ty, name })
            .named("tuple element");
        let tuple = delimited_list("(", element, ")", gap.clone())
            .named("tuple")
            .boxed();

        let named_type = namespaced_name
            .clone()
            .and(
                gap.clone()
                    .and_keep_right(generic_arguments.clone())
                    .optional(),
            )
            .map(|(name, arguments)| match arguments {
                Some(arguments) => TypeRef::Generic { name, arguments },
                None => TypeRef::Name(name),
            });
        let array_suffix = gap
            .clone()
            .and_keep_right(literal("["))
            .and_keep_right(gap.clone())
            .and_keep_right(literal("]"));
        type_ref.define(
            tuple
                .clone()
                .map(TypeRef::Tuple)
                .or(named_type)
                .and(array_suffix.star())
                .map(|(ty, arrays)| {
                    arrays
                        .into_iter()
                        .fold(ty, |ty, _| TypeRef::Array(Box::new(ty)))
                })
                .named("type"),
        )?;

        let alias = identifier
            .clone()
            .and_keep_left(gap.clone())
            .and_keep_left(literal("="))
            .and_keep_left(gap.clone())
            .and(type_ref.clone())
            .map(|(alias, target)| UsingDirective::Alias { alias, target });
        let using = literal("using")
            .and_keep_left(spaces)
            .and_keep_right(alias.or(namespaced_name.clone().map(UsingDirective::Namespace)))
            .and_keep_left(gap.clone())
            .and_keep_left(literal(";"))
            .named("using directive")
            .boxed();
        let usings = gap
            .clone()
            .and_keep_right(using.clone().and_keep_left(gap).star())
            .boxed();

        log::debug!("built C# grammar with {} recursive rules", arena.len());

        Ok(Self {
            _arena: arena,
            identifier,
            namespaced_name,
            type_ref,
            generic_arguments,
            tuple,
            using,
            usings,
        })
    }

    pub fn identifier(&self) -> &BoxedParser<Identifier> {
        &self.identifier
    }

    pub fn namespaced_name(&self) -> &BoxedParser<NamespacedName> {
        &self.namespaced_name
    }

    pub fn type_ref(&self) -> &Lazy<TypeRef> {
        &self.type_ref
    }

    pub fn generic_arguments(&self) -> &Lazy<Vec<GenericArgument>> {
        &self.generic_arguments
    }

    pub fn tuple(&self) -> &BoxedParser<Vec<TupleElement>> {
        &self.tuple
    }

    pub fn using(&self) -> &BoxedParser<UsingDirective> {
        &self.using
    }

    /// Parse a complete type, such as `Dictionary<string, (int a, int b)>[]`.
    pub fn parse_type(&self, source: &str) -> Result<TypeRef, ParseError> {
        self.type_ref.parse_all(source)
    }

    pub fn parse_namespaced_name(&self, source: &str) -> Result<NamespacedName, ParseError> {
        self.namespaced_name.parse_all(source)
    }

    pub fn parse_generic_arguments(&self, source: &str) -> Result<Vec<GenericArgument>, ParseError> {
        self.generic_arguments.parse_all(source)
    }

    pub fn parse_tuple(&self, source: &str) -> Result<Vec<TupleElement>, ParseError> {
        self.tuple.parse_all(source)
    }

    pub fn parse_using(&self, source: &str) -> Result<UsingDirective, ParseError> {
        self.using.parse_all(source)
    }

    /// Parse a block of `using` directives separated by whitespace.
    pub fn parse_usings(&self, source: &str) -> Result<Vec<UsingDirective>, ParseError> {
        self.usings.parse_all(source)
    }
}
