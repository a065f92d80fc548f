use descent::{ErrorKind, ParseError, Parser, Repr};
use descent_csharp::*;

fn grammar() -> CSharpGrammar {
    CSharpGrammar::new().unwrap()
}

fn generic(name: &str, arguments: Vec<GenericArgument>) -> TypeRef {
    TypeRef::Generic {
        name: NamespacedName(name.split('.').map(Identifier::from).collect()),
        arguments,
    }
}

fn argument(variance: Option<Variance>, ty: TypeRef) -> GenericArgument {
    GenericArgument { variance, ty }
}

#[test]
fn plain_and_dotted_types() {
    let grammar = grammar();
    assert_eq!(grammar.parse_type("int").unwrap(), TypeRef::name(["int"]));
    assert_eq!(
        grammar.parse_type("System.String").unwrap(),
        TypeRef::name(["System", "String"])
    );
}

#[test]
fn generic_arguments_with_variance() {
    let ty = grammar().parse_type("Foo.Bar<In T, Out U>").unwrap();
    assert_eq!(
        ty,
        generic(
            "Foo.Bar",
            vec![
                argument(Some(Variance::In), TypeRef::name(["T"])),
                argument(Some(Variance::Out), TypeRef::name(["U"])),
            ]
        )
    );
    assert_eq!(ty.to_string(), "Foo.Bar<in T, out U>");
}

#[test]
fn nested_generics() {
    let ty = grammar()
        .parse_type("Dictionary<string, List<int>>")
        .unwrap();
    assert_eq!(
        ty,
        generic(
            "Dictionary",
            vec![
                argument(None, TypeRef::name(["string"])),
                argument(
                    None,
                    generic("List", vec![argument(None, TypeRef::name(["int"]))])
                ),
            ]
        )
    );
}

#[test]
fn named_tuple_elements() {
    let elements = grammar().parse_tuple("(int a, string b)").unwrap();
    assert_eq!(
        elements,
        vec![
            TupleElement {
                ty: TypeRef::name(["int"]),
                name: Some(Identifier::from("a")),
            },
            TupleElement {
                ty: TypeRef::name(["string"]),
                name: Some(Identifier::from("b")),
            },
        ]
    );
}

#[test]
fn tuples_nest_inside_generics_and_tuples() {
    let grammar = grammar();
    let ty = grammar
        .parse_type("(List<(int x, int y)> points, string)")
        .unwrap();
    assert_eq!(ty.to_string(), "(List<(int x, int y)> points, string)");

    let nested = grammar.parse_type("((a),(b))").unwrap();
    let one = |name: &str| TypeRef::Tuple(vec![TupleElement {
        ty: TypeRef::name([name]),
        name: None,
    }]);
    assert_eq!(
        nested,
        TypeRef::Tuple(vec![
            TupleElement { ty: one("a"), name: None },
            TupleElement { ty: one("b"), name: None },
        ])
    );
}

#[test]
fn array_suffixes() {
    let grammar = grammar();
    let expected = TypeRef::Array(Box::new(TypeRef::Array(Box::new(TypeRef::name(["int"])))));
    assert_eq!(grammar.parse_type("int[][]").unwrap(), expected);
    assert_eq!(grammar.parse_type("int [ ] []").unwrap(), expected);
    assert_eq!(
        grammar.parse_type("List<string[]>[]").unwrap().to_string(),
        "List<string[]>[]"
    );
}

#[test]
fn using_directives() {
    let grammar = grammar();
    assert_eq!(
        grammar.parse_using("using System.Text;").unwrap(),
        UsingDirective::Namespace(NamespacedName(vec!["System".into(), "Text".into()]))
    );
    assert_eq!(
        grammar.parse_using("using Map = Dictionary<string, int>;").unwrap(),
        UsingDirective::Alias {
            alias: Identifier::from("Map"),
            target: generic(
                "Dictionary",
                vec![
                    argument(None, TypeRef::name(["string"])),
                    argument(None, TypeRef::name(["int"])),
                ]
            ),
        }
    );
}

#[test]
fn using_block() {
    let source = "
        using System;
        using System.Collections.Generic;
        using Pair = (int left, int right);
    ";
    let usings = grammar().parse_usings(source).unwrap();
    assert_eq!(usings.len(), 3);
    assert!(matches!(&usings[2], UsingDirective::Alias { alias, .. } if alias.as_str() == "Pair"));
    assert!(grammar().parse_usings("").unwrap().is_empty());
}

#[test]
fn trailing_text_is_reported() {
    let error = grammar().parse_type("Foo bar").unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Match);
    assert!(matches!(error, ParseError::Unconsumed { ref remaining, .. } if remaining == " bar"));
}

#[test]
fn malformed_input_is_a_match_error() {
    let grammar = grammar();
    for source in ["(int a,)", "Foo<int", "<>", "int[", "using ;"] {
        let error = grammar
            .parse_type(source)
            .or_else(|_| grammar.parse_using(source).map(|_| TypeRef::name(["_"])))
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Match, "{source}");
    }
}

#[test]
fn missing_using_semicolon_points_at_the_end() {
    let error = grammar().parse_using("using System").unwrap_err();
    assert_eq!(error.root_cause().grammar(), "\";\"");
    assert_eq!(error.root_cause().input(), "");
}

#[test]
fn recursive_type_displays_finitely() {
    let grammar = grammar();
    let root = grammar.type_ref().force().unwrap().id();

    let repr = grammar.type_ref().display();
    assert_eq!(repr.id(), root);
    assert!(repr.is_well_formed());

    let mut expansions = 0;
    let mut back_refs = 0;
    repr.walk(&mut |entry| match entry {
        Repr::Expanded { id, .. } if *id == root => expansions += 1,
        Repr::BackRef { id } if *id == root => back_refs += 1,
        _ => {}
    });
    assert_eq!(expansions, 1);
    // Once through the tuple element and once through the generic argument.
    assert_eq!(back_refs, 2);

    let json: serde_json::Value = serde_json::from_str(&repr.to_string()).unwrap();
    assert_eq!(json["newRef"], serde_json::json!(root));
    assert!(json.to_string().contains("\"generic arguments\""));
}
