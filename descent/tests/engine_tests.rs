use std::rc::Rc;

use descent::*;

#[test]
fn or_picks_matching_branch() {
    let parse = literal("a").or(literal("b")).parse("b").unwrap();
    assert_eq!(parse.output, "b");
    assert_eq!(parse.remaining, "");
}

#[test]
fn and_with_lazy_second() {
    let arena = Arena::new();
    let parser = literal("a").and(lazy(&arena, || literal("b")));

    let parse = parser.parse("ab").unwrap();
    assert_eq!(parse.output, ("a".to_owned(), "b".to_owned()));
    assert_eq!(parse.remaining, "");

    let error = parser.parse("ac").unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Match);
}

#[test]
fn star_of_always_succeeding_parser_does_not_hang() {
    let empty = literal("").map(|_| ());
    let error = empty.star().parse("anything").unwrap_err();
    assert_eq!(error.fault(), Some(DefinitionFault::ZeroProgress));
}

#[test]
fn star_matching_nothing_is_empty_success() {
    let parse = literal("a").star().parse("").unwrap();
    assert!(parse.output.is_empty());
    assert_eq!(parse.remaining, "");
}

/// `tuple = "(" item ("," item)* ")"`, `item = word | tuple`.
fn tuples(arena: &Rc<Arena>) -> Lazy<String> {
    let tuple: Lazy<String> = Lazy::declare(arena);
    let item = pattern("[a-z]+").unwrap().or(tuple.clone()).named("item");
    let body = item
        .clone()
        .and(literal(",").and_keep_right(item).star())
        .map(|(first, rest)| {
            let mut items = vec![first];
            items.extend(rest);
            items.join(",")
        });
    tuple
        .define(
            literal("(")
                .and_keep_right(body)
                .and_keep_left(literal(")"))
                .map(|inner| format!("({inner})")),
        )
        .unwrap();
    tuple
}

#[test]
fn recursive_grammar_parses_nested_input() {
    let arena = Arena::new();
    let tuple = tuples(&arena);
    assert_eq!(tuple.parse_all("((a),(b))").unwrap(), "((a),(b))");
    assert_eq!(tuple.parse_all("(a,(b,(c)))").unwrap(), "(a,(b,(c)))");
    assert!(tuple.parse_all("((a),(b)").is_err());
}

#[test]
fn recursive_grammar_displays_finitely() {
    let arena = Arena::new();
    let tuple = tuples(&arena);
    let root = tuple.force().unwrap().id();

    let repr = tuple.display();
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
    // `item` is shared by both positions of the body, so the cycle back to the
    // tuple is only reached once.
    assert_eq!(back_refs, 1);
}

/// `expr = "(" expr ")" | "[" expr "]" | "x"`, which refers to itself from two places.
fn brackets(arena: &Rc<Arena>) -> Lazy<String> {
    let expr: Lazy<String> = Lazy::declare(arena);
    let round = literal("(")
        .and_keep_right(expr.clone())
        .and_keep_left(literal(")"));
    let square = literal("[")
        .and_keep_right(expr.clone())
        .and_keep_left(literal("]"));
    expr.define(round.or(square).or(literal("x"))).unwrap();
    expr
}

#[test]
fn every_reference_to_a_recursive_rule_is_a_back_ref() {
    let arena = Arena::new();
    let expr = brackets(&arena);
    assert_eq!(expr.parse_all("([(x)])").unwrap(), "x");

    let root = expr.force().unwrap().id();
    let repr = expr.display();
    assert!(repr.is_well_formed());

    let mut expansions = 0;
    let mut back_refs = 0;
    repr.walk(&mut |entry| match entry {
        Repr::Expanded { id, .. } if *id == root => expansions += 1,
        Repr::BackRef { id } if *id == root => back_refs += 1,
        _ => {}
    });
    assert_eq!(expansions, 1);
    assert_eq!(back_refs, 2);
}

#[test]
fn display_is_json_with_refs() {
    let arena = Arena::new();
    let tuple = tuples(&arena);
    let json: serde_json::Value = serde_json::from_str(&tuple.display().to_string()).unwrap();
    assert!(json.get("newRef").is_some());
    assert!(json["value"].get("map").is_some());
    let text = json.to_string();
    assert!(text.contains("\"oldRef\""));
    assert!(text.contains("\"named\""));
    assert!(text.contains("\"pattern\":\"[a-z]+\""));
}

#[test]
fn error_chain_reaches_innermost_rule() {
    let arena = Arena::new();
    let tuple = tuples(&arena);
    let error = tuple.parse("(a;b)").unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Match);
    assert_eq!(error.root_cause().grammar(), "\")\"");
    assert_eq!(error.root_cause().input(), ";b)");
}
