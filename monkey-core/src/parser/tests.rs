use pretty_assertions::assert_eq;

use crate::{
    lexer::prelude::{Lexer, LexicalErrorType, Token},
    parser::prelude::{
        parse_program, Expression, Node, ParseError, ParseErrorType, Parser, Primitive, Statement,
        MAX_NESTING_DEPTH
    },
    utils::prelude::SrcSpan
};

fn assert_parses_as(input: &str, expected: &str) -> Result<(), ParseError> {
    let program = parse_program(input)?;

    assert_eq!(program.to_string(), expected, "input: {input}");

    Ok(())
}

fn parse_fails(input: &str) -> ParseErrorType {
    match parse_program(input) {
        Ok(program) => panic!("expected {input:?} to fail, parsed {program}"),
        Err(err) => err.error
    }
}

#[test]
fn test_precedence() -> Result<(), ParseError> {
    let cases = [
        ("1 + 2 * 3 - 4", "((1 + (2 * 3)) - 4)"),
        ("1 + 2 + 3", "((1 + 2) + 3)"),
        ("1 * 2 / 3", "((1 * 2) / 3)"),
        ("1 + 2 < 3 * 4", "((1 + 2) < (3 * 4))"),
        ("1 < 2 == true", "((1 < 2) == true)"),
        ("(1 + 2) * 3", "((1 + 2) * 3)"),
        ("1 + -2 + +3 - -4", "(((1 + (-2)) + (+3)) - (-4))"),
        ("!true == false", "((!true) == false)"),
        ("-a * b", "((-a) * b)"),
        ("-f(x)", "(-f(x))"),
        ("a + b[0] * c", "(a + ((b[0]) * c))"),
    ];

    for (input, expected) in cases {
        assert_parses_as(input, expected)?;
    }

    Ok(())
}

#[test]
fn test_postfix_chains() -> Result<(), ParseError> {
    assert_parses_as("f(x)[0](y)", "(f(x)[0])(y)")?;
    assert_parses_as("m[\"a\"][1]", "((m[\"a\"])[1])")?;
    assert_parses_as("fn(x) { x }(1)", "fn(x) { x }(1)")?;
    assert_parses_as("add(1, 2 * 3, g(4))", "add(1, (2 * 3), g(4))")
}

#[test]
fn test_assignment() -> Result<(), ParseError> {
    assert_parses_as("x = 1 + 2", "(x = (1 + 2))")?;
    assert_parses_as("x = y = 3", "(x = (y = 3))")?;
    assert_parses_as("a[0] = b == c", "((a[0]) = (b == c))")?;
    // the target is only checked when evaluated
    assert_parses_as("1 = 2", "(1 = 2)")
}

#[test]
fn test_literals() -> Result<(), ParseError> {
    assert_parses_as("[]", "[]")?;
    assert_parses_as("[1, \"two\", true]", "[1, \"two\", true]")?;
    assert_parses_as("{}", "{}")?;
    assert_parses_as("{1: 2, \"a\": [3]}", "{1: 2, \"a\": [3]}")?;
    assert_parses_as("fn() { }", "fn() { }")?;
    assert_parses_as("fn(a, b) { return a + b; }", "fn(a, b) { return (a + b) }")
}

#[test]
fn test_statements() -> Result<(), ParseError> {
    assert_parses_as("let x = 5; x", "let x = 5; x")?;
    assert_parses_as("return;", "return")?;
    assert_parses_as(
        "if (x < 1) { let y = 2; y } else { return 3 }",
        "if (x < 1) { let y = 2; y } else { return 3 }"
    )?;
    assert_parses_as(
        "if (a) { 1 } else if (b) { 2 } else { 3 }",
        "if a { 1 } else { if b { 2 } else { 3 } }"
    )?;
    assert_parses_as("if (a) { 1 } let b = 2", "if a { 1 }; let b = 2")
}

#[test]
fn test_node_kinds() -> Result<(), ParseError> {
    let program = parse_program("let a = 1; return a; if (a) { }; a; 5")?;

    assert!(matches!(program.nodes[0], Node::Statement(Statement::Let(_))));
    assert!(matches!(program.nodes[1], Node::Statement(Statement::Return(_))));
    assert!(matches!(program.nodes[2], Node::Statement(Statement::If(_))));
    assert!(matches!(program.nodes[3], Node::Expression(Expression::Identifier(_))));
    assert!(matches!(
        program.nodes[4],
        Node::Expression(Expression::Primitive(Primitive::Int { value: 5, .. }))
    ));

    Ok(())
}

#[test]
fn test_next_node() -> Result<(), ParseError> {
    let input = ";; let x = 1;; x + 1 // trailing comment";
    let mut parser = Parser::new(Lexer::new(input.char_indices().map(|(i, c)| (i as u32, c))));

    let first = parser.next_node()?.map(|node| node.to_string());
    let second = parser.next_node()?.map(|node| node.to_string());

    assert_eq!(first.as_deref(), Some("let x = 1"));
    assert_eq!(second.as_deref(), Some("(x + 1)"));
    assert_eq!(parser.next_node()?, None);
    assert_eq!(parser.next_node()?, None);
    assert_eq!(parser.comments, vec![SrcSpan { start: 21, end: 40 }]);

    Ok(())
}

#[test]
fn test_locations() -> Result<(), ParseError> {
    let program = parse_program("let total = a + b * 2")?;

    assert_eq!(program.nodes[0].location(), SrcSpan { start: 0, end: 21 });

    match &program.nodes[0] {
        Node::Statement(Statement::Let(let_)) => {
            assert_eq!(let_.name.location, SrcSpan { start: 4, end: 9 });
            assert_eq!(let_.value.location(), SrcSpan { start: 12, end: 21 });
        },
        node => panic!("expected let, got {node}")
    }

    Ok(())
}

#[test]
fn test_errors() {
    assert_eq!(parse_fails("let = 5"), ParseErrorType::ExpectedIdent);
    assert_eq!(parse_fails("let x 5"), ParseErrorType::UnexpectedToken {
        token: Token::Int(5),
        expected: vec!["=".into()]
    });
    assert_eq!(parse_fails("1 +"), ParseErrorType::UnexpectedEof);
    assert_eq!(parse_fails("(1 + 2"), ParseErrorType::UnexpectedEof);
    assert_eq!(parse_fails("1 2"), ParseErrorType::MissingSemicolon);
    assert_eq!(parse_fails(")"), ParseErrorType::ExpectedExpression { token: Token::RParen });
    assert_eq!(parse_fails("fn(1) { }"), ParseErrorType::ExpectedIdent);
    assert_eq!(parse_fails("if (true) { 1"), ParseErrorType::UnexpectedEof);
    assert_eq!(parse_fails("{1 2}"), ParseErrorType::UnexpectedToken {
        token: Token::Int(2),
        expected: vec![":".into()]
    });

    match parse_fails("let x = #") {
        ParseErrorType::LexError { error } => {
            assert_eq!(error.error, LexicalErrorType::UnrecognizedToken { tok: '#' })
        },
        other => panic!("expected lexical error, got {other:?}")
    }
}

fn nested_arrays(depth: usize) -> String {
    format!("len({}{})", "[".repeat(depth), "]".repeat(depth))
}

#[test]
fn test_nesting_limit() -> Result<(), ParseError> {
    let too_deep = ParseErrorType::NestingTooDeep { limit: MAX_NESTING_DEPTH };

    parse_program(&nested_arrays(500))?;

    assert_eq!(parse_fails(&nested_arrays(100_000)), too_deep);
    assert_eq!(parse_fails(&format!("{}1", "-".repeat(100_000))), too_deep);
    assert_eq!(parse_fails(&format!("1{}", " + 1".repeat(100_000))), too_deep);
    assert_eq!(
        parse_fails(&format!("{}1{}", "if (true) { ".repeat(5_000), " }".repeat(5_000))),
        too_deep
    );

    match parse_program(&nested_arrays(5_000)) {
        Err(err) => {
            assert_eq!(err.error, too_deep);
            assert_eq!(err.span, SrcSpan { start: 1_002, end: 1_003 });
        },
        Ok(_) => panic!("expected nesting error")
    }

    Ok(())
}
