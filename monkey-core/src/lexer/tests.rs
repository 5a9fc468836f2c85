use pretty_assertions::assert_eq;

use super::prelude::{Lexer, LexicalError, LexicalErrorType, Token};

fn tokens(input: &str) -> Result<Vec<Token>, LexicalError> {
    let lexer = Lexer::new(input.char_indices().map(|(i, c)| (i as u32, c)));
    let mut tokens = vec![];

    for res in lexer {
        let (_, token, _) = res?;

        if token == Token::Eof {
            break;
        }

        tokens.push(token);
    }

    Ok(tokens)
}

#[test]
fn test_operators_and_delimiters() -> Result<(), LexicalError> {
    let input = "+ - * / = == != ! < > ( ) { } [ ] , : ;";

    assert_eq!(tokens(input)?, vec![
        Token::Plus,
        Token::Minus,
        Token::Asterisk,
        Token::Slash,
        Token::Assign,
        Token::Equal,
        Token::NotEqual,
        Token::Bang,
        Token::LessThan,
        Token::GreaterThan,
        Token::LParen,
        Token::RParen,
        Token::LBrace,
        Token::RBrace,
        Token::LBracket,
        Token::RBracket,
        Token::Comma,
        Token::Colon,
        Token::Semicolon,
    ]);

    Ok(())
}

#[test]
fn test_keywords_and_identifiers() -> Result<(), LexicalError> {
    let input = r#"
        let add = fn(x, y) { return x + y; };
        if (true) { false } else { _private1 }
    "#;

    assert_eq!(tokens(input)?, vec![
        Token::Let,
        Token::Ident("add".into()),
        Token::Assign,
        Token::Function,
        Token::LParen,
        Token::Ident("x".into()),
        Token::Comma,
        Token::Ident("y".into()),
        Token::RParen,
        Token::LBrace,
        Token::Return,
        Token::Ident("x".into()),
        Token::Plus,
        Token::Ident("y".into()),
        Token::Semicolon,
        Token::RBrace,
        Token::Semicolon,
        Token::If,
        Token::LParen,
        Token::True,
        Token::RParen,
        Token::LBrace,
        Token::False,
        Token::RBrace,
        Token::Else,
        Token::LBrace,
        Token::Ident("_private1".into()),
        Token::RBrace,
    ]);

    Ok(())
}

#[test]
fn test_literals() -> Result<(), LexicalError> {
    let input = r#"0 42 9223372036854775807 "foo" "" "a\"b\\c\n\t""#;

    assert_eq!(tokens(input)?, vec![
        Token::Int(0),
        Token::Int(42),
        Token::Int(i64::MAX),
        Token::String("foo".into()),
        Token::String("".into()),
        Token::String("a\"b\\c\n\t".into()),
    ]);

    Ok(())
}

#[test]
fn test_comments() -> Result<(), LexicalError> {
    let input = "1 // one\n// nothing here\n2 / 2";

    assert_eq!(tokens(input)?, vec![
        Token::Int(1),
        Token::Comment,
        Token::Comment,
        Token::Int(2),
        Token::Slash,
        Token::Int(2),
    ]);

    Ok(())
}

#[test]
fn test_spans() {
    let input = "let x == \"héllo\";";
    let mut lexer = Lexer::new(input.char_indices().map(|(i, c)| (i as u32, c)));

    let expected = vec![
        (0, Token::Let, 3),
        (4, Token::Ident("x".into()), 5),
        (6, Token::Equal, 8),
        (9, Token::String("héllo".into()), 17),
        (17, Token::Semicolon, 18),
        (18, Token::Eof, 18),
        (18, Token::Eof, 18),
    ];

    for span in expected {
        assert_eq!(lexer.next_token(), Ok(span));
    }
}

#[test]
fn test_errors() {
    let fails = vec![
        ("@", LexicalErrorType::UnrecognizedToken { tok: '@' }),
        ("\"abc", LexicalErrorType::MissingStringEnd),
        ("\"abc\\", LexicalErrorType::MissingStringEnd),
        ("\"a\\qb\"", LexicalErrorType::UnknownEscape { ch: 'q' }),
        ("9223372036854775808", LexicalErrorType::IntegerOverflow),
    ];

    for (input, expected) in fails {
        match tokens(input) {
            Ok(tokens) => panic!("expected {expected:?} for {input:?}, got {tokens:?}"),
            Err(err) => assert_eq!(err.error, expected, "input: {input:?}"),
        }
    }
}
