use crate::{lexer::prelude::{LexicalError, Token}, utils::prelude::SrcSpan};

#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorType {
    ExpectedIdent,
    ExpectedExpression {
        token: Token,
    },
    UnexpectedEof,
    UnexpectedToken {
        token: Token,
        expected: Vec<String>,
    },
    MissingSemicolon,
    NestingTooDeep {
        limit: usize,
    },
    LexError { error: LexicalError },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub error: ParseErrorType,
    pub span: SrcSpan
}

fn describe(token: &Token) -> String {
    match token {
        Token::Int(_) => "an Int".to_string(),
        Token::String(_) => "a String".to_string(),
        Token::Ident(_) => "an Identifier".to_string(),
        _ if token.is_reserved_word() => format!("the keyword `{}`", token.as_literal()),
        _ => format!("`{}`", token.as_literal())
    }
}

impl ParseError {
    pub fn details(&self) -> (&'static str, Vec<String>) {
        match &self.error {
            ParseErrorType::ExpectedIdent => ("Expected identifier", vec![]),
            ParseErrorType::ExpectedExpression { token } => (
                "Expected expression",
                vec![format!("Found {}, which cannot start an expression", describe(token))]
            ),
            ParseErrorType::UnexpectedToken { token, expected } => {
                let messages = std::iter::once(format!("Found {}, expected one of: ", describe(token)))
                    .chain(expected.iter().map(|s| format!("- {s}")))
                    .collect();

                ("Not expected this", messages)
            },
            ParseErrorType::UnexpectedEof => ("Unexpected end of input", vec![]),
            ParseErrorType::MissingSemicolon => ("Missing semicolon", vec![]),
            ParseErrorType::NestingTooDeep { limit } => (
                "Nesting too deep",
                vec![format!("Expressions and blocks nest at most {limit} levels deep")]
            ),
            ParseErrorType::LexError { error } => error.details()
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (message, extra) = self.details();

        write!(f, "{message}")?;

        if !extra.is_empty() {
            write!(f, ": {}", extra.join(" "))?;
        }

        Ok(())
    }
}
