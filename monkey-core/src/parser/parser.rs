use crate::{
    lexer::prelude::{LexResult, LexicalError, Lexer, Spanned, Token},
    utils::prelude::{ensure_sufficient_stack, SrcSpan}
};
use super::error::{ParseError, ParseErrorType};
use super::ast::{Expression, Node, Program};

/// Deepest expression or block nesting accepted. Syntax trees are dropped and
/// printed recursively, so deeper input is rejected while parsing.
pub const MAX_NESTING_DEPTH: usize = 1_000;

pub trait Parse<T: Iterator<Item = LexResult>>
    where Self: Sized,
{
    fn parse(
        parser: &mut Parser<T>,
        precedence: Option<Precedence>
    ) -> Result<Self, ParseError>;
}

pub trait InfixParse<T: Iterator<Item = LexResult>>
    where Self: Sized,
{
    fn parse(
        parser: &mut Parser<T>,
        left: Expression,
        precedence: Option<Precedence>
    ) -> Result<Self, ParseError>;
}

pub struct Parser<T: Iterator<Item = LexResult>> {
    pub current_token: Option<Spanned>,
    pub comments: Vec<SrcSpan>,
    pub lex_error: Option<LexicalError>,

    last_end: u32,
    depth: usize,
    tokens: T,
}

impl<T: Iterator<Item = LexResult>> Parser<T> {
    pub fn new(input: T) -> Self {
        let mut parser = Self {
            current_token: None,
            comments: vec![],
            lex_error: None,

            last_end: 0,
            depth: 0,
            tokens: input,
        };

        parser.step();

        parser
    }

    pub fn step(&mut self) {
        let _ = self.next_token();
    }

    /// Hands out the current token and pulls the next one from the lexer.
    /// Once the lexer fails the parser stays at `None`.
    pub fn next_token(&mut self) -> Option<Spanned> {
        let t = self.current_token.take();

        if let Some((_, _, end)) = &t {
            self.last_end = *end;
        }

        if self.lex_error.is_some() {
            return t;
        }

        loop {
            match self.tokens.next() {
                Some(Ok((start, Token::Comment, end))) => {
                    self.comments.push(SrcSpan { start, end })
                },
                Some(Err(err)) => {
                    self.lex_error = Some(err);

                    break;
                },
                Some(Ok(tok)) => {
                    self.current_token = Some(tok);

                    break;
                },
                None => {
                    break;
                }
            }
        }

        t
    }

    /// Runs `parse` one nesting level deeper than the caller.
    pub fn nested<R>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<R, ParseError>
    ) -> Result<R, ParseError> {
        ensure_sufficient_stack(|| {
            let entered = self.depth;
            let result = self.enter().and_then(|()| parse(self));
            self.depth = entered;

            result
        })
    }

    /// Counts one more level of nesting. Left by `nested` on return.
    pub fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;

        if self.depth <= MAX_NESTING_DEPTH {
            return Ok(());
        }

        let span = match &self.current_token {
            Some((start, _, end)) => SrcSpan { start: *start, end: *end },
            None => SrcSpan { start: self.last_end, end: self.last_end }
        };

        parse_error(ParseErrorType::NestingTooDeep { limit: MAX_NESTING_DEPTH }, span)
    }

    pub fn is_current(&self, token: &Token) -> bool {
        matches!(&self.current_token, Some((_, current, _)) if current == token)
    }

    pub fn current_precedence(&self) -> Precedence {
        match &self.current_token {
            Some((_, token, _)) => Precedence::from(token),
            None => Precedence::Lowest
        }
    }

    /// Returns the next top-level node, or `None` once the input is exhausted.
    pub fn next_node(&mut self) -> Result<Option<Node>, ParseError> {
        while self.is_current(&Token::Semicolon) {
            self.step();
        }

        match &self.current_token {
            Some((_, Token::Eof, _)) => return Ok(None),
            Some(_) => {},
            None => return match self.lex_error {
                Some(_) => Err(self.eof_error()),
                None => Ok(None)
            }
        }

        let node = Node::parse(self, None)?;
        self.expect_terminator(&node, None)?;

        Ok(Some(node))
    }

    pub fn parse(&mut self) -> Result<Program, ParseError> {
        let start = self.current_token.as_ref().map_or(0, |(start, _, _)| *start);
        let mut nodes = vec![];

        while let Some(node) = self.next_node()? {
            nodes.push(node);
        }

        Ok(Program {
            nodes,
            location: SrcSpan { start, end: self.last_end.max(start) }
        })
    }

    /// A node ends at `;`, at `closing` (the end of its block) or at the end of input.
    /// `if` statements end with their own closing brace.
    pub fn expect_terminator(&mut self, node: &Node, closing: Option<Token>) -> Result<(), ParseError> {
        match &self.current_token {
            Some((_, Token::Semicolon, _)) => {
                self.step();
                Ok(())
            },
            Some((_, Token::Eof, _)) if closing.is_none() => Ok(()),
            Some((_, token, _)) if Some(token) == closing.as_ref() => Ok(()),
            _ if node.is_block_terminated() => Ok(()),
            Some((_, Token::Eof, _)) | None => Err(self.eof_error()),
            Some(_) => parse_error(
                ParseErrorType::MissingSemicolon,
                SrcSpan { start: self.last_end, end: self.last_end }
            )
        }
    }

    pub fn expect_one(&mut self, token: Token) -> Result<(u32, u32), ParseError> {
        match &self.current_token {
            Some((start, tok, end)) if *tok == token => {
                let span = (*start, *end);
                self.step();

                Ok(span)
            },
            _ => Err(self.unexpected(vec![token.as_literal()]))
        }
    }

    pub fn expect_ident(&mut self) -> Result<(u32, String, u32), ParseError> {
        match &self.current_token {
            Some((start, Token::Ident(value), end)) => {
                let ident = (*start, value.clone(), *end);
                self.step();

                Ok(ident)
            },
            Some((_, Token::Eof, _)) | None => Err(self.eof_error()),
            Some((start, _, end)) => parse_error(
                ParseErrorType::ExpectedIdent,
                SrcSpan { start: *start, end: *end }
            )
        }
    }

    /// Parses `expr, expr, ...` up to and including `closing`.
    /// Returns the elements and the end offset of `closing`.
    pub fn parse_expression_list(&mut self, closing: Token) -> Result<(Vec<Expression>, u32), ParseError> {
        let mut list = vec![];

        if let Some((_, token, end)) = &self.current_token {
            if *token == closing {
                let end = *end;
                self.step();

                return Ok((list, end));
            }
        }

        list.push(Expression::parse(self, None)?);

        while self.is_current(&Token::Comma) {
            self.step();
            list.push(Expression::parse(self, None)?);
        }

        let (_, end) = self.expect_one(closing)?;

        Ok((list, end))
    }

    pub fn unexpected(&self, expected: Vec<String>) -> ParseError {
        match &self.current_token {
            Some((_, Token::Eof, _)) | None => self.eof_error(),
            Some((start, token, end)) => ParseError {
                error: ParseErrorType::UnexpectedToken {
                    token: token.clone(),
                    expected,
                },
                span: SrcSpan { start: *start, end: *end }
            }
        }
    }

    pub fn eof_error(&self) -> ParseError {
        match self.lex_error {
            Some(error) => ParseError {
                error: ParseErrorType::LexError { error },
                span: error.location
            },
            None => ParseError {
                error: ParseErrorType::UnexpectedEof,
                span: SrcSpan { start: self.last_end, end: self.last_end }
            }
        }
    }
}

/// Binding strength of infix and postfix operators, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub enum Precedence {
    Lowest,
    Assign,
    Compare,
    Sum,
    Product,
    Prefix,
    Call
}

impl From<&Token> for Precedence {
    fn from(value: &Token) -> Self {
        match value {
            Token::Assign => Self::Assign,
            Token::Equal | Token::NotEqual |
            Token::LessThan | Token::GreaterThan => Self::Compare,
            Token::Plus | Token::Minus => Self::Sum,
            Token::Asterisk | Token::Slash => Self::Product,
            Token::LParen | Token::LBracket => Self::Call,
            _ => Self::Lowest,
        }
    }
}

pub fn parse_program(src: &str) -> Result<Program, ParseError> {
    let lexer = Lexer::new(src.char_indices().map(|(i, c)| (i as u32, c)));
    let mut parser = Parser::new(lexer);

    parser.parse()
}

pub fn parse_program_from_stream(stream: impl Iterator<Item = char>) -> Result<Program, ParseError> {
    let lexer = Lexer::new(stream
        .scan(0, |pos, c| {
            *pos += c.len_utf8() as u32;
            Some((*pos - c.len_utf8() as u32, c))
        })
    );
    let mut parser = Parser::new(lexer);

    parser.parse()
}

pub fn parse_error<T>(error: ParseErrorType, span: SrcSpan) -> Result<T, ParseError> {
    Err(ParseError { error, span })
}
