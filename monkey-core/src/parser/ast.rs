use std::{fmt::Display, rc::Rc};

use crate::{
    lexer::prelude::{LexResult, Token},
    parser::prelude::{parse_error, InfixParse, Parse, ParseError, ParseErrorType, Parser, Precedence},
    utils::prelude::SrcSpan
};

fn join<T: Display>(items: &[T], separator: &str) -> String {
    items.iter()
        .map(|item| item.to_string())
        .collect::<Vec<String>>()
        .join(separator)
}

// program -> { <node> ; }
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub nodes: Vec<Node>,
    pub location: SrcSpan
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", join(&self.nodes, "; "))
    }
}

// node -> <statement> | <expression>
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Statement(Statement),
    Expression(Expression),
}

impl<T: Iterator<Item = LexResult>> Parse<T> for Node {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        match &parser.current_token {
            Some((_, Token::Let | Token::Return | Token::If, _)) => {
                Ok(Self::Statement(Statement::parse(parser, None)?))
            },
            Some(_) => Ok(Self::Expression(Expression::parse(parser, None)?)),
            None => Err(parser.eof_error())
        }
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Statement(statement) => write!(f, "{statement}"),
            Self::Expression(expression) => write!(f, "{expression}")
        }
    }
}

impl Node {
    pub fn location(&self) -> SrcSpan {
        match self {
            Self::Statement(statement) => statement.location(),
            Self::Expression(expression) => expression.location()
        }
    }

    /// Nodes that close with their own `}` and need no `;` after them.
    pub fn is_block_terminated(&self) -> bool {
        matches!(self, Self::Statement(Statement::If(_)))
    }
}

// block -> { { <node> ; } }
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub nodes: Vec<Node>,
    pub location: SrcSpan
}

impl<T: Iterator<Item = LexResult>> Parse<T> for Block {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        parser.nested(|parser| {
            let (start, _) = parser.expect_one(Token::LBrace)?;
            let mut nodes = vec![];

            let end = loop {
                while parser.is_current(&Token::Semicolon) {
                    parser.step();
                }

                if let Some((_, Token::RBrace, end)) = parser.current_token {
                    parser.step();
                    break end;
                }

                let node = Node::parse(parser, None)?;
                parser.expect_terminator(&node, Some(Token::RBrace))?;

                nodes.push(node);
            };

            Ok(Self {
                nodes,
                location: SrcSpan { start, end }
            })
        })
    }
}

impl Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.nodes.is_empty() {
            write!(f, "{{ }}")
        } else {
            write!(f, "{{ {} }}", join(&self.nodes, "; "))
        }
    }
}

// statement -> <let> | <return> | <if>
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Let(Let),
    Return(Return),
    If(If),
}

impl<T: Iterator<Item = LexResult>> Parse<T> for Statement {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        match &parser.current_token {
            Some((_, Token::Let, _)) => Ok(Self::Let(Let::parse(parser, None)?)),
            Some((_, Token::Return, _)) => Ok(Self::Return(Return::parse(parser, None)?)),
            Some((_, Token::If, _)) => Ok(Self::If(If::parse(parser, None)?)),
            _ => Err(parser.unexpected(vec!["let".into(), "return".into(), "if".into()]))
        }
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Let(let_) => write!(f, "{let_}"),
            Self::Return(return_) => write!(f, "{return_}"),
            Self::If(if_) => write!(f, "{if_}")
        }
    }
}

impl Statement {
    pub fn location(&self) -> SrcSpan {
        match self {
            Self::Let(let_) => let_.location,
            Self::Return(return_) => return_.location,
            Self::If(if_) => if_.location
        }
    }
}

// let -> let <identifier> = <expression>
#[derive(Debug, Clone, PartialEq)]
pub struct Let {
    pub name: Identifier,
    pub value: Expression,
    pub location: SrcSpan
}

impl<T: Iterator<Item = LexResult>> Parse<T> for Let {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let (start, _) = parser.expect_one(Token::Let)?;
        let name = Identifier::from(parser.expect_ident()?);

        parser.expect_one(Token::Assign)?;

        let value = Expression::parse(parser, None)?;
        let end = value.location().end;

        Ok(Self {
            name,
            value,
            location: SrcSpan { start, end }
        })
    }
}

impl Display for Let {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "let {} = {}", self.name, self.value)
    }
}

// return -> return [ <expression> ]
#[derive(Debug, Clone, PartialEq)]
pub struct Return {
    pub value: Option<Expression>,
    pub location: SrcSpan
}

impl<T: Iterator<Item = LexResult>> Parse<T> for Return {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let (start, end) = parser.expect_one(Token::Return)?;

        let value = match &parser.current_token {
            Some((_, Token::Semicolon | Token::RBrace | Token::Eof, _)) => None,
            _ => Some(Expression::parse(parser, None)?)
        };

        let end = value.as_ref().map_or(end, |value| value.location().end);

        Ok(Self {
            value,
            location: SrcSpan { start, end }
        })
    }
}

impl Display for Return {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            Some(value) => write!(f, "return {value}"),
            None => write!(f, "return")
        }
    }
}

// if -> if <expression> <block> [ else ( <block> | <if> ) ]
#[derive(Debug, Clone, PartialEq)]
pub struct If {
    pub condition: Expression,
    pub consequence: Block,
    pub alternative: Option<Block>,
    pub location: SrcSpan
}

impl<T: Iterator<Item = LexResult>> Parse<T> for If {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let (start, _) = parser.expect_one(Token::If)?;

        let condition = Expression::parse(parser, None)?;
        let consequence = Block::parse(parser, None)?;
        let mut end = consequence.location.end;

        let alternative = if parser.is_current(&Token::Else) {
            parser.step();

            let block = if parser.is_current(&Token::If) {
                let nested = If::parse(parser, None)?;

                Block {
                    location: nested.location,
                    nodes: vec![Node::Statement(Statement::If(nested))],
                }
            } else {
                Block::parse(parser, None)?
            };

            end = block.location.end;

            Some(block)
        } else {
            None
        };

        Ok(Self {
            condition,
            consequence,
            alternative,
            location: SrcSpan { start, end }
        })
    }
}

impl Display for If {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "if {} {}", self.condition, self.consequence)?;

        if let Some(alternative) = &self.alternative {
            write!(f, " else {alternative}")?;
        }

        Ok(())
    }
}

// expression -> <primary> { <infix> | <call> | <index> }
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(Identifier),
    Primitive(Primitive),
    Array(ArrayLiteral),
    Map(MapLiteral),
    Prefix(Prefix),
    Infix(Infix),
    Index(Index),
    Function(FunctionLiteral),
    Call(Call),
}

impl<T: Iterator<Item = LexResult>> Parse<T> for Expression {
    fn parse(
        parser: &mut Parser<T>,
        precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let precedence = precedence.unwrap_or(Precedence::Lowest);

        parser.nested(|parser| {
            let mut left = Self::parse_primary(parser)?;

            while parser.current_precedence() > precedence {
                // every operator wraps `left` one level deeper
                parser.enter()?;

                let is_call = parser.is_current(&Token::LParen);
                let is_index = parser.is_current(&Token::LBracket);

                left = if is_call {
                    Self::Call(Call::parse(parser, left, None)?)
                } else if is_index {
                    Self::Index(Index::parse(parser, left, None)?)
                } else {
                    Self::Infix(Infix::parse(parser, left, None)?)
                };
            }

            Ok(left)
        })
    }
}

impl Expression {
    fn parse_primary<T: Iterator<Item = LexResult>>(
        parser: &mut Parser<T>
    ) -> Result<Self, ParseError> {
        let (start, token, end) = match parser.current_token.clone() {
            Some(spanned) => spanned,
            None => return Err(parser.eof_error())
        };
        let location = SrcSpan { start, end };

        let expression = match token {
            Token::Ident(value) => {
                parser.step();
                Self::Identifier(Identifier { value, location })
            },
            Token::Int(value) => {
                parser.step();
                Self::Primitive(Primitive::Int { value, location })
            },
            Token::String(value) => {
                parser.step();
                Self::Primitive(Primitive::String { value, location })
            },
            Token::True | Token::False => {
                parser.step();
                Self::Primitive(Primitive::Bool { value: token == Token::True, location })
            },
            Token::LParen => {
                parser.step();
                let inner = Self::parse(parser, None)?;
                parser.expect_one(Token::RParen)?;

                inner
            },
            Token::LBracket => Self::Array(ArrayLiteral::parse(parser, None)?),
            Token::LBrace => Self::Map(MapLiteral::parse(parser, None)?),
            Token::Function => Self::Function(FunctionLiteral::parse(parser, None)?),
            Token::Plus | Token::Minus | Token::Bang => Self::Prefix(Prefix::parse(parser, None)?),
            Token::Eof => return Err(parser.eof_error()),
            token => return parse_error(
                ParseErrorType::ExpectedExpression { token },
                location
            )
        };

        Ok(expression)
    }

    pub fn location(&self) -> SrcSpan {
        match self {
            Self::Identifier(identifier) => identifier.location,
            Self::Primitive(primitive) => primitive.location(),
            Self::Array(array) => array.location,
            Self::Map(map) => map.location,
            Self::Prefix(prefix) => prefix.location,
            Self::Infix(infix) => infix.location,
            Self::Index(index) => index.location,
            Self::Function(function) => function.location,
            Self::Call(call) => call.location
        }
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Identifier(identifier) => write!(f, "{identifier}"),
            Self::Primitive(primitive) => write!(f, "{primitive}"),
            Self::Array(array) => write!(f, "{array}"),
            Self::Map(map) => write!(f, "{map}"),
            Self::Prefix(prefix) => write!(f, "{prefix}"),
            Self::Infix(infix) => write!(f, "{infix}"),
            Self::Index(index) => write!(f, "{index}"),
            Self::Function(function) => write!(f, "{function}"),
            Self::Call(call) => write!(f, "{call}")
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub value: String,
    pub location: SrcSpan
}

impl From<(u32, String, u32)> for Identifier {
    fn from((start, value, end): (u32, String, u32)) -> Self {
        Self {
            value,
            location: SrcSpan { start, end }
        }
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Int {
        value: i64,
        location: SrcSpan
    },
    Bool {
        value: bool,
        location: SrcSpan
    },
    String {
        value: String,
        location: SrcSpan
    },
}

impl Primitive {
    pub fn location(&self) -> SrcSpan {
        match self {
            Self::Int { location, .. }
            | Self::Bool { location, .. }
            | Self::String { location, .. } => *location
        }
    }
}

impl Display for Primitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int { value, .. } => write!(f, "{value}"),
            Self::Bool { value, .. } => write!(f, "{value}"),
            Self::String { value, .. } => write!(f, "{value:?}")
        }
    }
}

// array -> [ [ <expression> { , <expression> } ] ]
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLiteral {
    pub elements: Vec<Expression>,
    pub location: SrcSpan
}

impl<T: Iterator<Item = LexResult>> Parse<T> for ArrayLiteral {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let (start, _) = parser.expect_one(Token::LBracket)?;
        let (elements, end) = parser.parse_expression_list(Token::RBracket)?;

        Ok(Self {
            elements,
            location: SrcSpan { start, end }
        })
    }
}

impl Display for ArrayLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", join(&self.elements, ", "))
    }
}

// map -> { [ <expression> : <expression> { , <expression> : <expression> } ] }
#[derive(Debug, Clone, PartialEq)]
pub struct MapLiteral {
    pub pairs: Vec<(Expression, Expression)>,
    pub location: SrcSpan
}

impl<T: Iterator<Item = LexResult>> Parse<T> for MapLiteral {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let (start, _) = parser.expect_one(Token::LBrace)?;
        let mut pairs = vec![];

        if !parser.is_current(&Token::RBrace) {
            loop {
                let key = Expression::parse(parser, None)?;
                parser.expect_one(Token::Colon)?;
                let value = Expression::parse(parser, None)?;

                pairs.push((key, value));

                if !parser.is_current(&Token::Comma) {
                    break;
                }

                parser.step();
            }
        }

        let (_, end) = parser.expect_one(Token::RBrace)?;

        Ok(Self {
            pairs,
            location: SrcSpan { start, end }
        })
    }
}

impl Display for MapLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pairs = self.pairs.iter()
            .map(|(key, value)| format!("{key}: {value}"))
            .collect::<Vec<String>>();

        write!(f, "{{{}}}", pairs.join(", "))
    }
}

// prefix -> ( + | - | ! ) <expression>
#[derive(Debug, Clone, PartialEq)]
pub struct Prefix {
    pub operator: Token,
    pub expression: Box<Expression>,
    pub location: SrcSpan
}

impl<T: Iterator<Item = LexResult>> Parse<T> for Prefix {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let (start, operator, _) = match parser.next_token() {
            Some(spanned) => spanned,
            None => return Err(parser.eof_error())
        };

        let expression = Expression::parse(parser, Some(Precedence::Prefix))?;
        let end = expression.location().end;

        Ok(Self {
            operator,
            expression: Box::new(expression),
            location: SrcSpan { start, end }
        })
    }
}

impl Display for Prefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}{})", self.operator.as_literal(), self.expression)
    }
}

// infix -> <expression> <operator> <expression>
#[derive(Debug, Clone, PartialEq)]
pub struct Infix {
    pub operator: Token,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub location: SrcSpan
}

impl<T: Iterator<Item = LexResult>> InfixParse<T> for Infix {
    fn parse(
        parser: &mut Parser<T>,
        left: Expression,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let operator = match parser.next_token() {
            Some((_, operator, _)) => operator,
            None => return Err(parser.eof_error())
        };

        // `=` is right-associative: its right side takes everything down to the weakest level
        let precedence = match operator {
            Token::Assign => Precedence::Lowest,
            _ => Precedence::from(&operator)
        };

        let right = Expression::parse(parser, Some(precedence))?;
        let location = left.location().to(right.location());

        Ok(Self {
            operator,
            left: Box::new(left),
            right: Box::new(right),
            location
        })
    }
}

impl Display for Infix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {} {})", self.left, self.operator.as_literal(), self.right)
    }
}

// index -> <expression> [ <expression> ]
#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    pub target: Box<Expression>,
    pub index: Box<Expression>,
    pub location: SrcSpan
}

impl<T: Iterator<Item = LexResult>> InfixParse<T> for Index {
    fn parse(
        parser: &mut Parser<T>,
        left: Expression,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        parser.expect_one(Token::LBracket)?;
        let index = Expression::parse(parser, None)?;
        let (_, end) = parser.expect_one(Token::RBracket)?;

        let start = left.location().start;

        Ok(Self {
            target: Box::new(left),
            index: Box::new(index),
            location: SrcSpan { start, end }
        })
    }
}

impl Display for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}[{}])", self.target, self.index)
    }
}

// function -> fn ( [ <identifier> { , <identifier> } ] ) <block>
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionLiteral {
    pub parameters: Vec<Identifier>,
    pub body: Rc<Block>,
    pub location: SrcSpan
}

impl<T: Iterator<Item = LexResult>> Parse<T> for FunctionLiteral {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let (start, _) = parser.expect_one(Token::Function)?;
        parser.expect_one(Token::LParen)?;

        let mut parameters = vec![];

        if !parser.is_current(&Token::RParen) {
            parameters.push(Identifier::from(parser.expect_ident()?));

            while parser.is_current(&Token::Comma) {
                parser.step();
                parameters.push(Identifier::from(parser.expect_ident()?));
            }
        }

        parser.expect_one(Token::RParen)?;

        let body = Block::parse(parser, None)?;
        let end = body.location.end;

        Ok(Self {
            parameters,
            body: Rc::new(body),
            location: SrcSpan { start, end }
        })
    }
}

impl Display for FunctionLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "fn({}) {}", join(&self.parameters, ", "), self.body)
    }
}

// call -> <expression> ( [ <expression> { , <expression> } ] )
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub function: Box<Expression>,
    pub arguments: Vec<Expression>,
    pub location: SrcSpan
}

impl<T: Iterator<Item = LexResult>> InfixParse<T> for Call {
    fn parse(
        parser: &mut Parser<T>,
        left: Expression,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        parser.expect_one(Token::LParen)?;
        let (arguments, end) = parser.parse_expression_list(Token::RParen)?;

        let start = left.location().start;

        Ok(Self {
            function: Box::new(left),
            arguments,
            location: SrcSpan { start, end }
        })
    }
}

impl Display for Call {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.function, join(&self.arguments, ", "))
    }
}
