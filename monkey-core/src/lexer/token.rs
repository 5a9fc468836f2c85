#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    Int(i64),
    String(String),
    // // line comment
    Comment,

    // Arithmetic
    Plus, // +
    Minus, // -
    Asterisk, // *
    Slash, // /

    // Comparison
    Equal, // ==
    NotEqual, // !=
    LessThan, // <
    GreaterThan, // >

    Bang, // !
    Assign, // =

    // Keywords
    Function, // fn
    Let, // let
    True, // true
    False, // false
    If, // if
    Else, // else
    Return, // return

    // Delimiters
    Comma, // ,
    Colon, // :
    Semicolon, // ;
    LParen, // (
    RParen, // )
    LBrace, // {
    RBrace, // }
    LBracket, // [
    RBracket, // ]

    Eof,
}

impl Token {
    pub fn is_reserved_word(&self) -> bool {
        matches!(
            self,
            Token::Function
            | Token::Let
            | Token::True
            | Token::False
            | Token::If
            | Token::Else
            | Token::Return
        )
    }

    pub fn as_literal(&self) -> String {
        match self {
            Token::Ident(value) => value.clone(),
            Token::Int(value) => value.to_string(),
            Token::String(value) => format!("{value:?}"),
            Token::Comment => "comment".to_string(),

            Token::Plus => "+".to_string(),
            Token::Minus => "-".to_string(),
            Token::Asterisk => "*".to_string(),
            Token::Slash => "/".to_string(),
            Token::Equal => "==".to_string(),
            Token::NotEqual => "!=".to_string(),
            Token::LessThan => "<".to_string(),
            Token::GreaterThan => ">".to_string(),
            Token::Bang => "!".to_string(),
            Token::Assign => "=".to_string(),

            Token::Function => "fn".to_string(),
            Token::Let => "let".to_string(),
            Token::True => "true".to_string(),
            Token::False => "false".to_string(),
            Token::If => "if".to_string(),
            Token::Else => "else".to_string(),
            Token::Return => "return".to_string(),

            Token::Comma => ",".to_string(),
            Token::Colon => ":".to_string(),
            Token::Semicolon => ";".to_string(),
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
            Token::LBrace => "{".to_string(),
            Token::RBrace => "}".to_string(),
            Token::LBracket => "[".to_string(),
            Token::RBracket => "]".to_string(),

            Token::Eof => "end of input".to_string(),
        }
    }
}
