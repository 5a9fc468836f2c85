use super::error::{LexicalError, LexicalErrorType};
use super::token::Token;
use crate::utils::prelude::SrcSpan;

pub type Spanned = (u32, Token, u32);
pub type LexResult = std::result::Result<Spanned, LexicalError>;

pub fn str_to_keyword(word: &str) -> Option<Token> {
	Some(match word {
		"fn" => Token::Function,
		"let" => Token::Let,
		"true" => Token::True,
		"false" => Token::False,
		"if" => Token::If,
		"else" => Token::Else,
		"return" => Token::Return,
		_ => return None
	})
}

#[derive(Debug)]
pub struct Lexer<T: Iterator<Item = (u32, char)>> {
	position: u32,
	next_position: u32,
	ch: Option<char>,
	next_ch: Option<char>,
	input: T,
}

impl<T: Iterator<Item = (u32, char)>> Lexer<T> {
	pub fn new(input: T) -> Self {
		let mut lexer = Self {
			position: 0,
			next_position: 0,
			ch: None,
			next_ch: None,
			input,
		};

		lexer.next_char();
		lexer.next_char();

		lexer
	}

	pub fn next_token(&mut self) -> LexResult {
		while matches!(self.ch, Some(ch) if ch.is_whitespace()) {
			self.next_char();
		}

		let span = match self.ch {
			Some(ch) => match ch {
				'/' if self.next_ch == Some('/') => return Ok(self.lex_comment()),
				'(' => self.eat_one_char(Token::LParen),
				')' => self.eat_one_char(Token::RParen),
				'{' => self.eat_one_char(Token::LBrace),
				'}' => self.eat_one_char(Token::RBrace),
				'[' => self.eat_one_char(Token::LBracket),
				']' => self.eat_one_char(Token::RBracket),
				',' => self.eat_one_char(Token::Comma),
				':' => self.eat_one_char(Token::Colon),
				';' => self.eat_one_char(Token::Semicolon),
				'+' => self.eat_one_char(Token::Plus),
				'-' => self.eat_one_char(Token::Minus),
				'*' => self.eat_one_char(Token::Asterisk),
				'/' => self.eat_one_char(Token::Slash),
				'<' => self.eat_one_char(Token::LessThan),
				'>' => self.eat_one_char(Token::GreaterThan),
				'=' if self.next_ch == Some('=') => self.eat_two_chars(Token::Equal),
				'=' => self.eat_one_char(Token::Assign),
				'!' if self.next_ch == Some('=') => self.eat_two_chars(Token::NotEqual),
				'!' => self.eat_one_char(Token::Bang),
				'"' => return self.lex_string(),
				'a'..='z' | 'A'..='Z' | '_' => return Ok(self.lex_ident()),
				'0'..='9' => return self.lex_number(),
				c => {
					let start = self.position;
					let _ = self.next_char();

					return Err(LexicalError {
						error: LexicalErrorType::UnrecognizedToken { tok: c },
						location: SrcSpan::from(start, self.position),
					});
				}
			},
			None => (self.position, Token::Eof, self.position)
		};

		Ok(span)
	}

	fn next_char(&mut self) -> Option<char> {
		let ch = self.ch;

		let next = match self.input.next() {
			Some((pos, ch)) => {
				self.position = self.next_position;
				self.next_position = pos;

				Some(ch)
			},
			None => {
				self.position = self.next_position;
				self.next_position += self.next_ch.map_or(0, |c| c.len_utf8() as u32);

				None
			}
		};

		self.ch = self.next_ch;
		self.next_ch = next;

		ch
	}

	fn eat_one_char(&mut self, token: Token) -> Spanned {
		let start_pos = self.position;
		self.next_char();

		(start_pos, token, self.position)
	}

	fn eat_two_chars(&mut self, token: Token) -> Spanned {
		let start_pos = self.position;
		self.next_char();
		self.next_char();

		(start_pos, token, self.position)
	}

	fn lex_ident(&mut self) -> Spanned {
		let start_pos = self.position;
		let mut ident = String::new();

		while let Some(ch) = self.ch {
			if !(ch.is_ascii_alphanumeric() || ch == '_') {
				break;
			}

			ident.push(ch);
			self.next_char();
		}

		let end_pos = self.position;

		match str_to_keyword(&ident) {
			Some(keyword) => (start_pos, keyword, end_pos),
			None => (start_pos, Token::Ident(ident), end_pos)
		}
	}

	fn lex_number(&mut self) -> LexResult {
		let start_pos = self.position;
		let mut value = String::new();

		while let Some(ch) = self.ch {
			if !ch.is_ascii_digit() {
				break;
			}

			value.push(ch);
			self.next_char();
		}

		let end_pos = self.position;

		match value.parse::<i64>() {
			Ok(value) => Ok((start_pos, Token::Int(value), end_pos)),
			Err(_) => Err(LexicalError {
				error: LexicalErrorType::IntegerOverflow,
				location: SrcSpan::from(start_pos, end_pos)
			})
		}
	}

	fn lex_string(&mut self) -> LexResult {
		let start_pos = self.position;
		let mut value = String::new();

		self.next_char(); // opening quote

		loop {
			match self.ch {
				Some('"') => {
					self.next_char();
					break;
				},
				Some('\\') => {
					self.next_char();

					let escaped = match self.ch {
						Some('n') => '\n',
						Some('t') => '\t',
						Some('"') => '"',
						Some('\\') => '\\',
						Some(ch) => {
							let escape_start = self.position - 1;
							self.next_char();

							return Err(LexicalError {
								error: LexicalErrorType::UnknownEscape { ch },
								location: SrcSpan::from(escape_start, self.position)
							});
						},
						None => {
							return Err(LexicalError {
								error: LexicalErrorType::MissingStringEnd,
								location: SrcSpan::from(start_pos, self.position)
							});
						}
					};

					value.push(escaped);
					self.next_char();
				},
				Some(ch) => {
					value.push(ch);
					self.next_char();
				},
				None => {
					return Err(LexicalError {
						error: LexicalErrorType::MissingStringEnd,
						location: SrcSpan::from(start_pos, self.position)
					});
				}
			}
		}

		Ok((start_pos, Token::String(value), self.position))
	}

	fn lex_comment(&mut self) -> Spanned {
		let start_pos = self.position;

		while !matches!(self.ch, Some('\n') | None) {
			self.next_char();
		}

		(start_pos, Token::Comment, self.position)
	}
}

impl<T: Iterator<Item = (u32, char)>> Iterator for Lexer<T> {
	type Item = LexResult;

	fn next(&mut self) -> Option<Self::Item> {
		Some(self.next_token())
	}
}
