use std::io::Write;

use monkey_core::{lexer::prelude::Lexer, parser::prelude::Parser};

use crate::repl::PROMPT;

/// Read Parse Print Loop. Prints each node in its canonical parenthesised form.
pub fn start() -> std::io::Result<()> {
	let stdin = std::io::stdin();

	loop {
		let mut input = String::from("");

		print!("{}", PROMPT);
		std::io::stdout().flush()?;

		if stdin.read_line(&mut input)? == 0 {
			return Ok(());
		}

		if let Some('\n') = input.chars().next_back() {
			input.pop();
		}
		if let Some('\r') = input.chars().next_back() {
			input.pop();
		}

		match input.as_str() {
			"" => {},
			".exit" => return Ok(()),
			_ => {
				let mut parser = Parser::new(Lexer::new(input.char_indices().map(|(i, c)| (i as u32, c))));

				loop {
					match parser.next_node() {
						Ok(Some(node)) => println!("{node}"),
						Ok(None) => break,
						Err(err) => {
							let (message, messages) = err.details();

							println!("Parse error: {}.\n\t{}", message, messages.join(";\n\t"));

							break;
						}
					}
				}
			}
		}
	}
}
