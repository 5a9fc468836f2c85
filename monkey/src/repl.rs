use std::io::Write;

use monkey_core::{
	environment::prelude::Environment,
	eval::prelude::Evaluator,
	lexer::prelude::Lexer,
	parser::prelude::Parser
};

pub const PROMPT: &str = ">> ";

/// Read Eval Print Loop. Every line is evaluated against one root environment.
pub fn start(prompt: &str) -> std::io::Result<()> {
	let stdin = std::io::stdin();
	let env = Environment::new().into_shared();

	loop {
		let mut input = String::from("");

		print!("{prompt}");
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
				let lexer = Lexer::new(input.char_indices().map(|(i, c)| (i as u32, c)));
				let mut evaluator = Evaluator::new(Parser::new(lexer), env.clone());

				loop {
					match evaluator.eval_next() {
						Ok(Some(value)) => println!("{value}"),
						Ok(None) => break,
						Err(err) => {
							let (message, messages) = err.details();

							println!("[at {}] Parse error: {}", err.span.start, message);
							if !messages.is_empty() {
								println!("\t{}", messages.join("\n\t"));
							}

							break;
						}
					}
				}
			}
		}
	}
}
