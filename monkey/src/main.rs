mod cli;
mod repl;
mod rlpl;
mod rppl;

use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use cli::{init_tracing, print_finished, print_running, stderr_buffer_writer};
use monkey_core::{
    environment::prelude::{Environment, Value},
    eval::prelude::run
};

#[derive(Parser)]
#[command(version, about = "Interpreter for the Monkey scripting language")]
struct Cli {
    /// Log evaluation details to stderr
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Runs Read Eval Print Loop [default]
    Repl {
        /// Prompt printed before every line
        #[arg(long, default_value = repl::PROMPT)]
        prompt: String,
    },
    /// Evaluates a source file and prints its final value
    Run {
        /// Path of source file
        path: PathBuf,
    },
    /// Runs Read Lex Print Loop
    Rlpl,
    /// Runs Read Parse Print Loop
    Rppl
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let command = cli.command.unwrap_or(Command::Repl { prompt: repl::PROMPT.to_string() });

    let result = match command {
        Command::Repl { prompt } => repl::start(&prompt),
        Command::Run { path } => return run_file(path),
        Command::Rlpl => rlpl::start(),
        Command::Rppl => rppl::start()
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_file(path: PathBuf) -> ExitCode {
    print_running(&path.to_string_lossy());
    let start = std::time::Instant::now();

    let env = Environment::new().into_shared();

    match run(path, &env) {
        Ok(value) => {
            print_finished(start.elapsed());

            if !matches!(value, Value::Null) {
                println!("{value}");
            }

            ExitCode::SUCCESS
        },
        Err(err) => {
            tracing::debug!(error = %err, "run failed");

            let buf_writer = stderr_buffer_writer();
            let mut buf = buf_writer.buffer();

            let printed = err.pretty(&mut buf)
                .and_then(|()| buf_writer.print(&buf));

            if let Err(io_err) = printed {
                eprintln!("error: {err} ({io_err})");
            }

            ExitCode::FAILURE
        }
    }
}
