use std::path::PathBuf;

use termcolor::Buffer;
use thiserror::Error;

use crate::{
    eval::prelude::RuntimeError,
    parser::prelude::{ParseError, ParseErrorType},
    utils::prelude::SrcSpan
};
use super::diagnostic::{Diagnostic, Label, Location};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("failed to parse source code")]
    Parse {
        path: PathBuf,
        src: String,
        error: ParseError
    },
    #[error("evaluation failed: {error}")]
    Runtime {
        path: PathBuf,
        src: String,
        error: RuntimeError
    },
    #[error("IO operation failed")]
    StdIo {
        err: std::io::ErrorKind
    }
}

impl Error {
    pub fn pretty_string(&self) -> String {
        let mut nocolor = Buffer::no_color();

        match self.pretty(&mut nocolor) {
            Ok(()) => String::from_utf8_lossy(nocolor.as_slice()).into_owned(),
            Err(err) => format!("{self} (diagnostic could not be rendered: {err})")
        }
    }

    pub fn pretty(&self, buf: &mut Buffer) -> std::io::Result<()> {
        use std::io::Write;

        for diagnostic in self.to_diagnostics() {
            diagnostic.write(buf)?;
            writeln!(buf)?;
        }

        Ok(())
    }

    pub fn to_diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            Error::Parse { path, src, error } => {
                let (label, extra) = error.details();

                let location = if matches!(error.error, ParseErrorType::UnexpectedEof) {
                    SrcSpan {
                        start: src.len() as u32,
                        end: src.len() as u32,
                    }
                } else {
                    error.span
                };

                vec![Diagnostic {
                    title: "Syntax error".into(),
                    text: extra.join("\n"),
                    location: Some(Location {
                        src,
                        path: path.clone(),
                        label: Label {
                            text: Some(label.to_string()),
                            span: location,
                        },
                        extra_labels: vec![],
                    }),
                }]
            },
            Error::Runtime { path, src, error } => {
                let (title, extra) = error.details();

                vec![Diagnostic {
                    title: title.into(),
                    text: String::new(),
                    location: Some(Location {
                        src,
                        path: path.clone(),
                        label: Label {
                            text: Some(extra.join("\n")),
                            span: error.span,
                        },
                        extra_labels: vec![],
                    }),
                }]
            },
            Error::StdIo { err } => {
                vec![Diagnostic {
                    title: "Standard IO error".into(),
                    text: format!("{err}"),
                    location: None,
                }]
            }
        }
    }
}
