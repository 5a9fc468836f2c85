use crate::utils::prelude::SrcSpan;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexicalErrorType {
    UnrecognizedToken { tok: char },
    UnknownEscape { ch: char },
    MissingStringEnd,
    IntegerOverflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexicalError {
    pub error: LexicalErrorType,
    pub location: SrcSpan
}

impl LexicalError {
    pub fn details(&self) -> (&'static str, Vec<String>) {
        match self.error {
            LexicalErrorType::UnrecognizedToken { tok } => {
                ("Unrecognized character", vec![format!("Found `{tok}` which does not start any token")])
            },
            LexicalErrorType::UnknownEscape { ch } => {
                ("Unknown escape sequence", vec![
                    format!("`\\{ch}` is not supported, expected one of: \\\" \\\\ \\n \\t")
                ])
            },
            LexicalErrorType::MissingStringEnd => {
                ("Unterminated string literal", vec!["Missing closing `\"`".to_string()])
            },
            LexicalErrorType::IntegerOverflow => {
                ("Integer literal is too large", vec![format!("Maximum value is {}", i64::MAX)])
            }
        }
    }
}
