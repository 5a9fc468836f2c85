use thiserror::Error;

use crate::{environment::prelude::{Value, ValueType}, utils::prelude::SrcSpan};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeErrorType {
    #[error("identifier not found: {name}")]
    UnboundIdentifier {
        name: String
    },
    #[error("type mismatch: {left} {operator} {right}")]
    TypeMismatch {
        operator: String,
        left: ValueType,
        right: ValueType
    },
    #[error("unknown operator: {left} {operator} {right}")]
    UnsupportedOperator {
        operator: String,
        left: ValueType,
        right: ValueType
    },
    #[error("unknown operator: {operator}{operand}")]
    InvalidPrefixOperand {
        operator: String,
        operand: ValueType
    },
    #[error("wrong number of arguments: expected {expected}, got {got}")]
    ArityMismatch {
        expected: usize,
        got: usize
    },
    #[error("not a function: {value_type}")]
    NotCallable {
        value_type: ValueType
    },
    #[error("index out of bounds: the length is {length} but the index is {index}")]
    IndexOutOfBounds {
        index: i64,
        length: usize
    },
    #[error("array index must be an integer, got {index_type}")]
    NonIntegerIndex {
        index_type: ValueType
    },
    #[error("index operator not supported: {value_type}")]
    NotIndexable {
        value_type: ValueType
    },
    #[error("key not found: {key}")]
    KeyNotFound {
        key: String
    },
    #[error("unusable as map key: {key_type}")]
    KeyNotHashable {
        key_type: ValueType
    },
    #[error("invalid assignment target: {target}")]
    InvalidAssignmentTarget {
        target: String
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow")]
    IntegerOverflow,
    #[error("argument to `{builtin}` not supported, got {got}")]
    UnsupportedArgument {
        builtin: &'static str,
        got: ValueType
    },
    #[error("maximum call depth of {limit} exceeded")]
    CallDepthExceeded {
        limit: usize
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{error}")]
pub struct RuntimeError {
    pub error: RuntimeErrorType,
    pub span: SrcSpan
}

impl RuntimeError {
    pub fn details(&self) -> (&'static str, Vec<String>) {
        let headline = match &self.error {
            RuntimeErrorType::UnboundIdentifier { .. } => "Unknown identifier",
            RuntimeErrorType::TypeMismatch { .. }
            | RuntimeErrorType::UnsupportedOperator { .. }
            | RuntimeErrorType::InvalidPrefixOperand { .. }
            | RuntimeErrorType::UnsupportedArgument { .. } => "Type error",
            RuntimeErrorType::ArityMismatch { .. } => "Wrong number of arguments",
            RuntimeErrorType::NotCallable { .. } => "Not callable",
            RuntimeErrorType::IndexOutOfBounds { .. }
            | RuntimeErrorType::NonIntegerIndex { .. }
            | RuntimeErrorType::NotIndexable { .. } => "Invalid index",
            RuntimeErrorType::KeyNotFound { .. }
            | RuntimeErrorType::KeyNotHashable { .. } => "Invalid map key",
            RuntimeErrorType::InvalidAssignmentTarget { .. } => "Invalid assignment",
            RuntimeErrorType::DivisionByZero
            | RuntimeErrorType::IntegerOverflow => "Arithmetic error",
            RuntimeErrorType::CallDepthExceeded { .. } => "Stack overflow"
        };

        (headline, vec![self.error.to_string()])
    }
}

impl From<RuntimeError> for Value {
    fn from(err: RuntimeError) -> Self {
        Value::Error { message: err.error.to_string() }
    }
}

pub fn runtime_error<T>(error: RuntimeErrorType, span: SrcSpan) -> Result<T, RuntimeError> {
    Err(RuntimeError { error, span })
}
