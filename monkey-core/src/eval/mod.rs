pub mod builtins;
pub mod error;

pub mod prelude {
    pub use super::{
        error::*,
        eval,
        eval_program,
        run,
        Evaluator,
        MAX_CALL_DEPTH
    };
}


use std::{cell::Cell, io::BufReader, path::PathBuf, rc::Rc};

use tracing::{debug, trace_span};
use utf8_chars::BufReadCharsExt;

use crate::{
    environment::prelude::{Env, Environment, Function, HashTable, NotHashable, ScopeKind, Value, NULL},
    lexer::prelude::{LexResult, Token},
    parser::prelude::{
        parse_program_from_stream, Block, Call, Expression, FunctionLiteral, If, Infix, Node,
        ParseError, Parser, Prefix, Primitive, Program, Statement
    },
    utils::prelude::{ensure_sufficient_stack, Error, SrcSpan}
};
use error::{runtime_error, RuntimeError, RuntimeErrorType};

pub const MAX_CALL_DEPTH: usize = 10_000;

thread_local! {
    static CALL_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Counts one active user function call for as long as it lives.
struct CallGuard;

impl CallGuard {
    fn enter(span: SrcSpan) -> Result<Self, RuntimeError> {
        CALL_DEPTH.with(|depth| {
            if depth.get() >= MAX_CALL_DEPTH {
                return runtime_error(
                    RuntimeErrorType::CallDepthExceeded { limit: MAX_CALL_DEPTH },
                    span
                );
            }

            depth.set(depth.get() + 1);

            Ok(CallGuard)
        })
    }
}

impl Drop for CallGuard {
    fn drop(&mut self) {
        CALL_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Evaluates one node. Statements yield `Null`.
pub fn eval(node: &Node, env: &Env) -> Result<Value, RuntimeError> {
    match node {
        Node::Statement(statement) => {
            eval_statement(statement, env)?;

            Ok(NULL)
        },
        Node::Expression(expression) => eval_expression(expression, env)
    }
}

/// Evaluates every node of `program` and yields the value of the last one,
/// or the value of a top-level `return`.
pub fn eval_program(program: &Program, env: &Env) -> Result<Value, RuntimeError> {
    let mut result = NULL;

    for node in &program.nodes {
        result = eval(node, env)?;

        let returned = env.borrow_mut().take_return();

        if let Some(value) = returned {
            return Ok(value);
        }
    }

    Ok(result)
}

fn eval_statement(statement: &Statement, env: &Env) -> Result<(), RuntimeError> {
    match statement {
        Statement::Let(let_) => {
            let value = eval_expression(&let_.value, env)?;

            env.borrow_mut().define(let_.name.value.clone(), value);
        },
        Statement::Return(return_) => {
            let value = match &return_.value {
                Some(value) => eval_expression(value, env)?,
                None => NULL
            };

            env.borrow_mut().set_return(value);
        },
        Statement::If(if_) => eval_if(if_, env)?
    }

    Ok(())
}

fn eval_if(if_: &If, env: &Env) -> Result<(), RuntimeError> {
    let condition = eval_expression(&if_.condition, env)?;

    let branch = if condition.is_truthy() {
        Some(&if_.consequence)
    } else {
        if_.alternative.as_ref()
    };

    if let Some(block) = branch {
        let scope = Environment::enclosed(env.clone(), ScopeKind::Block).into_shared();

        eval_block(block, &scope)?;
    }

    Ok(())
}

fn eval_block(block: &Block, env: &Env) -> Result<(), RuntimeError> {
    ensure_sufficient_stack(|| {
        for node in &block.nodes {
            eval(node, env)?;

            if env.borrow().is_returning() {
                break;
            }
        }

        Ok(())
    })
}

fn eval_expression(expression: &Expression, env: &Env) -> Result<Value, RuntimeError> {
    ensure_sufficient_stack(|| match expression {
        Expression::Identifier(identifier) => {
            let value = env.borrow().get(&identifier.value);

            match value {
                Some(value) => Ok(value),
                None => match builtins::lookup(&identifier.value) {
                    Some(builtin) => Ok(Value::Builtin(builtin)),
                    None => runtime_error(
                        RuntimeErrorType::UnboundIdentifier { name: identifier.value.clone() },
                        identifier.location
                    )
                }
            }
        },
        Expression::Primitive(primitive) => Ok(match primitive {
            Primitive::Int { value, .. } => Value::Integer { value: *value },
            Primitive::Bool { value, .. } => Value::from_bool(*value),
            Primitive::String { value, .. } => Value::String { value: value.clone() }
        }),
        Expression::Array(array) => {
            let elements = eval_expressions(&array.elements, env)?;

            Ok(Value::array(elements))
        },
        Expression::Map(map) => {
            let mut table = HashTable::new();

            for (key, value) in &map.pairs {
                let key_location = key.location();
                let key = eval_expression(key, env)?;
                let value = eval_expression(value, env)?;

                table.insert(key, value)
                    .map_err(|err| not_hashable(err, key_location))?;
            }

            Ok(Value::map(table))
        },
        Expression::Prefix(prefix) => eval_prefix(prefix, env),
        Expression::Infix(infix) if infix.operator == Token::Assign => eval_assignment(infix, env),
        Expression::Infix(infix) => {
            let left = eval_expression(&infix.left, env)?;
            let right = eval_expression(&infix.right, env)?;

            eval_infix(&infix.operator, left, right, infix.location)
        },
        Expression::Index(index) => {
            let target = eval_expression(&index.target, env)?;
            let key = eval_expression(&index.index, env)?;

            eval_index(target, key, index.location)
        },
        Expression::Function(function) => Ok(eval_function_literal(function, env)),
        Expression::Call(call) => eval_call(call, env)
    })
}

fn eval_expressions(expressions: &[Expression], env: &Env) -> Result<Vec<Value>, RuntimeError> {
    expressions.iter()
        .map(|expression| eval_expression(expression, env))
        .collect()
}

fn not_hashable(NotHashable(key_type): NotHashable, span: SrcSpan) -> RuntimeError {
    RuntimeError {
        error: RuntimeErrorType::KeyNotHashable { key_type },
        span
    }
}

fn eval_prefix(prefix: &Prefix, env: &Env) -> Result<Value, RuntimeError> {
    let operand = eval_expression(&prefix.expression, env)?;

    match (&prefix.operator, operand) {
        (Token::Plus, Value::Integer { value }) => Ok(Value::Integer { value }),
        (Token::Minus, Value::Integer { value }) => match value.checked_neg() {
            Some(value) => Ok(Value::Integer { value }),
            None => runtime_error(RuntimeErrorType::IntegerOverflow, prefix.location)
        },
        (Token::Bang, Value::Boolean { value }) => Ok(Value::from_bool(!value)),
        (operator, operand) => runtime_error(
            RuntimeErrorType::InvalidPrefixOperand {
                operator: operator.as_literal(),
                operand: operand.value_type()
            },
            prefix.location
        )
    }
}

fn eval_infix(operator: &Token, left: Value, right: Value, span: SrcSpan) -> Result<Value, RuntimeError> {
    let unsupported = |left: &Value, right: &Value| RuntimeError {
        error: RuntimeErrorType::UnsupportedOperator {
            operator: operator.as_literal(),
            left: left.value_type(),
            right: right.value_type()
        },
        span
    };

    match (&left, &right) {
        (Value::Integer { value: l }, Value::Integer { value: r }) => {
            eval_integer_infix(operator, *l, *r, span)?
                .ok_or_else(|| unsupported(&left, &right))
        },
        (Value::Boolean { value: l }, Value::Boolean { value: r }) => match operator {
            Token::Equal => Ok(Value::from_bool(l == r)),
            Token::NotEqual => Ok(Value::from_bool(l != r)),
            _ => Err(unsupported(&left, &right))
        },
        (Value::String { value: l }, Value::String { value: r }) => match operator {
            Token::Plus => Ok(Value::String { value: format!("{l}{r}") }),
            Token::Equal => Ok(Value::from_bool(l == r)),
            Token::NotEqual => Ok(Value::from_bool(l != r)),
            _ => Err(unsupported(&left, &right))
        },
        _ if left.value_type() == right.value_type() => Err(unsupported(&left, &right)),
        _ => runtime_error(
            RuntimeErrorType::TypeMismatch {
                operator: operator.as_literal(),
                left: left.value_type(),
                right: right.value_type()
            },
            span
        )
    }
}

/// `Ok(None)` when the operator does not apply to integers.
fn eval_integer_infix(operator: &Token, left: i64, right: i64, span: SrcSpan) -> Result<Option<Value>, RuntimeError> {
    let arithmetic = match operator {
        Token::Plus => left.checked_add(right),
        Token::Minus => left.checked_sub(right),
        Token::Asterisk => left.checked_mul(right),
        Token::Slash if right == 0 => return runtime_error(RuntimeErrorType::DivisionByZero, span),
        Token::Slash => left.checked_div(right),
        Token::LessThan => return Ok(Some(Value::from_bool(left < right))),
        Token::GreaterThan => return Ok(Some(Value::from_bool(left > right))),
        Token::Equal => return Ok(Some(Value::from_bool(left == right))),
        Token::NotEqual => return Ok(Some(Value::from_bool(left != right))),
        _ => return Ok(None)
    };

    match arithmetic {
        Some(value) => Ok(Some(Value::Integer { value })),
        None => runtime_error(RuntimeErrorType::IntegerOverflow, span)
    }
}

fn eval_assignment(infix: &Infix, env: &Env) -> Result<Value, RuntimeError> {
    let value = eval_expression(&infix.right, env)?;

    match infix.left.as_ref() {
        Expression::Identifier(identifier) => {
            let assigned = env.borrow_mut().assign(&identifier.value, value.clone());

            match assigned {
                Ok(()) => Ok(value),
                Err(_) => runtime_error(
                    RuntimeErrorType::UnboundIdentifier { name: identifier.value.clone() },
                    identifier.location
                )
            }
        },
        Expression::Index(index) => {
            let target = eval_expression(&index.target, env)?;
            let key = eval_expression(&index.index, env)?;

            assign_index(target, key, value.clone(), index.location)?;

            Ok(value)
        },
        target => runtime_error(
            RuntimeErrorType::InvalidAssignmentTarget { target: target.to_string() },
            target.location()
        )
    }
}

fn array_position(index: &Value, length: usize, span: SrcSpan) -> Result<usize, RuntimeError> {
    match index {
        Value::Integer { value } => usize::try_from(*value)
            .ok()
            .filter(|position| *position < length)
            .ok_or(RuntimeError {
                error: RuntimeErrorType::IndexOutOfBounds { index: *value, length },
                span
            }),
        other => runtime_error(
            RuntimeErrorType::NonIntegerIndex { index_type: other.value_type() },
            span
        )
    }
}

fn eval_index(target: Value, index: Value, span: SrcSpan) -> Result<Value, RuntimeError> {
    match target {
        Value::Array { elements } => {
            let elements = elements.borrow();
            let position = array_position(&index, elements.len(), span)?;

            Ok(elements[position].clone())
        },
        Value::Map { map } => {
            let found = map.borrow()
                .get(&index)
                .map(|value| value.cloned());

            match found {
                Ok(Some(value)) => Ok(value),
                Ok(None) => runtime_error(
                    RuntimeErrorType::KeyNotFound { key: index.to_string() },
                    span
                ),
                Err(err) => Err(not_hashable(err, span))
            }
        },
        other => runtime_error(
            RuntimeErrorType::NotIndexable { value_type: other.value_type() },
            span
        )
    }
}

fn assign_index(target: Value, index: Value, value: Value, span: SrcSpan) -> Result<(), RuntimeError> {
    match target {
        Value::Array { elements } => {
            let length = elements.borrow().len();
            let position = array_position(&index, length, span)?;

            elements.borrow_mut()[position] = value;

            Ok(())
        },
        Value::Map { map } => {
            let inserted = map.borrow_mut().insert(index, value);

            inserted
                .map(|_| ())
                .map_err(|err| not_hashable(err, span))
        },
        other => runtime_error(
            RuntimeErrorType::NotIndexable { value_type: other.value_type() },
            span
        )
    }
}

fn eval_function_literal(function: &FunctionLiteral, env: &Env) -> Value {
    Value::Function(Rc::new(Function {
        parameters: function.parameters.iter()
            .map(|parameter| parameter.value.clone())
            .collect(),
        body: function.body.clone(),
        env: env.clone()
    }))
}

fn eval_call(call: &Call, env: &Env) -> Result<Value, RuntimeError> {
    let callee = eval_expression(&call.function, env)?;
    let arguments = eval_expressions(&call.arguments, env)?;

    match callee {
        Value::Function(function) => call_function(&function, arguments, call.location),
        Value::Builtin(builtin) => (builtin.func)(arguments)
            .map_err(|error| RuntimeError { error, span: call.location }),
        other => runtime_error(
            RuntimeErrorType::NotCallable { value_type: other.value_type() },
            call.function.location()
        )
    }
}

fn call_function(function: &Function, arguments: Vec<Value>, span: SrcSpan) -> Result<Value, RuntimeError> {
    if function.parameters.len() != arguments.len() {
        return runtime_error(
            RuntimeErrorType::ArityMismatch {
                expected: function.parameters.len(),
                got: arguments.len()
            },
            span
        );
    }

    let _guard = CallGuard::enter(span)?;
    let _span = trace_span!("call", location = %span).entered();

    let mut scope = Environment::enclosed(function.env.clone(), ScopeKind::Function);

    for (name, value) in function.parameters.iter().zip(arguments) {
        scope.define(name.clone(), value);
    }

    let scope = scope.into_shared();

    eval_block(&function.body, &scope)?;

    let returned = scope.borrow_mut().take_return();

    Ok(returned.unwrap_or(NULL))
}

/// Drives a parser node by node against one long-lived environment.
pub struct Evaluator<T: Iterator<Item = LexResult>> {
    parser: Parser<T>,
    env: Env,
}

impl<T: Iterator<Item = LexResult>> Evaluator<T> {
    pub fn new(parser: Parser<T>, env: Env) -> Self {
        Self { parser, env }
    }

    /// Parses and evaluates the next node. Runtime errors come back as
    /// `Value::Error`; `Ok(None)` means the input is exhausted.
    pub fn eval_next(&mut self) -> Result<Option<Value>, ParseError> {
        let node = match self.parser.next_node()? {
            Some(node) => node,
            None => return Ok(None)
        };

        let value = match eval(&node, &self.env) {
            Ok(value) => value,
            Err(err) => {
                debug!(error = %err, span = %err.span, "evaluation failed");

                Value::from(err)
            }
        };

        // a top-level `return` has no function to stop
        let _ = self.env.borrow_mut().take_return();

        Ok(Some(value))
    }
}

/// Reads the file at `path`, parses it whole and evaluates it in `env`.
pub fn run(path: PathBuf, env: &Env) -> Result<Value, Error> {
    let file = match std::fs::File::open(&path) {
        Ok(file) => file,
        Err(err) => return Err(Error::StdIo { err: err.kind() })
    };

    let file_size = file.metadata()
        .map_err(|err| Error::StdIo { err: err.kind() })?.len() as usize;

    let mut src = String::with_capacity(file_size);
    let mut io_error = None;
    let mut reader = BufReader::new(file);

    let stream = reader.chars()
        .map_while(|c| match c {
            Ok(c) => {
                src.push(c);
                Some(c)
            },
            Err(err) => {
                io_error = Some(err.kind());
                None
            }
        });

    let parsed = parse_program_from_stream(stream);

    if let Some(err) = io_error {
        return Err(Error::StdIo { err });
    }

    let program = match parsed {
        Ok(program) => program,
        Err(error) => return Err(Error::Parse { path, src, error })
    };

    match eval_program(&program, env) {
        Ok(value) => Ok(value),
        Err(error) => Err(Error::Runtime { path, src, error })
    }
}
