use crate::environment::prelude::{Builtin, Value, NULL};

use super::error::RuntimeErrorType;

const BUILTINS: &[Builtin] = &[
    Builtin { name: "len", func: len },
    Builtin { name: "first", func: first },
    Builtin { name: "last", func: last },
    Builtin { name: "rest", func: rest },
    Builtin { name: "push", func: push },
];

pub fn lookup(name: &str) -> Option<Builtin> {
    BUILTINS.iter()
        .find(|builtin| builtin.name == name)
        .copied()
}

fn expect_arity(args: &[Value], expected: usize) -> Result<(), RuntimeErrorType> {
    match args.len() == expected {
        true => Ok(()),
        false => Err(RuntimeErrorType::ArityMismatch { expected, got: args.len() })
    }
}

/// Copies the elements out of an array argument.
fn array_arg(builtin: &'static str, arg: &Value) -> Result<Vec<Value>, RuntimeErrorType> {
    match arg {
        Value::Array { elements } => Ok(elements.borrow().clone()),
        other => Err(RuntimeErrorType::UnsupportedArgument { builtin, got: other.value_type() })
    }
}

// strings are measured in bytes
fn len(args: Vec<Value>) -> Result<Value, RuntimeErrorType> {
    expect_arity(&args, 1)?;

    let length = match &args[0] {
        Value::Array { elements } => elements.borrow().len(),
        Value::String { value } => value.len(),
        other => return Err(RuntimeErrorType::UnsupportedArgument {
            builtin: "len",
            got: other.value_type()
        })
    };

    i64::try_from(length)
        .map(|value| Value::Integer { value })
        .map_err(|_| RuntimeErrorType::IntegerOverflow)
}

fn first(args: Vec<Value>) -> Result<Value, RuntimeErrorType> {
    expect_arity(&args, 1)?;

    let elements = array_arg("first", &args[0])?;

    Ok(elements.into_iter().next().unwrap_or(NULL))
}

fn last(args: Vec<Value>) -> Result<Value, RuntimeErrorType> {
    expect_arity(&args, 1)?;

    let elements = array_arg("last", &args[0])?;

    Ok(elements.into_iter().last().unwrap_or(NULL))
}

fn rest(args: Vec<Value>) -> Result<Value, RuntimeErrorType> {
    expect_arity(&args, 1)?;

    let elements = array_arg("rest", &args[0])?;

    match elements.split_first() {
        Some((_, tail)) => Ok(Value::array(tail.to_vec())),
        None => Ok(NULL)
    }
}

fn push(args: Vec<Value>) -> Result<Value, RuntimeErrorType> {
    expect_arity(&args, 2)?;

    let mut elements = array_arg("push", &args[0])?;
    elements.push(args[1].clone());

    Ok(Value::array(elements))
}
