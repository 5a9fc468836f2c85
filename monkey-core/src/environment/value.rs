use std::{cell::RefCell, fmt::{Debug, Display}, rc::Rc};

use rustc_hash::FxHashSet;

use crate::{eval::prelude::RuntimeErrorType, parser::prelude::Block, utils::prelude::ensure_sufficient_stack};

use super::prelude::{Env, HashKey, HashTable, Hashable};

pub const TRUE: Value = Value::Boolean { value: true };
pub const FALSE: Value = Value::Boolean { value: false };
pub const NULL: Value = Value::Null;

#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Integer {
        value: i64
    },
    Boolean {
        value: bool
    },
    String {
        value: String
    },
    Array {
        elements: Rc<RefCell<Vec<Value>>>
    },
    Map {
        map: Rc<RefCell<HashTable>>
    },
    Function(Rc<Function>),
    Builtin(Builtin),
    Error {
        message: String
    },
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Null => ValueType::Null,
            Self::Integer { .. } => ValueType::Integer,
            Self::Boolean { .. } => ValueType::Boolean,
            Self::String { .. } => ValueType::String,
            Self::Array { .. } => ValueType::Array,
            Self::Map { .. } => ValueType::Map,
            Self::Function(_) => ValueType::Function,
            Self::Builtin(_) => ValueType::Builtin,
            Self::Error { .. } => ValueType::Error
        }
    }

    pub fn array(elements: Vec<Value>) -> Self {
        Self::Array { elements: Rc::new(RefCell::new(elements)) }
    }

    pub fn map(map: HashTable) -> Self {
        Self::Map { map: Rc::new(RefCell::new(map)) }
    }

    pub fn from_bool(value: bool) -> Self {
        if value { TRUE } else { FALSE }
    }

    /// `None` for values that cannot key a map.
    pub fn hash_key(&self) -> Option<HashKey> {
        match self {
            Self::Integer { value } => Some(value.hash_key()),
            Self::Boolean { value } => Some(value.hash_key()),
            Self::String { value } => Some(value.as_str().hash_key()),
            _ => None
        }
    }

    pub fn is_truthy(&self) -> bool {
        !matches!(self, Self::Null | Self::Boolean { value: false })
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Integer { value: left }, Self::Integer { value: right }) => left == right,
            (Self::Boolean { value: left }, Self::Boolean { value: right }) => left == right,
            (Self::String { value: left }, Self::String { value: right }) => left == right,
            (Self::Array { elements: left }, Self::Array { elements: right }) => {
                Rc::ptr_eq(left, right) || *left.borrow() == *right.borrow()
            },
            (Self::Map { map: left }, Self::Map { map: right }) => {
                Rc::ptr_eq(left, right) || *left.borrow() == *right.borrow()
            },
            (Self::Function(left), Self::Function(right)) => Rc::ptr_eq(left, right),
            (Self::Builtin(left), Self::Builtin(right)) => left == right,
            (Self::Error { message: left }, Self::Error { message: right }) => left == right,
            _ => false
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.render(f, &mut FxHashSet::default())
    }
}

impl Value {
    /// `visiting` holds the arrays and maps currently being printed; one that
    /// contains itself prints as `[...]` or `{...}` on the inner visit.
    fn render(&self, f: &mut std::fmt::Formatter<'_>, visiting: &mut FxHashSet<*const ()>) -> std::fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Integer { value } => write!(f, "{value}"),
            Self::Boolean { value } => write!(f, "{value}"),
            Self::String { value } => write!(f, "{value:?}"),
            Self::Array { elements } => {
                let id = Rc::as_ptr(elements) as *const ();

                if !visiting.insert(id) {
                    return write!(f, "[...]");
                }

                let result = ensure_sufficient_stack(|| {
                    write!(f, "[")?;

                    for (i, element) in elements.borrow().iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }

                        element.render(f, visiting)?;
                    }

                    write!(f, "]")
                });

                visiting.remove(&id);
                result
            },
            Self::Map { map } => {
                let id = Rc::as_ptr(map) as *const ();

                if !visiting.insert(id) {
                    return write!(f, "{{...}}");
                }

                let result = ensure_sufficient_stack(|| {
                    write!(f, "{{")?;

                    for (i, (key, value)) in map.borrow().iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }

                        key.render(f, visiting)?;
                        write!(f, ": ")?;
                        value.render(f, visiting)?;
                    }

                    write!(f, "}}")
                });

                visiting.remove(&id);
                result
            },
            Self::Function(_) => write!(f, "fn"),
            Self::Builtin(_) => write!(f, "builtin"),
            Self::Error { message } => write!(f, "error: {message}")
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Null,
    Integer,
    Boolean,
    String,
    Array,
    Map,
    Function,
    Builtin,
    Error
}

impl Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Array => "array",
            Self::Map => "map",
            Self::Function => "function",
            Self::Builtin => "builtin",
            Self::Error => "error"
        };

        write!(f, "{name}")
    }
}

/// A user function together with the scope its literal was evaluated in.
pub struct Function {
    pub parameters: Vec<String>,
    pub body: Rc<Block>,
    pub env: Env,
}

// the captured scope may hold this very function
impl Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function")
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

pub type BuiltinFn = fn(Vec<Value>) -> Result<Value, RuntimeErrorType>;

#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

impl Debug for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}

impl PartialEq for Builtin {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}
