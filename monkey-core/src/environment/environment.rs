use std::{cell::RefCell, collections::HashMap, rc::Rc};

use super::prelude::Value;

pub type Env = Rc<RefCell<Environment>>;

/// Where a scope came from. `Function` and `Root` scopes stop a pending
/// return; `Block` scopes forward it to their parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Root,
    Function,
    Block,
}

#[derive(Debug)]
pub struct Environment {
    pub store: HashMap<String, Value>,
    pub kind: ScopeKind,
    parent: Option<Env>,
    returned: Option<Value>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    pub fn new() -> Self {
        Self {
            store: HashMap::new(),
            kind: ScopeKind::Root,
            parent: None,
            returned: None
        }
    }

    pub fn enclosed(parent: Env, kind: ScopeKind) -> Self {
        Self {
            store: HashMap::new(),
            kind,
            parent: Some(parent),
            returned: None
        }
    }

    pub fn into_shared(self) -> Env {
        Rc::new(RefCell::new(self))
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        match self.store.get(name) {
            Some(value) => Some(value.clone()),
            None => self.parent.as_ref()
                .and_then(|parent| parent.borrow().get(name))
        }
    }

    /// Binds `name` in this scope only, shadowing any outer binding.
    pub fn define(&mut self, name: String, value: Value) {
        self.store.insert(name, value);
    }

    /// Overwrites the nearest existing binding of `name`.
    /// Hands `value` back if no scope in the chain owns the name.
    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), Value> {
        if let Some(slot) = self.store.get_mut(name) {
            *slot = value;

            return Ok(());
        }

        match &self.parent {
            Some(parent) => parent.borrow_mut().assign(name, value),
            None => Err(value)
        }
    }

    pub fn set_return(&mut self, value: Value) {
        match (self.kind, &self.parent) {
            (ScopeKind::Block, Some(parent)) => parent.borrow_mut().set_return(value),
            _ => self.returned = Some(value)
        }
    }

    pub fn is_returning(&self) -> bool {
        match (self.kind, &self.parent) {
            (ScopeKind::Block, Some(parent)) => parent.borrow().is_returning(),
            _ => self.returned.is_some()
        }
    }

    pub fn take_return(&mut self) -> Option<Value> {
        match (self.kind, &self.parent) {
            (ScopeKind::Block, Some(parent)) => parent.borrow_mut().take_return(),
            _ => self.returned.take()
        }
    }
}
