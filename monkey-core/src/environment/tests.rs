use pretty_assertions::assert_eq;

use super::prelude::{Environment, HashTable, NotHashable, ScopeKind, Value, ValueType, FALSE, NULL, TRUE};

fn int(value: i64) -> Value {
    Value::Integer { value }
}

fn string(value: &str) -> Value {
    Value::String { value: value.into() }
}

#[test]
fn test_get_define() {
    let mut env = Environment::new();

    assert_eq!(env.get("foo"), None);

    env.define("foo".into(), int(1));

    assert_eq!(env.get("foo"), Some(int(1)));
}

#[test]
fn test_nested_scopes() {
    let root = Environment::new().into_shared();
    root.borrow_mut().define("foo".into(), int(1));
    root.borrow_mut().define("bar".into(), int(2));

    let mut inner = Environment::enclosed(root.clone(), ScopeKind::Block);
    inner.define("bar".into(), int(20));

    assert_eq!(inner.get("foo"), Some(int(1)));
    assert_eq!(inner.get("bar"), Some(int(20)));
    assert_eq!(root.borrow().get("bar"), Some(int(2)));
}

#[test]
fn test_assign_walks_to_owner() {
    let root = Environment::new().into_shared();
    root.borrow_mut().define("x".into(), int(1));

    let middle = Environment::enclosed(root.clone(), ScopeKind::Function).into_shared();
    let mut inner = Environment::enclosed(middle.clone(), ScopeKind::Block);

    assert_eq!(inner.assign("x", int(2)), Ok(()));
    assert_eq!(root.borrow().get("x"), Some(int(2)));
    assert!(middle.borrow().store.is_empty());
    assert!(inner.store.is_empty());
}

#[test]
fn test_assign_never_creates() {
    let root = Environment::new().into_shared();
    let mut inner = Environment::enclosed(root.clone(), ScopeKind::Block);

    assert_eq!(inner.assign("missing", int(5)), Err(int(5)));
    assert_eq!(inner.get("missing"), None);
    assert_eq!(root.borrow().get("missing"), None);
}

#[test]
fn test_return_stops_at_function_boundary() {
    let root = Environment::new().into_shared();
    let call = Environment::enclosed(root.clone(), ScopeKind::Function).into_shared();
    let branch = Environment::enclosed(call.clone(), ScopeKind::Block).into_shared();
    let mut nested = Environment::enclosed(branch.clone(), ScopeKind::Block);

    assert!(!nested.is_returning());

    nested.set_return(int(30));

    assert!(nested.is_returning());
    assert!(branch.borrow().is_returning());
    assert!(call.borrow().is_returning());
    assert!(!root.borrow().is_returning());

    assert_eq!(call.borrow_mut().take_return(), Some(int(30)));
    assert!(!nested.is_returning());
    assert_eq!(call.borrow_mut().take_return(), None);
}

#[test]
fn test_root_holds_its_own_return() {
    let mut root = Environment::new();

    assert_eq!(root.take_return(), None);

    root.set_return(int(3));

    assert!(root.is_returning());
    assert_eq!(root.take_return(), Some(int(3)));
    assert!(!root.is_returning());
}

#[test]
fn test_hash_table_overwrites_equal_keys() -> Result<(), NotHashable> {
    let mut table = HashTable::new();

    assert_eq!(table.insert(int(1), int(1))?, None);
    assert_eq!(table.insert(int(1), int(2))?, Some(int(1)));

    assert_eq!(table.len(), 1);
    assert_eq!(table.get(&int(1))?, Some(&int(2)));

    Ok(())
}

#[test]
fn test_hash_table_keys_are_typed() -> Result<(), NotHashable> {
    let mut table = HashTable::new();

    table.insert(int(0), int(1))?;
    table.insert(FALSE, int(2))?;
    table.insert(int(1), int(3))?;
    table.insert(TRUE, int(4))?;
    table.insert(string("1"), int(5))?;

    assert_eq!(table.len(), 5);
    assert_eq!(table.get(&int(0))?, Some(&int(1)));
    assert_eq!(table.get(&FALSE)?, Some(&int(2)));
    assert_eq!(table.get(&int(1))?, Some(&int(3)));
    assert_eq!(table.get(&TRUE)?, Some(&int(4)));
    assert_eq!(table.get(&string("1"))?, Some(&int(5)));
    assert_eq!(table.get(&string("0"))?, None);

    Ok(())
}

#[test]
fn test_hash_table_rejects_unhashable() {
    let mut table = HashTable::new();
    let array = Value::array(vec![]);

    assert_eq!(table.insert(array.clone(), int(1)), Err(NotHashable(ValueType::Array)));
    assert_eq!(table.get(&array), Err(NotHashable(ValueType::Array)));
    assert_eq!(table.get(&NULL), Err(NotHashable(ValueType::Null)));
    assert!(table.is_empty());
}

#[test]
fn test_hash_key_per_type() {
    assert_eq!(int(0).hash_key().map(|key| key.value_type), Some(ValueType::Integer));
    assert_ne!(int(0).hash_key(), FALSE.hash_key());
    assert_eq!(string("a").hash_key(), string("a").hash_key());
    assert_eq!(Value::map(HashTable::new()).hash_key(), None);
}

#[test]
fn test_value_rendering() -> Result<(), NotHashable> {
    let mut table = HashTable::new();
    table.insert(string("k"), Value::array(vec![int(1), TRUE]))?;

    let cases = [
        (NULL, ""),
        (int(-7), "-7"),
        (FALSE, "false"),
        (string("foo"), "\"foo\""),
        (string("a\"b\n"), "\"a\\\"b\\n\""),
        (Value::array(vec![int(1), string("x"), Value::array(vec![])]), "[1, \"x\", []]"),
        (Value::map(table), "{\"k\": [1, true]}"),
        (Value::map(HashTable::new()), "{}"),
        (Value::Error { message: "boom".into() }, "error: boom"),
    ];

    for (value, expected) in cases {
        assert_eq!(value.to_string(), expected);
    }

    Ok(())
}

#[test]
fn test_value_equality() {
    assert_eq!(Value::array(vec![int(1)]), Value::array(vec![int(1)]));
    assert_ne!(Value::array(vec![int(1)]), Value::array(vec![int(2)]));
    assert_ne!(int(0), FALSE);
    assert_ne!(NULL, FALSE);
    assert_eq!(string("a"), string("a"));
}

#[test]
fn test_truthiness() {
    assert!(!NULL.is_truthy());
    assert!(!FALSE.is_truthy());
    assert!(TRUE.is_truthy());
    assert!(int(0).is_truthy());
    assert!(string("").is_truthy());
    assert!(Value::array(vec![]).is_truthy());
}
