//! Shared-ownership JSON value tree.
//!
//! A [`Value`] is a lightweight handle to a reference-counted node.
//! `Clone` copies the handle, so two clones alias the same node and
//! mutations through one are visible through the other;
//! [`Value::deep_clone`] is the explicit deep copy. Objects keep their
//! entries sorted by key, so iteration order is the key order, never
//! insertion order.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::error::Error;

/// Type tag of a JSON value.
///
/// The declaration order defines the type rank used by [`compare`]:
/// values of different types order by this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum JsonType {
    Null,
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

#[derive(Debug)]
enum Node {
    Null,
    Boolean(bool),
    Integer(i64),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

fn node_type(node: &Node) -> JsonType {
    match node {
        Node::Null => JsonType::Null,
        Node::Boolean(_) => JsonType::Boolean,
        Node::Integer(_) => JsonType::Integer,
        Node::Number(_) => JsonType::Number,
        Node::String(_) => JsonType::String,
        Node::Array(_) => JsonType::Array,
        Node::Object(_) => JsonType::Object,
    }
}

// Null/True/False never allocate per use: every handle aliases one
// immutable per-thread node. No mutating accessor matches these
// variants, so sharing is safe.
thread_local! {
    static NULL: Value = Value::new(Node::Null);
    static TRUE: Value = Value::new(Node::Boolean(true));
    static FALSE: Value = Value::new(Node::Boolean(false));
}

/// Handle to a shared JSON node.
pub struct Value(Rc<RefCell<Node>>);

/// Aliasing copy: the clone refers to the same node.
impl Clone for Value {
    fn clone(&self) -> Self {
        Value(Rc::clone(&self.0))
    }
}

/// The default value is an empty object, not null. This is what lets
/// `entry` chains vivify nested objects.
impl Default for Value {
    fn default() -> Self {
        Value::object()
    }
}

impl Value {
    fn new(node: Node) -> Value {
        Value(Rc::new(RefCell::new(node)))
    }

    /// The distinguished null value.
    pub fn null() -> Value {
        NULL.with(Value::clone)
    }

    /// A fresh, empty array.
    pub fn array() -> Value {
        Value::new(Node::Array(Vec::new()))
    }

    /// A fresh, empty object.
    pub fn object() -> Value {
        Value::new(Node::Object(BTreeMap::new()))
    }

    pub fn json_type(&self) -> JsonType {
        node_type(&self.0.borrow())
    }

    pub fn is_null(&self) -> bool {
        self.json_type() == JsonType::Null
    }

    pub fn is_boolean(&self) -> bool {
        self.json_type() == JsonType::Boolean
    }

    pub fn is_integer(&self) -> bool {
        self.json_type() == JsonType::Integer
    }

    pub fn is_number(&self) -> bool {
        self.json_type() == JsonType::Number
    }

    pub fn is_string(&self) -> bool {
        self.json_type() == JsonType::String
    }

    pub fn is_array(&self) -> bool {
        self.json_type() == JsonType::Array
    }

    pub fn is_object(&self) -> bool {
        self.json_type() == JsonType::Object
    }

    fn wrong_type(&self, expected: JsonType) -> Error {
        Error::WrongType { expected, actual: self.json_type() }
    }

    /// Boolean contents, or a type error.
    pub fn to_bool(&self) -> Result<bool, Error> {
        match &*self.0.borrow() {
            Node::Boolean(b) => Ok(*b),
            _ => Err(self.wrong_type(JsonType::Boolean)),
        }
    }

    /// Integer contents, or a type error. Never coerces from `Number`.
    pub fn to_integer(&self) -> Result<i64, Error> {
        match &*self.0.borrow() {
            Node::Integer(i) => Ok(*i),
            _ => Err(self.wrong_type(JsonType::Integer)),
        }
    }

    /// Floating-point contents, or a type error. Never coerces from `Integer`.
    pub fn to_number(&self) -> Result<f64, Error> {
        match &*self.0.borrow() {
            Node::Number(n) => Ok(*n),
            _ => Err(self.wrong_type(JsonType::Number)),
        }
    }

    /// String contents (cloned out of the shared node), or a type error.
    pub fn to_text(&self) -> Result<String, Error> {
        match &*self.0.borrow() {
            Node::String(s) => Ok(s.clone()),
            _ => Err(self.wrong_type(JsonType::String)),
        }
    }

    /// Element count of an array or entry count of an object.
    pub fn len(&self) -> Result<usize, Error> {
        match &*self.0.borrow() {
            Node::Array(items) => Ok(items.len()),
            Node::Object(map) => Ok(map.len()),
            _ => Err(self.wrong_type(JsonType::Array)),
        }
    }

    pub fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.len()? == 0)
    }

    /// Handle to the array element at `index`. Indexing past the end is
    /// an error; arrays never auto-extend.
    pub fn at(&self, index: usize) -> Result<Value, Error> {
        match &*self.0.borrow() {
            Node::Array(items) => items
                .get(index)
                .cloned()
                .ok_or(Error::IndexOutOfBounds { index, len: items.len() }),
            _ => Err(self.wrong_type(JsonType::Array)),
        }
    }

    /// Replace the array slot at `index` with a new handle.
    pub fn set_at(&self, index: usize, value: impl Into<Value>) -> Result<(), Error> {
        match &mut *self.0.borrow_mut() {
            Node::Array(items) => {
                let len = items.len();
                match items.get_mut(index) {
                    Some(slot) => {
                        *slot = value.into();
                        Ok(())
                    }
                    None => Err(Error::IndexOutOfBounds { index, len }),
                }
            }
            other => Err(Error::WrongType { expected: JsonType::Array, actual: node_type(other) }),
        }
    }

    /// Append to an array.
    pub fn push(&self, value: impl Into<Value>) -> Result<(), Error> {
        match &mut *self.0.borrow_mut() {
            Node::Array(items) => {
                items.push(value.into());
                Ok(())
            }
            other => Err(Error::WrongType { expected: JsonType::Array, actual: node_type(other) }),
        }
    }

    /// Snapshot of the array's element handles.
    pub fn items(&self) -> Result<Vec<Value>, Error> {
        match &*self.0.borrow() {
            Node::Array(items) => Ok(items.clone()),
            _ => Err(self.wrong_type(JsonType::Array)),
        }
    }

    /// Read accessor: the value under `key`, or null when absent.
    /// Never mutates the object.
    pub fn get(&self, key: &str) -> Result<Value, Error> {
        match &*self.0.borrow() {
            Node::Object(map) => Ok(map.get(key).cloned().unwrap_or_else(Value::null)),
            _ => Err(self.wrong_type(JsonType::Object)),
        }
    }

    /// Like [`Value::get`], but an absent key is a reference error.
    pub fn require(&self, key: &str) -> Result<Value, Error> {
        match &*self.0.borrow() {
            Node::Object(map) => map
                .get(key)
                .cloned()
                .ok_or_else(|| Error::MissingKey { key: key.to_owned() }),
            _ => Err(self.wrong_type(JsonType::Object)),
        }
    }

    /// Mutable accessor: the value under `key`, inserting a fresh empty
    /// object first when the key is absent (auto-vivification).
    pub fn entry(&self, key: &str) -> Result<Value, Error> {
        match &mut *self.0.borrow_mut() {
            Node::Object(map) => Ok(map
                .entry(key.to_owned())
                .or_insert_with(Value::object)
                .clone()),
            other => Err(Error::WrongType { expected: JsonType::Object, actual: node_type(other) }),
        }
    }

    /// Bind `key` to a new handle, replacing any previous binding.
    pub fn insert(&self, key: &str, value: impl Into<Value>) -> Result<(), Error> {
        match &mut *self.0.borrow_mut() {
            Node::Object(map) => {
                map.insert(key.to_owned(), value.into());
                Ok(())
            }
            other => Err(Error::WrongType { expected: JsonType::Object, actual: node_type(other) }),
        }
    }

    pub fn contains_key(&self, key: &str) -> Result<bool, Error> {
        match &*self.0.borrow() {
            Node::Object(map) => Ok(map.contains_key(key)),
            _ => Err(self.wrong_type(JsonType::Object)),
        }
    }

    /// Snapshot of the object's entries in key order.
    pub fn entries(&self) -> Result<Vec<(String, Value)>, Error> {
        match &*self.0.borrow() {
            Node::Object(map) => Ok(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
            _ => Err(self.wrong_type(JsonType::Object)),
        }
    }

    /// Deep, independent copy of the whole tree.
    pub fn deep_clone(&self) -> Value {
        match &*self.0.borrow() {
            Node::Null => Value::null(),
            Node::Boolean(b) => Value::from(*b),
            Node::Integer(i) => Value::from(*i),
            Node::Number(n) => Value::from(*n),
            Node::String(s) => Value::from(s.clone()),
            Node::Array(items) => {
                Value::new(Node::Array(items.iter().map(Value::deep_clone).collect()))
            }
            Node::Object(map) => Value::new(Node::Object(
                map.iter().map(|(k, v)| (k.clone(), v.deep_clone())).collect(),
            )),
        }
    }

    /// Whether two handles refer to the same node.
    pub fn same_node(&self, other: &Value) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        if value {
            TRUE.with(Value::clone)
        } else {
            FALSE.with(Value::clone)
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::new(Node::Integer(value))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::new(Node::Integer(value.into()))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::new(Node::Number(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::new(Node::String(value.to_owned()))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::new(Node::String(value))
    }
}

/// Total order over values: type tag first, then scalar contents, then
/// lexicographic element/entry comparison.
pub fn compare(lhs: &Value, rhs: &Value) -> Ordering {
    let type_order = lhs.json_type().cmp(&rhs.json_type());
    if type_order != Ordering::Equal {
        return type_order;
    }

    let a = lhs.0.borrow();
    let b = rhs.0.borrow();
    match (&*a, &*b) {
        (Node::Null, Node::Null) => Ordering::Equal,
        (Node::Boolean(x), Node::Boolean(y)) => x.cmp(y),
        (Node::Integer(x), Node::Integer(y)) => x.cmp(y),
        // NaN compares equal to everything; stringify cannot represent it anyway.
        (Node::Number(x), Node::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Node::String(x), Node::String(y)) => x.cmp(y),
        (Node::Array(x), Node::Array(y)) => {
            let size_order = x.len().cmp(&y.len());
            if size_order != Ordering::Equal {
                return size_order;
            }
            for (xi, yi) in x.iter().zip(y) {
                let c = compare(xi, yi);
                if c != Ordering::Equal {
                    return c;
                }
            }
            Ordering::Equal
        }
        (Node::Object(x), Node::Object(y)) => {
            let size_order = x.len().cmp(&y.len());
            if size_order != Ordering::Equal {
                return size_order;
            }
            for ((xk, xv), (yk, yv)) in x.iter().zip(y) {
                let c = xk.cmp(yk);
                if c != Ordering::Equal {
                    return c;
                }
                let c = compare(xv, yv);
                if c != Ordering::Equal {
                    return c;
                }
            }
            Ordering::Equal
        }
        // Type tags already matched.
        _ => Ordering::Equal,
    }
}

impl Value {
    /// Method form of [`compare`].
    pub fn compare(&self, other: &Value) -> Ordering {
        compare(self, other)
    }
}

/// Structural equality. Same-node handles short-circuit; otherwise
/// values of different types are never equal, even numerically equal
/// `Integer` vs `Number`.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.same_node(other) || compare(self, other) == Ordering::Equal
    }
}

impl PartialEq<bool> for Value {
    fn eq(&self, other: &bool) -> bool {
        self.to_bool().map(|b| b == *other).unwrap_or(false)
    }
}

impl PartialEq<i64> for Value {
    fn eq(&self, other: &i64) -> bool {
        self.to_integer().map(|i| i == *other).unwrap_or(false)
    }
}

impl PartialEq<f64> for Value {
    fn eq(&self, other: &f64) -> bool {
        self.to_number().map(|n| n == *other).unwrap_or(false)
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        self.to_text().map(|s| s == *other).unwrap_or(false)
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.borrow().fmt(f)
    }
}
