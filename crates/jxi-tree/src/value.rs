//! Values: scalars, collections, tags and link placeholders.

use std::fmt;

use crate::{Entity, Reference, SymbolicLink};

/// A jxi value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `null`
    Null,
    /// `true` / `false`
    Bool(bool),
    /// Signed 64-bit integer.
    Int(i64),
    /// Finite double-precision float.
    Float(f64),
    /// Quoted string, after escape processing.
    String(String),
    /// Backtick-delimited raw string. Distinct from [`Value::String`] so
    /// that encoding preserves the spelling.
    RawString(String),
    /// `[a b c]`
    List(Vec<Value>),
    /// `(a b c)`
    Set(Set),
    /// `{k: v}`
    Dict(Dict),
    /// A tag.
    Entity(Entity),
    /// An unresolved link. Only present before resolution finishes.
    Link(SymbolicLink),
    /// A resolved link to a composite value elsewhere in the document.
    Ref(Reference),
}

impl Value {
    /// Short name of the value's type, for messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::RawString(_) => "raw string",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Dict(_) => "dict",
            Value::Entity(_) => "tag",
            Value::Link(_) => "link",
            Value::Ref(_) => "reference",
        }
    }

    /// Whether this is a scalar (copied by value when linked to).
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Null
                | Value::Bool(_)
                | Value::Int(_)
                | Value::Float(_)
                | Value::String(_)
                | Value::RawString(_)
        )
    }

    /// Whether this value may be a set member. Link placeholders are
    /// admitted so they can be resolved in place.
    pub fn is_hashable(&self) -> bool {
        self.is_scalar() || matches!(self, Value::Link(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Float value; integers widen.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Text of a string or raw string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::RawString(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&Set> {
        match self {
            Value::Set(set) => Some(set),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Value::Dict(dict) => Some(dict),
            _ => None,
        }
    }

    pub fn as_dict_mut(&mut self) -> Option<&mut Dict> {
        match self {
            Value::Dict(dict) => Some(dict),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Value::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    /// Mutable access to a tag value.
    ///
    /// For a tag that is itself a child of another tag, go through
    /// [`Entity::modify_index`] on the parent so its group index follows
    /// any change of name.
    pub fn as_entity_mut(&mut self) -> Option<&mut Entity> {
        match self {
            Value::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    pub fn as_link(&self) -> Option<&SymbolicLink> {
        match self {
            Value::Link(link) => Some(link),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            Value::Ref(reference) => Some(reference),
            _ => None,
        }
    }

    /// Name of the tag, if this value is one.
    pub(crate) fn tag_name(&self) -> Option<&str> {
        self.as_entity().map(Entity::name)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Set> for Value {
    fn from(set: Set) -> Self {
        Value::Set(set)
    }
}

impl From<Dict> for Value {
    fn from(dict: Dict) -> Self {
        Value::Dict(dict)
    }
}

impl From<Entity> for Value {
    fn from(entity: Entity) -> Self {
        Value::Entity(entity)
    }
}

/// A dict key: a string or an integer.
///
/// Bare identifiers, quoted strings and raw strings all become
/// [`Key::String`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    String(String),
    Int(i64),
}

impl Key {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::String(s) => Some(s),
            Key::Int(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Key::Int(n) => Some(*n),
            Key::String(_) => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::String(s) => f.write_str(s),
            Key::Int(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::String(s.to_owned())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::String(s)
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Key::Int(n)
    }
}

impl From<i32> for Key {
    fn from(n: i32) -> Self {
        Key::Int(n.into())
    }
}

/// An insertion-ordered mapping with unique keys.
///
/// Re-inserting an existing key replaces the value but keeps the key's
/// original position. Equality ignores order.
#[derive(Debug, Clone, Default)]
pub struct Dict {
    entries: Vec<(Key, Value)>,
}

impl Dict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &Key) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &Key) -> Option<&mut Value> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &Key) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Insert or overwrite, returning the previous value.
    pub fn insert(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.get_mut(&key) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Remove a key, preserving the order of the rest.
    pub fn remove(&mut self, key: &Key) -> Option<Value> {
        let position = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(position).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl PartialEq for Dict {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K: Into<Key>, V: Into<Value>> FromIterator<(K, V)> for Dict {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut dict = Dict::new();
        for (k, v) in iter {
            dict.insert(k, v);
        }
        dict
    }
}

/// An unordered collection of distinct scalars, kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Set {
    members: Vec<Value>,
}

impl Set {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.members.contains(value)
    }

    /// Add a member. Returns `Ok(false)` when an equal member is already
    /// present, and hands the value back when it cannot be a member.
    pub fn insert(&mut self, value: Value) -> Result<bool, Value> {
        if !value.is_hashable() {
            return Err(value);
        }
        if !matches!(value, Value::Link(_)) && self.contains(&value) {
            return Ok(false);
        }
        self.members.push(value);
        Ok(true)
    }

    pub fn remove(&mut self, value: &Value) -> bool {
        match self.members.iter().position(|m| m == value) {
            Some(position) => {
                self.members.remove(position);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.members.iter()
    }

    pub(crate) fn has_link(&self, id: u32) -> bool {
        self.members
            .iter()
            .any(|m| matches!(m, Value::Link(link) if link.id == id))
    }

    /// Swap the placeholder with `id` for `value`, collapsing duplicates.
    pub(crate) fn replace_link(&mut self, id: u32, value: Value) -> bool {
        let Some(position) = self
            .members
            .iter()
            .position(|m| matches!(m, Value::Link(link) if link.id == id))
        else {
            return false;
        };
        self.members.remove(position);
        if !self.contains(&value) {
            self.members.insert(position, value);
        }
        true
    }
}

impl PartialEq for Set {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|m| other.contains(m))
    }
}

impl<'a> IntoIterator for &'a Set {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    #[test]
    fn test_dict_overwrite_keeps_position() {
        let mut dict = Dict::new();
        dict.insert("a", 1);
        dict.insert("b", 2);
        assert_eq!(dict.insert("a", 3), Some(Value::Int(1)));
        let keys: Vec<_> = dict.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(dict.get(&Key::from("a")), Some(&Value::Int(3)));
    }

    #[test]
    fn test_dict_int_and_string_keys_differ() {
        let dict: Dict = [(Key::Int(1), Value::Null), (Key::from("1"), Value::Bool(true))]
            .into_iter()
            .collect();
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.get(&Key::Int(1)), Some(&Value::Null));
    }

    #[test]
    fn test_dict_equality_ignores_order() {
        let a: Dict = [("x", 1), ("y", 2)].into_iter().collect();
        let b: Dict = [("y", 2), ("x", 1)].into_iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_dict_remove() {
        let mut dict: Dict = [("x", 1), ("y", 2), ("z", 3)].into_iter().collect();
        assert_eq!(dict.remove(&Key::from("y")), Some(Value::Int(2)));
        assert_eq!(dict.remove(&Key::from("y")), None);
        let keys: Vec<_> = dict.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, ["x", "z"]);
    }

    #[test]
    fn test_set_dedups() {
        let mut set = Set::new();
        assert_eq!(set.insert(Value::Int(1)), Ok(true));
        assert_eq!(set.insert(Value::Int(1)), Ok(false));
        assert_eq!(set.insert("a".into()), Ok(true));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_set_rejects_composites() {
        let mut set = Set::new();
        let list = Value::List(vec![Value::Int(1)]);
        assert_eq!(set.insert(list.clone()), Err(list));
        assert!(set.is_empty());
    }

    #[test]
    fn test_set_equality_ignores_order() {
        let mut a = Set::new();
        let mut b = Set::new();
        for n in [1, 2, 3] {
            a.insert(Value::Int(n)).unwrap();
        }
        for n in [3, 1, 2] {
            b.insert(Value::Int(n)).unwrap();
        }
        assert_eq!(a, b);
    }

    #[test]
    fn test_as_float_widens_ints() {
        assert_eq!(Value::Int(3).as_float(), Some(3.0));
        assert_eq!(Value::Float(0.5).as_float(), Some(0.5));
        assert_eq!(Value::Null.as_float(), None);
    }

    #[test]
    fn test_as_str_covers_raw_strings() {
        assert_eq!(Value::RawString("a`b".into()).as_str(), Some("a`b"));
        assert_eq!(Value::String("x".into()).as_str(), Some("x"));
        assert_eq!(Value::Int(1).as_str(), None);
    }
}
