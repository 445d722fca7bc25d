//! Tags: name, attributes and children, with a per-name group index.

use std::collections::HashMap;

use crate::{TreeError, Value};

/// Attributes of a tag, in insertion order. Equality ignores order.
#[derive(Debug, Clone, Default)]
pub struct Attributes {
    entries: Vec<(String, Value)>,
}

impl Attributes {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.entries
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Set an attribute, returning the previous value. An existing
    /// attribute keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let name = name.into();
        let value = value.into();
        match self.get_mut(&name) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let position = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(position).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }
}

impl PartialEq for Attributes {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(n, v)| other.get(n) == Some(v))
    }
}

/// A tag.
///
/// Children are values: nested tags as well as literals written directly
/// in the tag body. For every name, the group index lists the positions of
/// child tags with that name in ascending order, so `get_all(name)[k]` is
/// the k-th such child in document order. Every mutation keeps it current.
///
/// The name is fixed at construction.
#[derive(Debug, Clone)]
pub struct Entity {
    name: String,
    pub(crate) attributes: Attributes,
    pub(crate) children: Vec<Value>,
    groups: HashMap<String, Vec<usize>>,
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Attributes::default(),
            children: Vec::new(),
            groups: HashMap::new(),
        }
    }

    /// Builder form of [`Entity::set_attr`].
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder form of [`Entity::append`].
    pub fn with_child(mut self, child: impl Into<Value>) -> Self {
        self.append(child);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // Attributes

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn attr_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.attributes.get_mut(name)
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.attributes.insert(name, value)
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<Value> {
        self.attributes.remove(name)
    }

    // Children

    pub fn children(&self) -> &[Value] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Child at `position`, whatever its kind.
    pub fn get_index(&self, position: usize) -> Option<&Value> {
        self.children.get(position)
    }

    /// First child tag called `name`.
    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.get_nth(name, 0)
    }

    /// The `n`-th child tag called `name`, counting from zero.
    pub fn get_nth(&self, name: &str, n: usize) -> Option<&Entity> {
        self.group_child(name, n).and_then(Value::as_entity)
    }

    /// All child tags called `name`, in document order.
    pub fn get_all(&self, name: &str) -> Vec<&Entity> {
        self.groups
            .get(name)
            .map(|positions| {
                positions
                    .iter()
                    .filter_map(|&p| self.children[p].as_entity())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of child tags called `name`.
    pub fn count(&self, name: &str) -> usize {
        self.groups.get(name).map_or(0, Vec::len)
    }

    /// Position among the children of the first child equal to `child`.
    pub fn position(&self, child: &Value) -> Option<usize> {
        self.children.iter().position(|c| c == child)
    }

    pub(crate) fn group_child(&self, name: &str, n: usize) -> Option<&Value> {
        let position = *self.groups.get(name)?.get(n)?;
        self.children.get(position)
    }

    // Mutation

    /// Insert `child` before `position`; `position == len()` appends.
    pub fn insert(&mut self, position: usize, child: impl Into<Value>) -> Result<(), TreeError> {
        let len = self.children.len();
        if position > len {
            return Err(TreeError::IndexOutOfRange {
                index: position,
                len,
            });
        }
        let child = child.into();
        for positions in self.groups.values_mut() {
            for p in positions.iter_mut().filter(|p| **p >= position) {
                *p += 1;
            }
        }
        if let Some(name) = child.tag_name() {
            let group = self.groups.entry(name.to_owned()).or_default();
            let at = group.partition_point(|&p| p < position);
            group.insert(at, position);
        }
        self.children.insert(position, child);
        Ok(())
    }

    pub fn append(&mut self, child: impl Into<Value>) {
        let child = child.into();
        if let Some(name) = child.tag_name() {
            self.groups
                .entry(name.to_owned())
                .or_default()
                .push(self.children.len());
        }
        self.children.push(child);
    }

    pub fn extend<I>(&mut self, children: I)
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        for child in children {
            self.append(child);
        }
    }

    /// Remove and return the child at `position`.
    pub fn remove(&mut self, position: usize) -> Result<Value, TreeError> {
        let len = self.children.len();
        if position >= len {
            return Err(TreeError::IndexOutOfRange {
                index: position,
                len,
            });
        }
        let child = self.children.remove(position);
        if let Some(name) = child.tag_name()
            && let Some(group) = self.groups.get_mut(name)
        {
            group.retain(|&p| p != position);
            if group.is_empty() {
                self.groups.remove(name);
            }
        }
        for positions in self.groups.values_mut() {
            for p in positions.iter_mut().filter(|p| **p > position) {
                *p -= 1;
            }
        }
        Ok(child)
    }

    /// Replace the child at `position`, returning the old one.
    pub fn replace(&mut self, position: usize, child: impl Into<Value>) -> Result<Value, TreeError> {
        let old = self.remove(position)?;
        self.insert(position, child)?;
        Ok(old)
    }

    /// Remove the first child tag equal to `child`.
    pub fn remove_child(&mut self, child: &Entity) -> Option<Entity> {
        let position = *self
            .groups
            .get(child.name())?
            .iter()
            .find(|&&p| self.children[p].as_entity() == Some(child))?;
        match self.remove(position) {
            Ok(Value::Entity(entity)) => Some(entity),
            _ => None,
        }
    }

    /// Remove every child tag called `name`, returning them in document
    /// order.
    pub fn remove_all(&mut self, name: &str) -> Vec<Entity> {
        let Some(positions) = self.groups.remove(name) else {
            return Vec::new();
        };
        let mut removed = Vec::with_capacity(positions.len());
        for &position in positions.iter().rev() {
            if let Value::Entity(entity) = self.children.remove(position) {
                removed.push(entity);
            }
        }
        removed.reverse();
        self.reindex();
        removed
    }

    /// Run `f` on the first child tag called `name`.
    pub fn modify<R>(&mut self, name: &str, f: impl FnOnce(&mut Entity) -> R) -> Option<R> {
        let position = *self.groups.get(name)?.first()?;
        self.modify_index(position, |child| child.as_entity_mut().map(f))
            .flatten()
    }

    /// Run `f` on the child at `position`. The group index is rebuilt if
    /// `f` changes which tag, if any, sits there.
    pub fn modify_index<R>(&mut self, position: usize, f: impl FnOnce(&mut Value) -> R) -> Option<R> {
        let child = self.children.get_mut(position)?;
        let before = child.tag_name().map(str::to_owned);
        let result = f(child);
        if child.tag_name() != before.as_deref() {
            self.reindex();
        }
        Some(result)
    }

    fn reindex(&mut self) {
        self.groups.clear();
        for (position, child) in self.children.iter().enumerate() {
            if let Some(name) = child.tag_name() {
                self.groups.entry(name.to_owned()).or_default().push(position);
            }
        }
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.attributes == other.attributes
            && self.children == other.children
    }
}
