//! The document root, path lookup and placeholder write-back.

use std::fmt;

use crate::{Entity, Key, Reference, Step, SymbolicLink, Value};

/// References are canonical, so following one never needs more than a
/// couple of hops; anything deeper was built by hand and is cyclic.
const MAX_REFERENCE_DEPTH: usize = 64;

/// A parsed jxi document: the ordered top-level values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    elements: Vec<Value>,
}

/// Outcome of a successful path walk.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<'a> {
    /// The path reached `value`; `path` is its canonical spelling.
    Found { value: &'a Value, path: Vec<Step> },
    /// The path ran into a link that has not been resolved yet.
    Pending(&'a SymbolicLink),
}

/// Why a path walk failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupErrorKind {
    /// The named tag, attribute, index or key does not exist.
    NotFound(String),
    /// The step does not apply to the value it was taken from.
    TypeMismatch(String),
    /// A reference on the way no longer points anywhere.
    DanglingReference(String),
    /// References chained deeper than any canonical path allows.
    ReferenceDepth,
}

impl fmt::Display for LookupErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupErrorKind::NotFound(msg) => write!(f, "not found: {msg}"),
            LookupErrorKind::TypeMismatch(msg) => write!(f, "type mismatch: {msg}"),
            LookupErrorKind::DanglingReference(reference) => {
                write!(f, "reference {reference} no longer resolves")
            }
            LookupErrorKind::ReferenceDepth => f.write_str("references nest too deeply"),
        }
    }
}

/// A failed path walk, with the zero-based step that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupError {
    pub step: usize,
    pub kind: LookupErrorKind,
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (step {})", self.kind, self.step + 1)
    }
}

impl std::error::Error for LookupError {}

/// One step of the structural location of a value, used to write a
/// resolved link back where its placeholder was parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Position in the top-level elements, a list, or a tag's children.
    Index(usize),
    /// A tag attribute.
    Attr(String),
    /// A dict entry.
    Key(Key),
    /// The set member that is the placeholder with this link id.
    Member(u32),
}

#[derive(Clone, Copy)]
enum Node<'a> {
    Root(&'a [Value]),
    Value(&'a Value),
    /// A pending link reached through a reference.
    Pending(&'a SymbolicLink),
}

impl<'a> Node<'a> {
    /// Values addressable by integer position.
    fn sequence(self) -> Option<&'a [Value]> {
        match self {
            Node::Root(items) => Some(items),
            Node::Value(Value::List(items)) => Some(items),
            Node::Value(Value::Entity(entity)) => Some(entity.children()),
            Node::Value(_) | Node::Pending(_) => None,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Node::Root(_) => "the document root",
            Node::Value(value) => value.type_name(),
            Node::Pending(_) => "link",
        }
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_elements(elements: Vec<Value>) -> Self {
        Self { elements }
    }

    pub fn elements(&self) -> &[Value] {
        &self.elements
    }

    pub fn elements_mut(&mut self) -> &mut Vec<Value> {
        &mut self.elements
    }

    pub fn into_elements(self) -> Vec<Value> {
        self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn push(&mut self, value: impl Into<Value>) {
        self.elements.push(value.into());
    }

    pub fn get_index(&self, position: usize) -> Option<&Value> {
        self.elements.get(position)
    }

    /// First top-level tag called `name`.
    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.get_all(name).into_iter().next()
    }

    /// All top-level tags called `name`, in document order.
    pub fn get_all(&self, name: &str) -> Vec<&Entity> {
        self.elements
            .iter()
            .filter_map(Value::as_entity)
            .filter(|e| e.name() == name)
            .collect()
    }

    /// Walk `steps` from the top-level elements.
    ///
    /// References met on the way are followed; the returned path is
    /// spelled relative to the document root with explicit group indices.
    pub fn lookup(&self, steps: &[Step]) -> Result<Lookup<'_>, LookupError> {
        self.walk(steps, 0)
    }

    /// Dereference `value` if it is a [`Value::Ref`]. Returns `None` for a
    /// reference that no longer resolves.
    pub fn follow<'a>(&'a self, value: &'a Value) -> Option<&'a Value> {
        match value {
            Value::Ref(reference) => match self.lookup(reference.steps()) {
                Ok(Lookup::Found { value, .. }) => Some(value),
                _ => None,
            },
            other => Some(other),
        }
    }

    /// Like [`Document::lookup`], for a path written at `origin`.
    ///
    /// When the first step names a tag that does not exist at the top
    /// level, the tags enclosing `origin` are searched instead, innermost
    /// first; the first one that has such a child anchors the walk. The
    /// returned path is still absolute.
    pub fn lookup_scoped(&self, origin: &[Slot], steps: &[Step]) -> Result<Lookup<'_>, LookupError> {
        let absolute = self.lookup(steps);
        if !matches!(steps.first(), Some(Step::Tag { .. })) || !is_missing_first_step(&absolute) {
            return absolute;
        }
        for depth in (1..=origin.len()).rev() {
            let Some((scope, prefix)) = self.locate(&origin[..depth]) else {
                continue;
            };
            if !matches!(scope, Value::Entity(_)) {
                continue;
            }
            let scoped = self.walk_from(Node::Value(scope), prefix, steps, 0);
            if !is_missing_first_step(&scoped) {
                return scoped;
            }
        }
        absolute
    }

    /// The value at `slots` with its canonical path.
    fn locate(&self, slots: &[Slot]) -> Option<(&Value, Vec<Step>)> {
        let mut node = Node::Root(&self.elements);
        let mut path = Vec::with_capacity(slots.len());
        let mut current = None;
        for slot in slots {
            let value = child(node, slot)?;
            path.push(match slot {
                Slot::Index(i) => canonical_position(node.sequence()?, *i),
                Slot::Attr(name) => Step::Attr(name.clone()),
                Slot::Key(key) => Step::Index(key.clone()),
                Slot::Member(_) => return None,
            });
            node = Node::Value(value);
            current = Some(value);
        }
        current.map(|value| (value, path))
    }

    fn walk(&self, steps: &[Step], depth: usize) -> Result<Lookup<'_>, LookupError> {
        self.walk_from(Node::Root(&self.elements), Vec::with_capacity(steps.len()), steps, depth)
    }

    fn walk_from<'a>(
        &'a self,
        start: Node<'a>,
        mut path: Vec<Step>,
        steps: &[Step],
        depth: usize,
    ) -> Result<Lookup<'a>, LookupError> {
        let mut node = start;
        for (i, step) in steps.iter().enumerate() {
            node = self.deref(node, &mut path, depth, i)?;
            if let Node::Pending(link) | Node::Value(Value::Link(link)) = node {
                return Ok(Lookup::Pending(link));
            }
            node = take_step(node, step, &mut path).map_err(|kind| LookupError { step: i, kind })?;
        }
        match self.deref(node, &mut path, depth, steps.len().saturating_sub(1))? {
            Node::Pending(link) | Node::Value(Value::Link(link)) => Ok(Lookup::Pending(link)),
            Node::Value(value) => Ok(Lookup::Found { value, path }),
            Node::Root(_) => Err(LookupError {
                step: 0,
                kind: LookupErrorKind::NotFound("an empty path names no value".into()),
            }),
        }
    }

    /// Replace a reference node by its target, resetting `path` to the
    /// target's canonical path.
    fn deref<'a>(
        &'a self,
        node: Node<'a>,
        path: &mut Vec<Step>,
        depth: usize,
        step: usize,
    ) -> Result<Node<'a>, LookupError> {
        let Node::Value(Value::Ref(reference)) = node else {
            return Ok(node);
        };
        if depth >= MAX_REFERENCE_DEPTH {
            return Err(LookupError {
                step,
                kind: LookupErrorKind::ReferenceDepth,
            });
        }
        match self.walk(reference.steps(), depth + 1) {
            Ok(Lookup::Found { value, path: target }) => {
                *path = target;
                Ok(Node::Value(value))
            }
            Ok(Lookup::Pending(link)) => Ok(Node::Pending(link)),
            Err(err) if err.kind == LookupErrorKind::ReferenceDepth => Err(LookupError {
                step,
                kind: err.kind,
            }),
            Err(_) => Err(LookupError {
                step,
                kind: LookupErrorKind::DanglingReference(reference.to_string()),
            }),
        }
    }

    /// Whether the value at `slots` is still the placeholder `link_id`.
    pub fn holds_placeholder(&self, slots: &[Slot], link_id: u32) -> bool {
        let Some((last, parents)) = slots.split_last() else {
            return false;
        };
        let mut node = Node::Root(&self.elements);
        for slot in parents {
            match child(node, slot) {
                Some(value) => node = Node::Value(value),
                None => return false,
            }
        }
        if let Slot::Member(id) = last {
            return *id == link_id
                && matches!(node, Node::Value(Value::Set(set)) if set.has_link(link_id));
        }
        matches!(child(node, last), Some(Value::Link(link)) if link.id == link_id)
    }

    /// Overwrite the placeholder `link_id` at `slots` with `value`.
    ///
    /// Returns `false`, changing nothing, when the slot no longer holds that
    /// placeholder, or when `value` is a tag: tags are referenced, never
    /// copied into a slot.
    pub fn fill_placeholder(&mut self, slots: &[Slot], link_id: u32, value: Value) -> bool {
        if matches!(value, Value::Entity(_)) {
            return false;
        }
        let Some((last, parents)) = slots.split_last() else {
            return false;
        };
        let mut container = Container::Root(&mut self.elements);
        for slot in parents {
            match child_mut(container, slot) {
                Some(next) => container = Container::Value(next),
                None => return false,
            }
        }
        if let Slot::Member(id) = last {
            return match container {
                Container::Value(Value::Set(set)) if *id == link_id => set.replace_link(link_id, value),
                _ => false,
            };
        }
        let Some(slot) = child_mut(container, last) else {
            return false;
        };
        let holds = matches!(&*slot, Value::Link(link) if link.id == link_id);
        if holds {
            *slot = value;
        }
        holds
    }
}

impl FromIterator<Value> for Document {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::from_elements(iter.into_iter().collect())
    }
}

fn take_step<'a>(
    node: Node<'a>,
    step: &Step,
    path: &mut Vec<Step>,
) -> Result<Node<'a>, LookupErrorKind> {
    match step {
        Step::Tag { name, index } => {
            let n = match index {
                None => 0,
                Some(Key::Int(n)) => usize::try_from(*n).map_err(|_| {
                    LookupErrorKind::NotFound(format!("no tag `{name}` at group index {n}"))
                })?,
                Some(Key::String(s)) => {
                    return Err(LookupErrorKind::TypeMismatch(format!(
                        "group index of tag `{name}` must be an integer, got `{s}`"
                    )));
                }
            };
            let found = match node {
                Node::Value(Value::Entity(entity)) => entity.group_child(name, n),
                other => match other.sequence() {
                    Some(items) => items
                        .iter()
                        .filter(|item| item.tag_name() == Some(name.as_str()))
                        .nth(n),
                    None => {
                        return Err(LookupErrorKind::TypeMismatch(format!(
                            "{} cannot contain tag `{name}`",
                            other.describe()
                        )));
                    }
                },
            };
            let value = found.ok_or_else(|| {
                LookupErrorKind::NotFound(if n == 0 {
                    format!("no tag `{name}`")
                } else {
                    format!("no tag `{name}` at group index {n}")
                })
            })?;
            path.push(Step::tag_at(name.clone(), n));
            Ok(Node::Value(value))
        }
        Step::Attr(name) => match node {
            Node::Value(Value::Entity(entity)) => {
                let value = entity.attr(name).ok_or_else(|| {
                    LookupErrorKind::NotFound(format!(
                        "tag `{}` has no attribute `{name}`",
                        entity.name()
                    ))
                })?;
                path.push(step.clone());
                Ok(Node::Value(value))
            }
            other => Err(LookupErrorKind::TypeMismatch(format!(
                "{} has no attribute `{name}`",
                other.describe()
            ))),
        },
        Step::Index(key) => {
            if let Some(items) = node.sequence() {
                let Key::Int(i) = key else {
                    return Err(LookupErrorKind::TypeMismatch(format!(
                        "{} must be indexed by an integer, got `{key}`",
                        node.describe()
                    )));
                };
                let value = usize::try_from(*i)
                    .ok()
                    .and_then(|i| items.get(i))
                    .ok_or_else(|| {
                        LookupErrorKind::NotFound(format!(
                            "index {i} out of range for {} of length {}",
                            node.describe(),
                            items.len()
                        ))
                    })?;
                path.push(step.clone());
                return Ok(Node::Value(value));
            }
            match node {
                Node::Value(Value::Dict(dict)) => {
                    let value = dict
                        .get(key)
                        .ok_or_else(|| LookupErrorKind::NotFound(format!("no key `{key}` in dict")))?;
                    path.push(step.clone());
                    Ok(Node::Value(value))
                }
                other => Err(LookupErrorKind::TypeMismatch(format!(
                    "{} cannot be indexed",
                    other.describe()
                ))),
            }
        }
    }
}

fn is_missing_first_step(lookup: &Result<Lookup<'_>, LookupError>) -> bool {
    matches!(
        lookup,
        Err(LookupError {
            step: 0,
            kind: LookupErrorKind::NotFound(_)
        })
    )
}

/// Canonical step for position `i` of a sequence: tags by name and group
/// index, anything else by position.
fn canonical_position(items: &[Value], i: usize) -> Step {
    match items.get(i).and_then(Value::tag_name) {
        Some(name) => {
            let group_index = items[..i]
                .iter()
                .filter(|item| item.tag_name() == Some(name))
                .count();
            Step::tag_at(name, group_index)
        }
        None => Step::Index(Key::Int(i as i64)),
    }
}

fn child<'a>(node: Node<'a>, slot: &Slot) -> Option<&'a Value> {
    match (node, slot) {
        (node, Slot::Index(i)) => node.sequence()?.get(*i),
        (Node::Value(Value::Entity(entity)), Slot::Attr(name)) => entity.attr(name),
        (Node::Value(Value::Dict(dict)), Slot::Key(key)) => dict.get(key),
        _ => None,
    }
}

enum Container<'a> {
    Root(&'a mut Vec<Value>),
    Value(&'a mut Value),
}

fn child_mut<'a>(container: Container<'a>, slot: &Slot) -> Option<&'a mut Value> {
    match (container, slot) {
        (Container::Root(items), Slot::Index(i)) => items.get_mut(*i),
        (Container::Value(Value::List(items)), Slot::Index(i)) => items.get_mut(*i),
        (Container::Value(Value::Entity(entity)), Slot::Index(i)) => entity.children.get_mut(*i),
        (Container::Value(Value::Entity(entity)), Slot::Attr(name)) => entity.attributes.get_mut(name),
        (Container::Value(Value::Dict(dict)), Slot::Key(key)) => dict.get_mut(key),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dict;
    use facet_testhelpers::test;

    fn link(id: u32, steps: Vec<Step>) -> Value {
        Value::Link(SymbolicLink { id, steps, line: 1 })
    }

    fn sample() -> Document {
        let root = Entity::new("root")
            .with_child(Entity::new("a").with_attr("v", 1))
            .with_child(Entity::new("a").with_attr("v", 2))
            .with_child(
                Entity::new("b")
                    .with_attr("list", vec![Value::Int(10), Value::Int(20)])
                    .with_attr("dict", [("k", 1)].into_iter().collect::<Dict>()),
            );
        Document::from_elements(vec![root.into(), Value::Int(7)])
    }

    fn found<'a>(lookup: Result<Lookup<'a>, LookupError>) -> (&'a Value, Vec<Step>) {
        match lookup {
            Ok(Lookup::Found { value, path }) => (value, path),
            other => panic!("expected a value, got {other:?}"),
        }
    }

    #[test]
    fn test_lookup_attribute() {
        let doc = sample();
        let (value, path) = found(doc.lookup(&[Step::tag("root"), Step::tag_at("a", 1), Step::attr("v")]));
        assert_eq!(value, &Value::Int(2));
        assert_eq!(path, [Step::tag_at("root", 0), Step::tag_at("a", 1), Step::attr("v")]);
    }

    #[test]
    fn test_lookup_canonicalises_tag_steps() {
        let doc = sample();
        let (value, path) = found(doc.lookup(&[Step::tag("root"), Step::tag("b")]));
        assert_eq!(value.as_entity().map(Entity::name), Some("b"));
        assert_eq!(path, [Step::tag_at("root", 0), Step::tag_at("b", 0)]);
    }

    #[test]
    fn test_lookup_indices_and_keys() {
        let doc = sample();
        let (value, _) = found(doc.lookup(&[Step::index(1)]));
        assert_eq!(value, &Value::Int(7));

        let (value, _) = found(doc.lookup(&[Step::tag("root"), Step::index(1), Step::attr("v")]));
        assert_eq!(value, &Value::Int(2));

        let (value, _) = found(doc.lookup(&[
            Step::tag("root"),
            Step::tag("b"),
            Step::attr("list"),
            Step::index(1),
        ]));
        assert_eq!(value, &Value::Int(20));

        let (value, _) = found(doc.lookup(&[
            Step::tag("root"),
            Step::tag("b"),
            Step::attr("dict"),
            Step::index("k"),
        ]));
        assert_eq!(value, &Value::Int(1));
    }

    #[test]
    fn test_lookup_errors() {
        let doc = sample();
        let err = doc
            .lookup(&[Step::tag("root"), Step::tag_at("a", 5)])
            .unwrap_err();
        assert_eq!(err.step, 1);
        assert!(matches!(err.kind, LookupErrorKind::NotFound(_)));

        let err = doc.lookup(&[Step::attr("x")]).unwrap_err();
        assert!(matches!(err.kind, LookupErrorKind::TypeMismatch(_)));

        let err = doc
            .lookup(&[Step::tag("root"), Step::tag("a"), Step::attr("v"), Step::index(0)])
            .unwrap_err();
        assert_eq!(err.step, 3);
        assert!(matches!(err.kind, LookupErrorKind::TypeMismatch(_)));

        let err = doc
            .lookup(&[Step::tag("root"), Step::index("a")])
            .unwrap_err();
        assert!(matches!(err.kind, LookupErrorKind::TypeMismatch(_)));

        let err = doc
            .lookup(&[Step::tag("root"), Step::tag("b"), Step::attr("dict"), Step::index("nope")])
            .unwrap_err();
        assert!(matches!(err.kind, LookupErrorKind::NotFound(_)));
    }

    #[test]
    fn test_lookup_pending_link() {
        let root = Entity::new("root").with_attr("x", link(3, vec![Step::tag("y")]));
        let doc = Document::from_elements(vec![root.into()]);
        match doc.lookup(&[Step::tag("root"), Step::attr("x")]) {
            Ok(Lookup::Pending(link)) => assert_eq!(link.id, 3),
            other => panic!("expected pending, got {other:?}"),
        }
    }

    #[test]
    fn test_lookup_through_reference() {
        let target = Reference::new(vec![Step::tag_at("root", 0), Step::tag_at("b", 0)]);
        let mut doc = sample();
        doc.push(Entity::new("alias").with_attr("to", Value::Ref(target)));
        let (value, path) = found(doc.lookup(&[Step::tag("alias"), Step::attr("to"), Step::attr("list"), Step::index(0)]));
        assert_eq!(value, &Value::Int(10));
        assert_eq!(
            path,
            [Step::tag_at("root", 0), Step::tag_at("b", 0), Step::attr("list"), Step::index(0)]
        );
    }

    #[test]
    fn test_follow() {
        let mut doc = sample();
        let reference = Value::Ref(Reference::new(vec![Step::tag_at("root", 0), Step::tag_at("a", 1)]));
        let target = doc.follow(&reference).and_then(Value::as_entity);
        assert_eq!(target.and_then(|a| a.attr("v")), Some(&Value::Int(2)));
        assert_eq!(doc.follow(&Value::Int(1)), Some(&Value::Int(1)));

        doc.elements_mut().clear();
        assert_eq!(doc.follow(&reference), None);
    }

    #[test]
    fn test_self_reference_is_bounded() {
        let doc = Document::from_elements(vec![Value::Ref(Reference::new(vec![Step::index(0)]))]);
        let err = doc.lookup(&[Step::index(0), Step::index(0)]).unwrap_err();
        assert_eq!(err.kind, LookupErrorKind::ReferenceDepth);
    }

    #[test]
    fn test_lookup_scoped_falls_back_to_enclosing_tags() {
        let root = Entity::new("root")
            .with_child(Entity::new("a").with_attr("v", 1))
            .with_child(Entity::new("b").with_attr("ref", link(0, vec![Step::tag("a"), Step::attr("v")])));
        let doc = Document::from_elements(vec![root.into()]);
        let origin = [Slot::Index(0), Slot::Index(1), Slot::Attr("ref".into())];
        let steps = [Step::tag("a"), Step::attr("v")];

        assert!(doc.lookup(&steps).is_err());
        let (value, path) = found(doc.lookup_scoped(&origin, &steps));
        assert_eq!(value, &Value::Int(1));
        assert_eq!(path, [Step::tag_at("root", 0), Step::tag_at("a", 0), Step::attr("v")]);
    }

    #[test]
    fn test_lookup_scoped_prefers_top_level() {
        let doc = Document::from_elements(vec![
            Entity::new("a").with_attr("v", 1).into(),
            Entity::new("root")
                .with_child(Entity::new("a").with_attr("v", 2))
                .into(),
        ]);
        let origin = [Slot::Index(1), Slot::Index(0)];
        let (value, _) = found(doc.lookup_scoped(&origin, &[Step::tag("a"), Step::attr("v")]));
        assert_eq!(value, &Value::Int(1));
    }

    #[test]
    fn test_lookup_scoped_reports_absolute_error() {
        let doc = sample();
        let origin = [Slot::Index(0), Slot::Index(0)];
        let err = doc
            .lookup_scoped(&origin, &[Step::tag("missing")])
            .unwrap_err();
        assert_eq!(err.step, 0);
        assert!(matches!(err.kind, LookupErrorKind::NotFound(_)));
    }

    #[test]
    fn test_fill_placeholder() {
        let mut set = crate::Set::new();
        set.insert(Value::Int(1)).unwrap();
        set.insert(link(2, vec![Step::index(9)])).unwrap();
        let root = Entity::new("root")
            .with_attr("x", link(0, vec![Step::index(9)]))
            .with_child(link(1, vec![Step::index(9)]))
            .with_child(Value::Set(set));
        let mut doc = Document::from_elements(vec![root.into()]);

        let attr = [Slot::Index(0), Slot::Attr("x".into())];
        assert!(doc.holds_placeholder(&attr, 0));
        assert!(!doc.holds_placeholder(&attr, 1));
        assert!(doc.fill_placeholder(&attr, 0, Value::Int(5)));
        assert!(!doc.holds_placeholder(&attr, 0));
        assert!(!doc.fill_placeholder(&attr, 0, Value::Int(6)));

        let child = [Slot::Index(0), Slot::Index(0)];
        assert!(!doc.fill_placeholder(&child, 1, Entity::new("t").into()));
        assert!(doc.fill_placeholder(&child, 1, "s".into()));

        let member = [Slot::Index(0), Slot::Index(1), Slot::Member(2)];
        assert!(doc.holds_placeholder(&member, 2));
        assert!(doc.fill_placeholder(&member, 2, Value::Int(1)));

        let root = doc.get("root").unwrap();
        assert_eq!(root.attr("x"), Some(&Value::Int(5)));
        assert_eq!(root.get_index(0), Some(&Value::from("s")));
        assert_eq!(root.get_index(1).and_then(Value::as_set).map(|s| s.len()), Some(1));
    }
}
