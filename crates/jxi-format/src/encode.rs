//! Render a resolved document back to jxi text.

use jxi_tree::{Document, Entity, Lookup, Reference, Value};

use crate::options::{FormatOptions, Layout};
use crate::{EncodeError, EncodeErrorKind, JxiWriter};

/// Encode a document, one top-level element per line.
///
/// References are written as link syntax unless
/// [`FormatOptions::expand_references`] is set, in which case their
/// targets are inlined.
pub fn encode(document: &Document, options: &FormatOptions) -> Result<String, EncodeError> {
    let mut encoder = Encoder::new(options, Some(document));
    for element in document.elements() {
        encoder.value(element)?;
        encoder.writer.newline();
    }
    Ok(encoder.finish())
}

/// Encode a single tag.
///
/// There is no document to resolve references against, so expanding a
/// reference is an error here.
pub fn encode_entity(entity: &Entity, options: &FormatOptions) -> Result<String, EncodeError> {
    let mut encoder = Encoder::new(options, None);
    encoder.entity(entity)?;
    Ok(encoder.finish())
}

/// Encode a single value. See [`encode_entity`] about references.
pub fn encode_value(value: &Value, options: &FormatOptions) -> Result<String, EncodeError> {
    let mut encoder = Encoder::new(options, None);
    encoder.value(value)?;
    Ok(encoder.finish())
}

struct Encoder<'a> {
    writer: JxiWriter,
    document: Option<&'a Document>,
    /// Addresses of the composites currently being rendered.
    rendering: Vec<*const ()>,
}

impl<'a> Encoder<'a> {
    fn new(options: &FormatOptions, document: Option<&'a Document>) -> Self {
        Self {
            writer: JxiWriter::with_options(options.clone()),
            document,
            rendering: Vec::new(),
        }
    }

    fn finish(self) -> String {
        self.writer.finish()
    }

    fn value(&mut self, value: &'a Value) -> Result<(), EncodeError> {
        match value {
            Value::Null => self.writer.write_null(),
            Value::Bool(b) => self.writer.write_bool(*b),
            Value::Int(n) => self.writer.write_int(*n),
            Value::Float(n) => self.writer.write_float(*n)?,
            Value::String(s) => self.writer.write_string(s),
            Value::RawString(s) => self.writer.write_raw_string(s)?,
            Value::List(items) => {
                let layout = self.writer.options().lists;
                self.guarded(items, || "list".into(), |e| {
                    e.sequence("[", "]", layout, items, Self::value)
                })?;
            }
            Value::Set(set) => {
                let layout = self.writer.options().lists;
                self.guarded(set, || "set".into(), |e| {
                    e.sequence("(", ")", layout, set, Self::value)
                })?;
            }
            Value::Dict(dict) => {
                let layout = self.writer.options().dicts;
                self.guarded(dict, || "dict".into(), |e| {
                    e.sequence("{", "}", layout, dict.iter(), |e, (key, value)| {
                        e.writer.write_key(key);
                        e.writer.write_key_separator();
                        e.value(value)
                    })
                })?;
            }
            Value::Entity(entity) => self.entity(entity)?,
            Value::Link(link) => {
                return Err(EncodeError::unsupported(format!(
                    "unresolved link {link} (line {})",
                    link.line
                )));
            }
            Value::Ref(reference) => self.reference(reference)?,
        }
        Ok(())
    }

    /// Run `f` with `node` marked as being rendered. Meeting it again
    /// before `f` returns is a cycle.
    fn guarded<T>(
        &mut self,
        node: &T,
        describe: impl FnOnce() -> String,
        f: impl FnOnce(&mut Self) -> Result<(), EncodeError>,
    ) -> Result<(), EncodeError> {
        let address = std::ptr::from_ref(node).cast::<()>();
        if self.rendering.contains(&address) {
            return Err(EncodeErrorKind::CircularReference(describe()).into());
        }
        self.rendering.push(address);
        let result = f(self);
        self.rendering.pop();
        result
    }

    /// Write `items` between `open` and `close`.
    ///
    /// Inline items are joined by the list item separator. Block items go
    /// one per line, one level deeper, with `close` on its own line. An
    /// empty sequence is `open` directly followed by `close`.
    fn sequence<T>(
        &mut self,
        open: &str,
        close: &str,
        layout: Layout,
        items: impl IntoIterator<Item = T>,
        mut item: impl FnMut(&mut Self, T) -> Result<(), EncodeError>,
    ) -> Result<(), EncodeError> {
        self.writer.write_str(open);
        let mut count = 0;
        for next in items {
            match layout {
                Layout::Inline if count > 0 => self.writer.write_separator(),
                Layout::Inline => {}
                Layout::Block => {
                    if count == 0 {
                        self.writer.indent();
                    }
                    self.writer.newline();
                }
            }
            item(self, next)?;
            count += 1;
        }
        if count > 0 && layout == Layout::Block {
            self.writer.dedent();
            self.writer.newline();
        }
        self.writer.write_str(close);
        Ok(())
    }

    fn entity(&mut self, entity: &'a Entity) -> Result<(), EncodeError> {
        self.guarded(entity, || format!("<{}>", entity.name()), |e| e.tag(entity))
    }

    fn tag(&mut self, entity: &'a Entity) -> Result<(), EncodeError> {
        let name = entity.name();
        crate::trace!(name, children = entity.len(), "encoding tag");

        self.writer.write_str("<");
        self.writer.write_name(name)?;
        if let Some(value) = entity.attr(name) {
            self.writer.write_str("=");
            self.value(value)?;
        }

        let attributes: Vec<(&'a str, &'a Value)> = entity
            .attributes()
            .iter()
            .filter(|(attr, _)| *attr != name)
            .collect();
        if !attributes.is_empty() {
            let block = self.writer.options().attributes == Layout::Block;
            if block {
                self.writer.indent();
            }
            for (attr, value) in attributes {
                if block {
                    self.writer.newline();
                } else {
                    self.writer.write_str(" ");
                }
                self.writer.write_name(attr)?;
                self.writer.write_str("=");
                self.value(value)?;
            }
            if block {
                self.writer.dedent();
                self.writer.newline();
            }
        }

        if entity.is_empty() {
            self.writer.write_str("/>");
            return Ok(());
        }
        let layout = self.writer.options().children;
        self.sequence(">", "</", layout, entity.children(), Self::value)?;
        self.writer.write_str(name);
        self.writer.write_str(">");
        Ok(())
    }

    fn reference(&mut self, reference: &'a Reference) -> Result<(), EncodeError> {
        if !self.writer.options().expand_references {
            return self.writer.write_link(reference.steps());
        }
        let Some(document) = self.document else {
            return Err(EncodeError::unsupported(format!(
                "reference {reference} outside of its document"
            )));
        };
        crate::trace!(%reference, "expanding reference");
        match document.lookup(reference.steps()) {
            Ok(Lookup::Found { value, .. }) => self.value(value),
            _ => Err(EncodeErrorKind::DanglingReference(reference.to_string()).into()),
        }
    }
}
