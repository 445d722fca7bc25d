//! Link resolution: replace every placeholder with its target.

use std::collections::VecDeque;

use jxi_tokenizer::Span;
use jxi_tree::{Document, Lookup, LookupError, LookupErrorKind, Reference, Slot, SymbolicLink, Value};
use tracing::debug;

use crate::{LinkError, LinkErrorKind};

/// A link placeholder waiting for resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingLink {
    /// The placeholder as parsed.
    pub link: SymbolicLink,
    /// Source span of the whole link, `@` to `;`.
    pub span: Span,
    /// Where the placeholder sits in the document.
    pub slots: Vec<Slot>,
}

impl PendingLink {
    fn error(&self, kind: LinkErrorKind) -> LinkError {
        LinkError::new(kind, self.span, self.link.line)
    }

    fn lookup_error(&self, err: LookupError) -> LinkError {
        let kind = match err.kind {
            LookupErrorKind::NotFound(msg) => LinkErrorKind::TargetNotFound(msg),
            LookupErrorKind::TypeMismatch(msg) => LinkErrorKind::TypeMismatch(msg),
            LookupErrorKind::DanglingReference(reference) => {
                LinkErrorKind::TargetNotFound(format!("reference {reference} no longer resolves"))
            }
            LookupErrorKind::ReferenceDepth => {
                LinkErrorKind::TypeMismatch("references nest too deeply".into())
            }
        };
        self.error(kind).at_step(err.step)
    }
}

/// Resolve `pending` against `document`, in place.
///
/// Links are taken from a FIFO queue. A link whose path runs into another
/// unresolved link goes to the back of the queue. A scalar target is copied
/// into the placeholder's slot; a composite target is stored as a
/// [`Value::Ref`] to its canonical path. A structural failure aborts at
/// once. With `n` links the queue gets `n * (n + 1) / 2 + 1` attempts;
/// whatever is left after that forms a cycle.
///
/// A placeholder whose slot was overwritten during parsing (a repeated
/// attribute or dict key) is dropped without evaluation.
pub fn resolve(document: &mut Document, pending: Vec<PendingLink>) -> Result<(), LinkError> {
    let n = pending.len();
    let budget = n * (n + 1) / 2 + 1;
    let mut queue = VecDeque::from(pending);
    let mut attempts = 0;
    debug!(links = n, budget, "resolving links");

    while let Some(entry) = queue.pop_front() {
        if attempts == budget {
            let pending = queue.len() + 1;
            debug!(pending, "link resolution stalled");
            return Err(entry.error(LinkErrorKind::UnresolvedCycle { pending }));
        }
        attempts += 1;

        if !document.holds_placeholder(&entry.slots, entry.link.id) {
            debug!(link = %entry.link, line = entry.link.line, "dropping overwritten link");
            continue;
        }

        let target = match document.lookup_scoped(&entry.slots, &entry.link.steps) {
            Ok(Lookup::Found { value, .. }) if value.is_scalar() => value.clone(),
            Ok(Lookup::Found { path, .. }) => Value::Ref(Reference::new(path)),
            Ok(Lookup::Pending(_)) => {
                debug!(link = %entry.link, line = entry.link.line, "deferring link");
                queue.push_back(entry);
                continue;
            }
            Err(err) => return Err(entry.lookup_error(err)),
        };

        if matches!(entry.slots.last(), Some(Slot::Member(_))) && !target.is_scalar() {
            return Err(entry.error(LinkErrorKind::TypeMismatch(format!(
                "a set member must be a scalar, but {} points at a composite value",
                entry.link
            ))));
        }
        document.fill_placeholder(&entry.slots, entry.link.id, target);
    }

    debug!(attempts, "links resolved");
    Ok(())
}
