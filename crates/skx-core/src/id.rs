//! Node identifiers.
//!
//! An id comes from the markup `id` attribute, from a factory naming the
//! parts of its tree after the root (`save_label`), or is generated from
//! the node kind (`button_3`). All of them live in one process-wide
//! interner, so an id is a 4-byte `Copy` key.

use crate::model::NodeKind;
use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU32, Ordering};

static NAMES: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Next generated number, per node kind.
static NEXT_GENERATED: [AtomicU32; NodeKind::ALL.len()] =
    [const { AtomicU32::new(0) }; NodeKind::ALL.len()];

#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct NodeId(Spur);

impl NodeId {
    pub fn intern(name: &str) -> Self {
        NodeId(NAMES.get_or_intern(name))
    }

    /// The id named by an `id` attribute value. Blank values name nothing.
    pub fn from_attr(value: &str) -> Option<Self> {
        let name = value.trim();
        (!name.is_empty()).then(|| Self::intern(name))
    }

    /// A fresh `<kind>_<n>` id. Numbers count per kind and skip names that
    /// markup has already claimed.
    pub fn for_kind(kind: NodeKind) -> Self {
        let counter = &NEXT_GENERATED[kind as usize];
        loop {
            let n = counter.fetch_add(1, Ordering::Relaxed);
            let name = format!("{}_{n}", kind.as_str());
            if NAMES.get(name.as_str()).is_none() {
                return Self::intern(&name);
            }
        }
    }

    /// The id of a named part of this node's subtree: `<self>_<part>`.
    pub fn part(self, part: &str) -> Self {
        Self::intern(&format!("{}_{part}", self.as_str()))
    }

    pub fn as_str(&self) -> &str {
        NAMES.resolve(&self.0)
    }
}

impl From<String> for NodeId {
    fn from(name: String) -> Self {
        Self::intern(&name)
    }
}

impl From<NodeId> for String {
    fn from(id: NodeId) -> Self {
        id.as_str().to_string()
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
