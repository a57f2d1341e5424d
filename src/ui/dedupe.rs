use crate::ui::schema::{ComponentKind, Origin, ValidatedProps};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A validated component waiting to be handed to the workspace.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentCandidate {
    pub props: ValidatedProps,
    pub origin: Origin,
}

impl ComponentCandidate {
    pub fn new(props: ValidatedProps, origin: Origin) -> Self {
        Self { props, origin }
    }

    pub fn kind(&self) -> ComponentKind {
        self.props.kind()
    }

    pub fn key(&self) -> DedupeKey {
        DedupeKey {
            kind: self.kind(),
            title: self.props.title().to_string(),
            primary_value: self.props.primary_value(),
            query_context: self.origin.query_context.clone(),
        }
    }
}

/// Identity of one logical tool call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DedupeKey {
    pub kind: ComponentKind,
    pub title: String,
    pub primary_value: String,
    pub query_context: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct Deduplicator {
    seen: BTreeSet<DedupeKey>,
}

impl Deduplicator {
    pub fn with_seen(keys: impl IntoIterator<Item = DedupeKey>) -> Self {
        Self {
            seen: keys.into_iter().collect(),
        }
    }

    /// Keeps the first occurrence of each key, in input order, skipping keys
    /// seen in earlier calls or seeded at construction.
    pub fn dedupe(&mut self, candidates: Vec<ComponentCandidate>) -> Vec<ComponentCandidate> {
        let mut kept = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let key = candidate.key();
            if self.seen.contains(&key) {
                tracing::debug!(kind = %key.kind, title = %key.title, "dropping duplicate tool call");
                continue;
            }
            self.seen.insert(key);
            kept.push(candidate);
        }
        kept
    }

    pub fn seen(&self) -> &BTreeSet<DedupeKey> {
        &self.seen
    }
}
