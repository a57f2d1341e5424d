use crate::ui::schema::{validate, ComponentKind, Origin, ValidatedProps};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceComponent {
    pub id: String,
    pub kind: ComponentKind,
    /// Canonical validated props, camelCase as on the wire.
    pub props: Map<String, Value>,
    pub title: String,
    #[serde(default)]
    pub origin: Origin,
    pub created_at: String,
    pub updated_at: String,
}

impl WorkspaceComponent {
    /// Props re-validated for rendering; older persisted shapes gain defaults here.
    pub fn validated_props(&self) -> ValidatedProps {
        validate(self.kind, &self.props)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceSnapshot {
    #[serde(default)]
    pub components: HashMap<String, WorkspaceComponent>,
    #[serde(default)]
    pub order: Vec<String>,
}

/// Ordered collection of every component the assistant has produced.
#[derive(Debug, Default)]
pub struct WorkspaceStore {
    components: HashMap<String, WorkspaceComponent>,
    order: Vec<String>,
}

impl WorkspaceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: ComponentKind, props: &Map<String, Value>, origin: Origin) -> String {
        let validated = validate(kind, props);
        let id = format!("comp_{}_{}", kind.as_str(), uuid::Uuid::new_v4().simple());
        let now = chrono::Utc::now().to_rfc3339();
        let component = WorkspaceComponent {
            id: id.clone(),
            kind,
            title: validated.title().to_string(),
            props: validated.to_map(),
            origin,
            created_at: now.clone(),
            updated_at: now,
        };
        tracing::info!(id = %id, kind = %kind, title = %component.title, "component added");
        self.components.insert(id.clone(), component);
        self.order.push(id.clone());
        id
    }

    /// Shallow-merges `partial` into the stored props and re-validates them.
    pub fn update(&mut self, id: &str, partial: &Map<String, Value>) -> bool {
        let Some(component) = self.components.get_mut(id) else {
            tracing::warn!(id, "update for unknown component ignored");
            return false;
        };
        let mut merged = component.props.clone();
        for (key, value) in partial {
            merged.insert(key.clone(), value.clone());
        }
        let validated = validate(component.kind, &merged);
        component.title = validated.title().to_string();
        component.props = validated.to_map();
        component.updated_at = chrono::Utc::now().to_rfc3339();
        true
    }

    pub fn remove(&mut self, id: &str) -> Option<WorkspaceComponent> {
        let removed = self.components.remove(id);
        if removed.is_none() {
            tracing::warn!(id, "remove for unknown component ignored");
        }
        self.order.retain(|entry| entry != id);
        removed
    }

    pub fn clear(&mut self) {
        self.components.clear();
        self.order.clear();
    }

    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        if from >= self.order.len() || to >= self.order.len() {
            tracing::warn!(from, to, len = self.order.len(), "reorder out of range ignored");
            return false;
        }
        let id = self.order.remove(from);
        self.order.insert(to, id);
        true
    }

    /// Components in display order. Order entries without a component are skipped.
    pub fn list(&self) -> Vec<&WorkspaceComponent> {
        self.order
            .iter()
            .filter_map(|id| self.components.get(id))
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&WorkspaceComponent> {
        self.components.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.components.contains_key(id)
    }

    pub fn counts_by_kind(&self) -> BTreeMap<ComponentKind, usize> {
        let mut counts = BTreeMap::new();
        for component in self.list() {
            *counts.entry(component.kind).or_insert(0) += 1;
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.list().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> WorkspaceSnapshot {
        WorkspaceSnapshot {
            components: self.components.clone(),
            order: self.order.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: WorkspaceSnapshot) {
        self.components = snapshot.components;
        self.order = snapshot.order;
    }
}
