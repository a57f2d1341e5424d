use serde::{Deserialize, Serialize};

pub const GENERAL_SUBJECT: &str = "General";

/// Components produced in answer to one user request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryGroup {
    pub id: String,
    pub user_query: String,
    pub subject: String,
    #[serde(default)]
    pub component_ids: Vec<String>,
    #[serde(default)]
    pub collapsed: bool,
    /// Index into the theme's group palette.
    #[serde(default)]
    pub accent: usize,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryGroupSnapshot {
    #[serde(default)]
    pub groups: Vec<QueryGroup>,
    #[serde(default)]
    pub active_group_id: Option<String>,
}

#[derive(Debug)]
pub struct QueryGroupStore {
    groups: Vec<QueryGroup>,
    active_group_id: Option<String>,
    match_prefix: usize,
    display_len: usize,
}

impl Default for QueryGroupStore {
    fn default() -> Self {
        Self::new(50, 100)
    }
}

impl QueryGroupStore {
    /// The match prefix never exceeds `display_len`, since stored queries are
    /// truncated to that length.
    pub fn new(match_prefix: usize, display_len: usize) -> Self {
        Self {
            groups: Vec::new(),
            active_group_id: None,
            match_prefix: match_prefix.min(display_len),
            display_len,
        }
    }

    /// Attributes `component_ids` to the group for `user_query`, creating it when
    /// no existing group shares the query's leading characters.
    pub fn attach(&mut self, user_query: &str, subject: &str, component_ids: &[String]) -> String {
        let key = match_key(user_query, self.match_prefix);
        if let Some(group) = self
            .groups
            .iter_mut()
            .find(|group| match_key(&group.user_query, self.match_prefix) == key)
        {
            for id in component_ids {
                if !group.component_ids.contains(id) {
                    group.component_ids.push(id.clone());
                }
            }
            tracing::debug!(group = %group.id, added = component_ids.len(), "extended query group");
            return group.id.clone();
        }

        let subject = if subject.trim().is_empty() {
            GENERAL_SUBJECT.to_string()
        } else {
            subject.trim().to_string()
        };
        let mut ids = Vec::with_capacity(component_ids.len());
        for id in component_ids {
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }
        let group = QueryGroup {
            id: format!("group_{}", uuid::Uuid::new_v4().simple()),
            user_query: truncate_query(user_query.trim(), self.display_len),
            subject,
            component_ids: ids,
            collapsed: false,
            accent: self.groups.len(),
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        let id = group.id.clone();
        tracing::info!(group = %id, subject = %group.subject, "created query group");
        self.groups.insert(0, group);
        self.active_group_id = Some(id.clone());
        id
    }

    pub fn update_query(&mut self, group_id: &str, user_query: &str) -> bool {
        let display_len = self.display_len;
        self.with_group(group_id, |group| {
            group.user_query = truncate_query(user_query.trim(), display_len);
        })
    }

    pub fn update_subject(&mut self, group_id: &str, subject: &str) -> bool {
        self.with_group(group_id, |group| {
            group.subject = if subject.trim().is_empty() {
                GENERAL_SUBJECT.to_string()
            } else {
                subject.trim().to_string()
            };
        })
    }

    pub fn toggle_collapsed(&mut self, group_id: &str) -> bool {
        self.with_group(group_id, |group| group.collapsed = !group.collapsed)
    }

    pub fn remove(&mut self, group_id: &str) -> Option<QueryGroup> {
        let Some(index) = self.groups.iter().position(|group| group.id == group_id) else {
            tracing::warn!(group = group_id, "remove for unknown query group ignored");
            return None;
        };
        if self.active_group_id.as_deref() == Some(group_id) {
            self.active_group_id = None;
        }
        Some(self.groups.remove(index))
    }

    /// Sets the group used to filter the grid; `None` shows everything.
    pub fn activate(&mut self, group_id: Option<&str>) -> bool {
        match group_id {
            None => {
                self.active_group_id = None;
                true
            }
            Some(id) if self.get(id).is_some() => {
                self.active_group_id = Some(id.to_string());
                true
            }
            Some(id) => {
                tracing::warn!(group = id, "activate for unknown query group ignored");
                false
            }
        }
    }

    pub fn active(&self) -> Option<&QueryGroup> {
        self.active_group_id.as_deref().and_then(|id| self.get(id))
    }

    pub fn clear(&mut self) {
        self.groups.clear();
        self.active_group_id = None;
    }

    pub fn groups(&self) -> &[QueryGroup] {
        &self.groups
    }

    pub fn get(&self, group_id: &str) -> Option<&QueryGroup> {
        self.groups.iter().find(|group| group.id == group_id)
    }

    pub fn find_by_component_id(&self, component_id: &str) -> Option<&QueryGroup> {
        self.groups
            .iter()
            .find(|group| group.component_ids.iter().any(|id| id == component_id))
    }

    pub fn component_ids(&self, group_id: &str) -> &[String] {
        self.get(group_id)
            .map(|group| group.component_ids.as_slice())
            .unwrap_or(&[])
    }

    /// Drops `component_id` from every group that lists it.
    pub fn detach_component(&mut self, component_id: &str) {
        for group in &mut self.groups {
            group.component_ids.retain(|id| id != component_id);
        }
    }

    /// Unique subjects in first-seen order.
    pub fn subjects(&self) -> Vec<&str> {
        let mut subjects: Vec<&str> = Vec::new();
        for group in &self.groups {
            if !subjects.contains(&group.subject.as_str()) {
                subjects.push(&group.subject);
            }
        }
        subjects
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn snapshot(&self) -> QueryGroupSnapshot {
        QueryGroupSnapshot {
            groups: self.groups.clone(),
            active_group_id: self.active_group_id.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: QueryGroupSnapshot) {
        self.groups = snapshot.groups;
        self.active_group_id = snapshot.active_group_id;
    }

    fn with_group(&mut self, group_id: &str, apply: impl FnOnce(&mut QueryGroup)) -> bool {
        match self.groups.iter_mut().find(|group| group.id == group_id) {
            Some(group) => {
                apply(group);
                true
            }
            None => {
                tracing::warn!(group = group_id, "update for unknown query group ignored");
                false
            }
        }
    }
}

fn match_key(query: &str, prefix: usize) -> String {
    query
        .trim()
        .chars()
        .take(prefix)
        .collect::<String>()
        .to_lowercase()
}

fn truncate_query(query: &str, max_chars: usize) -> String {
    if query.chars().count() <= max_chars {
        return query.to_string();
    }
    let mut truncated: String = query.chars().take(max_chars).collect();
    truncated.push_str("...");
    truncated
}

/// Short age label such as `just now`, `5m ago` or `3d ago`.
pub fn relative_age(created_at: &str, now: chrono::DateTime<chrono::Utc>) -> String {
    let Ok(created) = chrono::DateTime::parse_from_rfc3339(created_at) else {
        return String::new();
    };
    let minutes = now
        .signed_duration_since(created.with_timezone(&chrono::Utc))
        .num_minutes();
    match minutes {
        m if m < 1 => "just now".to_string(),
        m if m < 60 => format!("{m}m ago"),
        m if m < 1440 => format!("{}h ago", m / 60),
        m => format!("{}d ago", m / 1440),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn attach_creates_newest_first_and_activates() {
        let mut store = QueryGroupStore::default();
        let first = store.attach("Show Tesla revenue", "Tesla", &ids(&["comp_metric_a"]));
        let second = store.attach("Compare Nike vs Adidas", "Nike", &ids(&["comp_comparison_b"]));

        let order: Vec<_> = store.groups().iter().map(|group| group.id.clone()).collect();
        assert_eq!(order, vec![second.clone(), first.clone()]);
        assert_eq!(store.active().map(|group| group.id.clone()), Some(second));
        assert_eq!(store.groups()[1].accent, 0);
        assert_eq!(store.groups()[0].accent, 1);
    }

    #[test]
    fn attach_reuses_group_with_same_query_prefix() {
        let mut store = QueryGroupStore::default();
        let query = "Show me the quarterly revenue breakdown for Tesla across all regions please";
        let id = store.attach(query, "Tesla", &ids(&["comp_metric_a"]));
        let again = store.attach(
            "  SHOW ME THE QUARTERLY REVENUE BREAKDOWN FOR TESLA and something else",
            "Tesla",
            &ids(&["comp_metric_a", "comp_graph_b"]),
        );

        assert_eq!(id, again);
        assert_eq!(store.len(), 1);
        assert_eq!(store.component_ids(&id), ids(&["comp_metric_a", "comp_graph_b"]).as_slice());
    }

    #[test]
    fn long_queries_are_truncated_for_display() {
        let mut store = QueryGroupStore::default();
        let query = "x".repeat(140);
        let id = store.attach(&query, "", &[]);
        let group = store.get(&id).expect("group should exist");
        assert_eq!(group.user_query.chars().count(), 103);
        assert!(group.user_query.ends_with("..."));
        assert_eq!(group.subject, GENERAL_SUBJECT);
    }

    #[test]
    fn match_prefix_wider_than_display_still_reuses_group() {
        let mut store = QueryGroupStore::new(120, 100);
        let query = "a".repeat(110);
        let first = store.attach(&query, "", &ids(&["comp_metric_a"]));
        let second = store.attach(&query, "", &ids(&["comp_graph_b"]));

        assert_eq!(first, second);
        assert_eq!(store.len(), 1);
        assert_eq!(store.component_ids(&first), ids(&["comp_metric_a", "comp_graph_b"]).as_slice());
    }

    #[test]
    fn update_query_rewrites_display_and_matching() {
        let mut store = QueryGroupStore::new(50, 20);
        let id = store.attach("tesla revenue", "Tesla", &ids(&["a"]));

        assert!(store.update_query(&id, "  Show Tesla revenue by region and quarter "));
        assert_eq!(
            store.get(&id).map(|group| group.user_query.as_str()),
            Some("Show Tesla revenue b...")
        );
        assert_eq!(store.attach("show tesla revenue by region", "Tesla", &ids(&["b"])), id);
        assert_eq!(store.len(), 1);
        assert!(!store.update_query("group_missing", "anything"));
    }

    #[test]
    fn lookup_detach_and_subjects() {
        let mut store = QueryGroupStore::default();
        let tesla = store.attach("tesla revenue", "Tesla", &ids(&["a", "b"]));
        store.attach("tesla growth", "Tesla", &ids(&["c"]));
        store.attach("nike status", "Nike", &ids(&["d"]));

        assert_eq!(store.find_by_component_id("b").map(|group| group.id.clone()), Some(tesla.clone()));
        store.detach_component("b");
        assert!(store.find_by_component_id("b").is_none());
        assert_eq!(store.subjects(), vec!["Nike", "Tesla"]);
    }

    #[test]
    fn toggle_activate_remove_and_unknown_ids() {
        let mut store = QueryGroupStore::default();
        let id = store.attach("tesla revenue", "Tesla", &[]);

        assert!(store.toggle_collapsed(&id));
        assert!(store.get(&id).map(|group| group.collapsed).unwrap_or(false));
        assert!(!store.toggle_collapsed("group_missing"));
        assert!(!store.activate(Some("group_missing")));
        assert!(store.update_subject(&id, "  "));
        assert_eq!(store.get(&id).map(|group| group.subject.as_str()), Some(GENERAL_SUBJECT));

        assert!(store.remove(&id).is_some());
        assert!(store.active().is_none());
        assert!(store.remove(&id).is_none());
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let mut store = QueryGroupStore::default();
        store.attach("tesla revenue", "Tesla", &ids(&["a"]));
        let encoded = serde_json::to_string(&store.snapshot()).expect("snapshot should serialize");

        let mut restored = QueryGroupStore::default();
        restored.restore(serde_json::from_str(&encoded).expect("snapshot should parse"));
        assert_eq!(restored.snapshot(), store.snapshot());
        assert!(restored.active().is_some());
    }

    #[test]
    fn relative_age_buckets() {
        let now = chrono::DateTime::parse_from_rfc3339("2026-01-02T12:00:00Z")
            .expect("fixture time should parse")
            .with_timezone(&chrono::Utc);
        assert_eq!(relative_age("2026-01-02T11:59:30Z", now), "just now");
        assert_eq!(relative_age("2026-01-02T11:15:00Z", now), "45m ago");
        assert_eq!(relative_age("2026-01-02T09:00:00Z", now), "3h ago");
        assert_eq!(relative_age("2025-12-30T12:00:00Z", now), "3d ago");
        assert_eq!(relative_age("not a time", now), "");
    }
}
