use crate::config::DashboardConfig;
use crate::error::{ExtractionError, StorageError};
use crate::session::store::StateStore;
use crate::ui::event::{ActionLog, DashboardAction};
use crate::ui::query_groups::{QueryGroupSnapshot, QueryGroupStore};
use crate::ui::runtime::{ComponentSink, ExtractionBatch};
use crate::ui::workspace::{WorkspaceComponent, WorkspaceSnapshot, WorkspaceStore};
use std::collections::VecDeque;

pub const WORKSPACE_KEY: &str = "ai-workspace-store";
pub const QUERY_GROUPS_KEY: &str = "query-groups-store";

/// Workspace plus query groups, kept consistent with each other.
#[derive(Debug, Default)]
pub struct Dashboard {
    workspace: WorkspaceStore,
    groups: QueryGroupStore,
    actions: ActionLog,
    dirty: bool,
    /// Bumped on every change; a failed save is not retried until it moves.
    revision: u64,
    failed_revision: Option<u64>,
}

impl Dashboard {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            workspace: WorkspaceStore::new(),
            groups: QueryGroupStore::new(config.query_match_prefix, config.query_display_len),
            actions: ActionLog::default(),
            dirty: false,
            revision: 0,
            failed_revision: None,
        }
    }

    pub fn workspace(&self) -> &WorkspaceStore {
        &self.workspace
    }

    pub fn groups(&self) -> &QueryGroupStore {
        &self.groups
    }

    pub fn action_log(&self) -> &VecDeque<DashboardAction> {
        self.actions.entries()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn mark_changed(&mut self) {
        self.dirty = true;
        self.revision += 1;
    }

    pub fn apply(&mut self, action: DashboardAction) {
        match &action {
            DashboardAction::RemoveComponent { component_id } => self.remove_component(component_id),
            DashboardAction::RemoveGroup { group_id } => self.remove_group(group_id),
            DashboardAction::ToggleGroup { group_id } => {
                if self.groups.toggle_collapsed(group_id) {
                    self.mark_changed();
                }
            }
            DashboardAction::ActivateGroup { group_id } => {
                if self.groups.activate(group_id.as_deref()) {
                    self.mark_changed();
                }
            }
            DashboardAction::ClearAll => self.clear_all(),
        }
        self.actions.push(action);
    }

    pub fn remove_component(&mut self, component_id: &str) {
        self.workspace.remove(component_id);
        self.groups.detach_component(component_id);
        self.mark_changed();
    }

    /// Removes the group together with every component it lists.
    pub fn remove_group(&mut self, group_id: &str) {
        let Some(group) = self.groups.remove(group_id) else {
            return;
        };
        for component_id in &group.component_ids {
            if self.workspace.contains(component_id) {
                self.workspace.remove(component_id);
            }
            self.groups.detach_component(component_id);
        }
        self.mark_changed();
    }

    pub fn clear_all(&mut self) {
        self.workspace.clear();
        self.groups.clear();
        self.mark_changed();
    }

    /// Components shown in the grid, honouring the active group filter.
    pub fn visible_components(&self) -> Vec<&WorkspaceComponent> {
        match self.groups.active() {
            None => self.workspace.list(),
            Some(group) if group.collapsed => Vec::new(),
            Some(group) => self.components_in_group(&group.id),
        }
    }

    pub fn components_in_group(&self, group_id: &str) -> Vec<&WorkspaceComponent> {
        self.groups
            .component_ids(group_id)
            .iter()
            .filter_map(|id| self.workspace.get(id))
            .collect()
    }

    pub fn save(&mut self, storage: &StateStore) -> Result<(), StorageError> {
        storage.save(WORKSPACE_KEY, &self.workspace.snapshot())?;
        storage.save(QUERY_GROUPS_KEY, &self.groups.snapshot())?;
        self.dirty = false;
        self.failed_revision = None;
        Ok(())
    }

    /// Saves pending changes. After a failure nothing is written again until
    /// the dashboard changes, so a broken state dir is reported once per edit.
    pub fn save_if_changed(&mut self, storage: &StateStore) -> Result<bool, StorageError> {
        if !self.dirty || self.failed_revision == Some(self.revision) {
            return Ok(false);
        }
        match self.save(storage) {
            Ok(()) => Ok(true),
            Err(err) => {
                self.failed_revision = Some(self.revision);
                Err(err)
            }
        }
    }

    /// Restores both stores; a missing key leaves that store empty.
    pub fn load(&mut self, storage: &StateStore) -> Result<(), StorageError> {
        let workspace: Option<WorkspaceSnapshot> = storage.load(WORKSPACE_KEY)?;
        let groups: Option<QueryGroupSnapshot> = storage.load(QUERY_GROUPS_KEY)?;
        self.workspace.restore(workspace.unwrap_or_default());
        self.groups.restore(groups.unwrap_or_default());
        self.dirty = false;
        self.failed_revision = None;
        tracing::info!(
            components = self.workspace.len(),
            groups = self.groups.len(),
            "restored dashboard state"
        );
        Ok(())
    }
}

impl ComponentSink for Dashboard {
    fn accept(&mut self, batch: ExtractionBatch) -> Result<Vec<String>, ExtractionError> {
        let ids: Vec<String> = batch
            .components
            .into_iter()
            .map(|candidate| {
                self.workspace
                    .add(candidate.kind(), &candidate.props.to_map(), candidate.origin)
            })
            .collect();

        match batch.user_query.as_deref() {
            Some(query) => {
                self.groups.attach(query, &batch.subject, &ids);
            }
            None => tracing::warn!(
                message = %batch.message_id,
                "no user message precedes reply; components left ungrouped"
            ),
        }
        self.mark_changed();
        Ok(ids)
    }
}
