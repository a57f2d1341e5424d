use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// User intent emitted by dashboard widgets, applied once per frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DashboardAction {
    RemoveComponent { component_id: String },
    RemoveGroup { group_id: String },
    ToggleGroup { group_id: String },
    ActivateGroup { group_id: Option<String> },
    ClearAll,
}

impl DashboardAction {
    pub fn to_log_line(&self) -> String {
        match self {
            Self::RemoveComponent { component_id } => {
                format!("remove_component component_id={component_id}")
            }
            Self::RemoveGroup { group_id } => format!("remove_group group_id={group_id}"),
            Self::ToggleGroup { group_id } => format!("toggle_group group_id={group_id}"),
            Self::ActivateGroup { group_id } => format!(
                "activate_group group_id={}",
                group_id.as_deref().unwrap_or("all")
            ),
            Self::ClearAll => "clear_all".to_string(),
        }
    }
}

const ACTION_LOG_CAPACITY: usize = 100;

/// Recent user actions, oldest first.
#[derive(Debug, Default, Clone)]
pub struct ActionLog {
    entries: VecDeque<DashboardAction>,
}

impl ActionLog {
    pub fn entries(&self) -> &VecDeque<DashboardAction> {
        &self.entries
    }

    pub fn push(&mut self, action: DashboardAction) {
        tracing::info!("{}", action.to_log_line());
        if self.entries.len() == ACTION_LOG_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(action);
    }
}
