use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    StreamDelta { message_id: String, text: String },
    StreamEnd { message_id: String },
    AssistantError(String),
}

pub const DIAGNOSTICS_CAPACITY: usize = 200;

/// Most recent diagnostics shown in the chat panel; the oldest entry is dropped
/// once `capacity` is reached.
#[derive(Debug)]
pub struct DiagnosticsLog {
    entries: VecDeque<String>,
    capacity: usize,
}

impl Default for DiagnosticsLog {
    fn default() -> Self {
        Self::with_capacity(DIAGNOSTICS_CAPACITY)
    }
}

impl DiagnosticsLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, entry: impl Into<String>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_keep_only_the_newest_entries() {
        let mut log = DiagnosticsLog::with_capacity(3);
        for n in 0..10 {
            log.push(format!("failed to persist dashboard #{n}"));
        }
        assert_eq!(log.len(), 3);
        let kept: Vec<_> = log.iter().map(String::as_str).collect();
        assert_eq!(
            kept,
            vec![
                "failed to persist dashboard #7",
                "failed to persist dashboard #8",
                "failed to persist dashboard #9"
            ]
        );
    }
}
