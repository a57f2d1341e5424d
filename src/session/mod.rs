use serde::{Deserialize, Serialize};
use std::borrow::Cow;

pub mod store;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

/// Message bodies arrive either as a plain string or as a list of typed parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl Default for MessageContent {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl MessageContent {
    /// Working text buffer: the string itself, or every text part joined by newlines.
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(text) => Cow::Borrowed(text.as_str()),
            Self::Parts(parts) => {
                let texts: Vec<&str> = parts
                    .iter()
                    .filter_map(|part| match part {
                        ContentPart::Text { text } => Some(text.as_str()),
                        ContentPart::Other => None,
                    })
                    .collect();
                match texts.as_slice() {
                    [] => Cow::Borrowed(""),
                    [single] => Cow::Borrowed(*single),
                    _ => Cow::Owned(texts.join("\n")),
                }
            }
        }
    }

    pub fn push_str(&mut self, delta: &str) {
        match self {
            Self::Text(text) => text.push_str(delta),
            Self::Parts(parts) => match parts.iter_mut().rev().find_map(|part| match part {
                ContentPart::Text { text } => Some(text),
                ContentPart::Other => None,
            }) {
                Some(text) => text.push_str(delta),
                None => parts.push(ContentPart::Text {
                    text: delta.to_string(),
                }),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: MessageContent,
    pub timestamp: String,
}

impl Message {
    pub fn new(id: impl Into<String>, role: Role, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role,
            content: MessageContent::Text(content.into()),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn text(&self) -> Cow<'_, str> {
        self.content.text()
    }
}

/// Ordered conversation as seen by the dashboard. Assistant messages may keep
/// growing while they stream.
#[derive(Debug, Clone, Default)]
pub struct Thread {
    messages: Vec<Message>,
}

impl Thread {
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn get(&self, message_id: &str) -> Option<&Message> {
        self.messages.iter().find(|message| message.id == message_id)
    }

    pub fn append_delta(&mut self, message_id: &str, role: Role, delta: &str) {
        match self
            .messages
            .iter_mut()
            .find(|message| message.id == message_id)
        {
            Some(message) => message.content.push_str(delta),
            None => self.messages.push(Message::new(message_id, role, delta)),
        }
    }

    /// The user message that most recently precedes `message_id`.
    pub fn triggering_user_message(&self, message_id: &str) -> Option<&Message> {
        let index = self
            .messages
            .iter()
            .position(|message| message.id == message_id)?;
        self.messages[..index]
            .iter()
            .rev()
            .find(|message| message.role == Role::User)
    }
}
