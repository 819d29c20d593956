use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged entry, serialized exactly as chat-completion APIs expect it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: Role,
    pub content: String,
}

impl ConversationMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Append-only message log; the system message at index 0 is never removed
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    messages: Vec<ConversationMessage>,
}

impl ConversationHistory {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![ConversationMessage::new(Role::System, system_prompt)],
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ConversationMessage::new(Role::User, content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages
            .push(ConversationMessage::new(Role::Assistant, content));
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    /// Owned copy handed to a completion call running off the event loop
    pub fn snapshot(&self) -> Vec<ConversationMessage> {
        self.messages.clone()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new(super::DEFAULT_SYSTEM_PROMPT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_message_stays_first() {
        let mut history = ConversationHistory::new("be kind");
        history.push_user("hi");
        history.push_assistant("hello");

        assert_eq!(history.len(), 3);
        assert_eq!(history.messages()[0], ConversationMessage::new(Role::System, "be kind"));
        assert_eq!(history.messages()[2].role, Role::Assistant);
    }

    #[test]
    fn test_serializes_as_chat_messages() {
        let json = serde_json::to_value(ConversationMessage::new(Role::User, "hi")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "user", "content": "hi"}));
    }
}
