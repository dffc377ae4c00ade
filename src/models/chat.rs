use serde::{ Serialize, Deserialize };
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single chat message. Fields are private so a message cannot change after
/// it is created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    role: Role,
    content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Ordered, append-only message history.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Returns a copy of this conversation with `message` appended.
    pub fn extended_with(&self, message: ChatMessage) -> Conversation {
        let mut next = self.clone();
        next.push(message);
        next
    }

    /// Appends every message of `update`, in order. No deduplication.
    pub fn merge(&mut self, update: Conversation) {
        self.messages.extend(update.messages);
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChatMessage> {
        self.messages.iter()
    }

    /// Content of the most recent user message, if any.
    pub fn last_user_content(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

impl From<Vec<ChatMessage>> for Conversation {
    fn from(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }
}

impl<'a> IntoIterator for &'a Conversation {
    type Item = &'a ChatMessage;
    type IntoIter = std::slice::Iter<'a, ChatMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::assistant("hi")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }

    #[test]
    fn extended_with_leaves_original_untouched() {
        let base = Conversation::from(vec![ChatMessage::user("a"), ChatMessage::assistant("b")]);
        let next = base.extended_with(ChatMessage::user("c"));

        assert_eq!(base.len(), 2);
        assert_eq!(next.len(), 3);
        assert_eq!(&next.messages()[..2], base.messages());
        assert_eq!(next.last().map(|m| m.content()), Some("c"));
    }

    #[test]
    fn merge_keeps_duplicates_and_order() {
        let mut conv = Conversation::from(vec![ChatMessage::user("same")]);
        conv.merge(Conversation::from(vec![ChatMessage::user("same"), ChatMessage::assistant("x")]));

        let contents: Vec<&str> = conv.iter().map(|m| m.content()).collect();
        assert_eq!(contents, vec!["same", "same", "x"]);
    }

    #[test]
    fn last_user_content_skips_replies() {
        let conv = Conversation::from(vec![
            ChatMessage::system("be brief"),
            ChatMessage::user("question"),
            ChatMessage::assistant("answer"),
        ]);
        assert_eq!(conv.last_user_content(), Some("question"));
        assert_eq!(Conversation::new().last_user_content(), None);
    }
}
