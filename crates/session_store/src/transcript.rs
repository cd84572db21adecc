use crate::schema::{Message, Role};

/// Append-only, chronologically ordered message history of one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `content` under `role`. Never fails and never validates.
    pub fn append(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(Message::new(role, content));
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Yields `(role, content)` pairs in insertion order.
    ///
    /// The iterator borrows the transcript and is `Clone`, so it can be
    /// restarted; calling `render` repeatedly without an append in between
    /// yields identical sequences.
    pub fn render(&self) -> impl Iterator<Item = (Role, &str)> + Clone + '_ {
        self.messages
            .iter()
            .map(|message| (message.role, message.content.as_str()))
    }

    /// Messages that form the conversational record, excluding failed turns.
    ///
    /// `Responder::respond` takes only the current text, so nothing in this
    /// workspace replays history today. A responder that accepts prior turns
    /// should be fed from here rather than from [`Transcript::messages`], so
    /// recorded error text never reaches it as assistant output.
    pub fn conversation(&self) -> impl Iterator<Item = &Message> + '_ {
        self.messages.iter().filter(|message| !message.error)
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}
