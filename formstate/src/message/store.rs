use std::collections::{BTreeMap, HashMap};

use super::Message;

/// Currently active messages per field.
///
/// A field's messages are only ever replaced as a whole.
#[derive(Debug, Default)]
pub struct MessageStore {
    messages: HashMap<String, Vec<Message>>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the field's previous messages and store `messages` in order.
    pub fn replace(&mut self, field: &str, messages: Vec<Message>) {
        if messages.is_empty() {
            self.messages.remove(field);
        } else {
            self.messages.insert(field.to_string(), messages);
        }
    }

    /// First message for `field` with the given state id.
    pub fn get(&self, field: &str, state: &str) -> Option<&Message> {
        self.all(field).iter().find(|m| m.state == state)
    }

    pub fn first(&self, field: &str) -> Option<&Message> {
        self.all(field).first()
    }

    /// All messages for `field`, empty if it has none.
    pub fn all(&self, field: &str) -> &[Message] {
        self.messages.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every field with at least one message, keyed by field id.
    pub fn all_active(&self) -> BTreeMap<&str, &[Message]> {
        self.messages
            .iter()
            .filter(|(_, messages)| !messages.is_empty())
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
            .collect()
    }

    pub fn remove(&mut self, field: &str) {
        self.messages.remove(field);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::INVALID;

    #[test]
    fn test_replace_discards_previous() {
        let mut store = MessageStore::new();
        store.replace(
            "a",
            vec![
                Message::new(INVALID, "A", "bad"),
                Message::new("warn", "A", "careful"),
            ],
        );
        store.replace("a", vec![Message::new("warn", "A", "still careful")]);

        assert_eq!(store.all("a").len(), 1);
        assert!(store.get("a", INVALID).is_none());
        assert_eq!(store.first("a").unwrap().text, "still careful");
    }

    #[test]
    fn test_get_returns_first_match() {
        let mut store = MessageStore::new();
        store.replace(
            "a",
            vec![Message::new("x", "A", "one"), Message::new("x", "A", "two")],
        );
        assert_eq!(store.get("a", "x").unwrap().text, "one");
    }

    #[test]
    fn test_all_active_omits_empty() {
        let mut store = MessageStore::new();
        store.replace("a", vec![Message::new(INVALID, "A", "bad")]);
        store.replace("b", vec![Message::new(INVALID, "B", "bad")]);
        store.replace("b", Vec::new());

        let active = store.all_active();
        assert_eq!(active.len(), 1);
        assert!(active.contains_key("a"));
        assert!(store.all("b").is_empty());
        assert!(store.first("missing").is_none());
    }
}
