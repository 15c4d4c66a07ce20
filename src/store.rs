use crate::backend::Backend;
use crate::message::ChatMessage;

/// Convert a character index to a byte index for UTF-8 safe string
/// operations on the compose buffer.
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// All conversation state behind explicit mutators: the ordered
/// history, the compose buffer with its cursor, and the selected
/// backend. The UI and the send pipeline never reach in directly.
///
/// History is append-only and ordered by completion: user messages
/// land at submission time, replies whenever their round trip
/// resolves.
pub struct ConversationStore {
    messages: Vec<ChatMessage>,
    buffer: String,
    cursor: usize, // char index into buffer
    selection: Backend,
}

impl ConversationStore {
    pub fn new(selection: Backend) -> Self {
        Self::hydrate(selection, Vec::new())
    }

    pub fn hydrate(selection: Backend, messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            buffer: String::new(),
            cursor: 0,
            selection,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn append_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn selection(&self) -> Backend {
        self.selection
    }

    /// Affects future sends only; appended history is never rewritten.
    pub fn set_selection(&mut self, backend: Backend) {
        self.selection = backend;
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Hand the draft to the send path and clear it in one step. The
    /// buffer is empty from the caller's next statement on, before any
    /// network call resolves.
    pub fn take_buffer(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.buffer)
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.buffer, self.cursor);
        self.buffer.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn delete_before_cursor(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.buffer, self.cursor);
            self.buffer.remove(byte_pos);
        }
    }

    pub fn delete_at_cursor(&mut self) {
        if self.cursor < self.buffer.chars().count() {
            let byte_pos = char_to_byte_index(&self.buffer, self.cursor);
            self.buffer.remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.buffer.chars().count());
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.buffer.chars().count();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{MessageContent, Role};

    #[test]
    fn test_append_preserves_order() {
        let mut store = ConversationStore::new(Backend::Gpt);
        store.append_message(ChatMessage::user("first"));
        store.append_message(ChatMessage {
            role: Role::Gpt,
            content: MessageContent::Text("second".to_string()),
        });
        store.append_message(ChatMessage::user("third"));

        let texts: Vec<_> = store
            .messages()
            .iter()
            .map(|m| match &m.content {
                MessageContent::Text(t) => t.as_str(),
                MessageContent::CaptionedImage { caption, .. } => caption.as_str(),
            })
            .collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_selection_change_leaves_history_untouched() {
        let mut store = ConversationStore::new(Backend::Gpt);
        store.append_message(ChatMessage {
            role: Role::Gpt,
            content: MessageContent::Text("from gpt".to_string()),
        });

        store.set_selection(Backend::Gemini);

        assert_eq!(store.selection(), Backend::Gemini);
        assert_eq!(store.messages()[0].role, Role::Gpt);
    }

    #[test]
    fn test_take_buffer_clears_draft_and_cursor() {
        let mut store = ConversationStore::new(Backend::Gpt);
        for c in "hello".chars() {
            store.insert_char(c);
        }

        assert_eq!(store.take_buffer(), "hello");
        assert_eq!(store.buffer(), "");
        assert_eq!(store.cursor(), 0);
    }

    #[test]
    fn test_utf8_editing_at_cursor() {
        let mut store = ConversationStore::new(Backend::Gpt);
        for c in "héllo".chars() {
            store.insert_char(c);
        }

        store.cursor_left();
        store.cursor_left();
        store.insert_char('x');
        assert_eq!(store.buffer(), "hélxlo");

        store.delete_before_cursor();
        assert_eq!(store.buffer(), "héllo");

        store.cursor_home();
        store.delete_at_cursor();
        assert_eq!(store.buffer(), "éllo");
    }

    #[test]
    fn test_cursor_clamps_to_buffer_bounds() {
        let mut store = ConversationStore::new(Backend::Gpt);
        store.cursor_left();
        assert_eq!(store.cursor(), 0);

        store.insert_char('a');
        store.cursor_right();
        store.cursor_right();
        assert_eq!(store.cursor(), 1);

        store.cursor_end();
        assert_eq!(store.cursor(), 1);
    }
}
