use anyhow::Result;
use tokio::sync::mpsc::UnboundedSender;

use crate::backend::Backend;
use crate::client::RelayClient;
use crate::message::{normalize_reply, ChatMessage, WireMessage};
use crate::router::{route, SendRequest};
use crate::store::ConversationStore;
use crate::tui::AppEvent;

/// What a finished send task reports back: the raw reply array or the
/// transport error, plus the backend that was active at dispatch so
/// the reply is attributed to it even if the selection moved on.
#[derive(Debug)]
pub struct SendOutcome {
    pub backend: Backend,
    pub result: Result<Vec<WireMessage>>,
}

pub struct App {
    pub store: ConversationStore,
    pub client: RelayClient,
    pub should_quit: bool,

    /// Sends dispatched but not yet resolved. Several may be in
    /// flight at once; the buffer clears at dispatch, so nothing
    /// stops the user from submitting again.
    pub pending_sends: usize,

    /// One-line failure banner, cleared on the next keypress.
    pub notice: Option<String>,

    // Chat pane scroll state; pane height and the wrapped line total
    // are written back during render.
    pub chat_scroll: u16,
    pub chat_height: u16,
    pub total_chat_lines: u16,
    pub stick_to_bottom: bool,

    // Animation state: 0-2 for the thinking ellipsis
    pub animation_frame: u8,

    events: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(
        store: ConversationStore,
        client: RelayClient,
        events: UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            store,
            client,
            should_quit: false,
            pending_sends: 0,
            notice: None,
            chat_scroll: 0,
            chat_height: 0,
            total_chat_lines: 0,
            stick_to_bottom: true,
            animation_frame: 0,
            events,
        }
    }

    /// Submit the compose buffer. Blank input is a no-op. Otherwise
    /// the user's message lands in history immediately and the buffer
    /// clears, before the round trip runs; the reply (or failure)
    /// comes back through the event queue.
    pub fn submit(&mut self) {
        let Some(request) = route(self.store.buffer(), self.store.selection()) else {
            return;
        };

        let input = self.store.take_buffer();
        self.store.append_message(ChatMessage::user(&input));
        self.begin_send(request);
    }

    fn begin_send(&mut self, request: SendRequest) {
        self.pending_sends += 1;
        self.stick_to_bottom = true;

        let backend = self.store.selection();
        let client = self.client.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = client.send(&request).await;
            let _ = events.send(AppEvent::Reply(SendOutcome { backend, result }));
        });
    }

    /// Applied on the main loop as completions drain off the queue,
    /// so replies append in the order the relay answered, which may
    /// differ from submission order.
    pub fn apply_outcome(&mut self, outcome: SendOutcome) {
        self.pending_sends = self.pending_sends.saturating_sub(1);

        match outcome.result {
            Ok(reply) => {
                self.store
                    .append_message(normalize_reply(&reply, outcome.backend));
            }
            Err(err) => {
                tracing::error!(error = %err, backend = outcome.backend.as_str(), "send failed");
                self.notice = Some(format!("send failed: {err:#}"));
            }
        }
    }

    pub fn toggle_backend(&mut self) {
        self.store.set_selection(self.store.selection().toggled());
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick(&mut self) {
        if self.pending_sends > 0 {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn max_scroll(&self) -> u16 {
        self.total_chat_lines.saturating_sub(self.chat_height)
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.stick_to_bottom = false;
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(self.max_scroll());
        if self.chat_scroll == self.max_scroll() {
            self.stick_to_bottom = true;
        }
    }

    pub fn half_page(&self) -> u16 {
        (self.chat_height / 2).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{MessageContent, Role};
    use anyhow::anyhow;
    use tokio::sync::mpsc;

    fn test_app(selection: Backend) -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        // Nothing listens on this address; tests only exercise the
        // synchronous half of the send path.
        let client = RelayClient::new("http://127.0.0.1:9");
        App::new(ConversationStore::new(selection), client, tx)
    }

    fn reply_ok(backend: Backend, text: &str) -> SendOutcome {
        SendOutcome {
            backend,
            result: Ok(vec![WireMessage {
                role: None,
                message: Some(text.to_string()),
            }]),
        }
    }

    #[tokio::test]
    async fn test_submit_appends_user_message_and_clears_buffer() {
        let mut app = test_app(Backend::Gpt);
        for c in "hello".chars() {
            app.store.insert_char(c);
        }

        app.submit();

        assert_eq!(app.store.buffer(), "");
        assert_eq!(app.pending_sends, 1);
        assert_eq!(app.store.messages().len(), 1);
        assert_eq!(app.store.messages()[0].role, Role::User);
        assert_eq!(
            app.store.messages()[0].content,
            MessageContent::Text("hello".to_string())
        );
    }

    #[tokio::test]
    async fn test_blank_submit_mutates_nothing() {
        let mut app = test_app(Backend::Gpt);
        for c in "   ".chars() {
            app.store.insert_char(c);
        }

        app.submit();

        assert_eq!(app.store.buffer(), "   ");
        assert_eq!(app.pending_sends, 0);
        assert!(app.store.messages().is_empty());
    }

    #[test]
    fn test_replies_append_in_completion_order() {
        let mut app = test_app(Backend::Gpt);

        // Two submissions, user halves in submission order.
        app.store.append_message(ChatMessage::user("hi"));
        app.store.append_message(ChatMessage::user("@image cat"));
        app.pending_sends = 2;

        // The second send resolves first.
        app.apply_outcome(reply_ok(Backend::Gpt, "cat pic\nhttp://img/cat.png"));
        app.apply_outcome(reply_ok(Backend::Gpt, "hello there"));

        let contents: Vec<_> = app.store.messages().iter().map(|m| &m.content).collect();
        assert_eq!(
            contents,
            vec![
                &MessageContent::Text("hi".to_string()),
                &MessageContent::Text("@image cat".to_string()),
                &MessageContent::CaptionedImage {
                    caption: "cat pic".to_string(),
                    url: "http://img/cat.png".to_string(),
                },
                &MessageContent::Text("hello there".to_string()),
            ]
        );
        assert_eq!(app.pending_sends, 0);
    }

    #[test]
    fn test_failed_send_keeps_history_and_raises_notice() {
        let mut app = test_app(Backend::Gemini);
        app.store.append_message(ChatMessage::user("hi"));
        app.pending_sends = 1;

        app.apply_outcome(SendOutcome {
            backend: Backend::Gemini,
            result: Err(anyhow!("connection refused")),
        });

        // The user's half stays; no reply half is appended.
        assert_eq!(app.store.messages().len(), 1);
        assert!(app.notice.as_deref().unwrap().contains("connection refused"));
        assert_eq!(app.pending_sends, 0);
    }

    #[test]
    fn test_reply_attributed_to_backend_at_dispatch() {
        let mut app = test_app(Backend::Gpt);
        app.store.append_message(ChatMessage::user("hi"));
        app.pending_sends = 1;

        // Selection moves on while the send is in flight.
        app.toggle_backend();
        assert_eq!(app.store.selection(), Backend::Gemini);

        app.apply_outcome(reply_ok(Backend::Gpt, "late answer"));
        assert_eq!(app.store.messages()[1].role, Role::Gpt);
    }
}
