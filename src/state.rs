//! Conversation view state and the reducer that owns every change to it.
//!
//! UI handlers never mutate [`ViewState`] directly. They dispatch an
//! [`Action`] through [`update`], which returns the next state and, when the
//! action needs the server, a [`Request`] for the runtime to perform. The
//! runtime reports back with another action carrying the result, so every
//! mutating operation is applied only after the server confirmed it.

use crate::api::{Conversation, ConversationStatus, EventKind, Message, WebhookEvent};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub conversations: Vec<Conversation>,
    pub selected: Option<Conversation>,
    pub draft: String,
    pub loading: bool,
    /// Conversation whose fetch is in flight. Responses for any other id are stale.
    pub pending: Option<String>,
    /// Last error worth showing to the user.
    pub notice: Option<String>,
    /// Conversation with a submitted event still awaiting the server's answer.
    pub submitting: Option<String>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.as_ref().is_some_and(|c| c.id == id)
    }

    /// Input row is shown only for an open, selected conversation.
    pub fn input_visible(&self) -> bool {
        self.selected.as_ref().is_some_and(Conversation::is_open)
    }

    pub fn close_visible(&self) -> bool {
        self.input_visible()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.is_some()
    }

    pub fn can_close(&self) -> bool {
        self.close_visible() && !self.is_submitting()
    }

    pub fn can_send(&self) -> bool {
        self.input_visible() && !self.is_submitting() && !self.draft.trim().is_empty()
    }
}

/// Result of a finished request, cloneable so it can travel through actions.
pub type Outcome<T> = Result<T, String>;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Refresh,
    Select(String),
    EditDraft(String),
    Send,
    Close,
    DismissNotice,
    ConversationsLoaded(Outcome<Vec<Conversation>>),
    ConversationLoaded { id: String, result: Outcome<Conversation> },
    EventSubmitted { event: WebhookEvent, result: Outcome<()> },
}

/// Side effect the runtime must perform against the API.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    LoadConversations,
    LoadConversation(String),
    Submit(WebhookEvent),
}

pub fn update(state: &ViewState, action: Action) -> (ViewState, Option<Request>) {
    let mut next = state.clone();
    let request = match action {
        Action::Refresh => Some(Request::LoadConversations),
        Action::Select(id) => {
            if !state.is_selected(&id) {
                next.draft.clear();
                next.submitting = None;
            }
            next.selected = None;
            next.loading = true;
            next.pending = Some(id.clone());
            Some(Request::LoadConversation(id))
        }
        Action::EditDraft(text) => {
            next.draft = text;
            None
        }
        Action::Send => {
            let Some(conv) = state.selected.as_ref() else {
                log::debug!("send skipped: no conversation selected");
                return (next, None);
            };
            if !conv.is_open() {
                log::debug!("send skipped: conversation {} is closed", conv.id);
                return (next, None);
            }
            if state.draft.trim().is_empty() {
                log::debug!("send skipped: blank draft");
                return (next, None);
            }
            if state.is_submitting() {
                log::debug!("send skipped: previous submit still in flight");
                return (next, None);
            }
            next.submitting = Some(conv.id.clone());
            let message = Message::outgoing(&conv.id, &state.draft);
            Some(Request::Submit(WebhookEvent::new_message(message)))
        }
        Action::Close => match state.selected.as_ref() {
            Some(conv) if conv.is_open() && !state.is_submitting() => {
                next.submitting = Some(conv.id.clone());
                Some(Request::Submit(WebhookEvent::close_conversation(&conv.id)))
            }
            _ => {
                log::debug!("close skipped: nothing open is selected or a submit is in flight");
                None
            }
        },
        Action::DismissNotice => {
            next.notice = None;
            None
        }
        Action::ConversationsLoaded(Ok(list)) => {
            next.conversations = list;
            None
        }
        Action::ConversationsLoaded(Err(err)) => {
            log::error!("Failed to load conversations: {err}");
            next.notice = Some(format!("Failed to load conversations: {err}"));
            None
        }
        Action::EventSubmitted { event, result } => {
            // a confirmation for a conversation already left must not unlock the current one
            if next.submitting.as_deref() == Some(event.conversation_id()) {
                next.submitting = None;
            }
            finish_submit(&mut next, event, result);
            None
        }
        Action::ConversationLoaded { id, result } => {
            if state.pending.as_deref() != Some(id.as_str()) {
                log::debug!("discarding stale response for conversation {id}");
                return (next, None);
            }
            next.pending = None;
            next.loading = false;
            match result {
                Ok(conv) => next.selected = Some(conv),
                Err(err) => {
                    log::error!("Failed to load conversation {id}: {err}");
                    next.notice = Some(format!("Failed to load conversation: {err}"));
                }
            }
            None
        }
    };
    (next, request)
}

fn finish_submit(state: &mut ViewState, event: WebhookEvent, result: Outcome<()>) {
    match result {
        Ok(()) => apply_confirmed(state, event.kind),
        Err(err) => {
            log::error!("Failed to submit event for {}: {err}", event.conversation_id());
            state.notice = Some(match event.kind {
                EventKind::NewMessage(_) => format!("Failed to send message: {err}"),
                EventKind::CloseConversation(_) => {
                    format!("Failed to close conversation: {err}")
                }
            });
        }
    }
}

fn apply_confirmed(state: &mut ViewState, kind: EventKind) {
    match kind {
        EventKind::NewMessage(message) => {
            let selected = state.selected.as_mut();
            let Some(conv) = selected.filter(|c| c.id == message.conversation_id) else {
                log::debug!("message {} confirmed after its conversation was left", message.id);
                return;
            };
            if conv.messages.iter().any(|m| m.id == message.id) {
                return;
            }
            if state.draft == message.content {
                state.draft.clear();
            }
            conv.messages.push(message);
        }
        EventKind::CloseConversation(data) => {
            if let Some(conv) = state.selected.as_mut().filter(|c| c.id == data.id) {
                conv.status = ConversationStatus::Closed;
            }
            if let Some(summary) = state.conversations.iter_mut().find(|c| c.id == data.id) {
                summary.status = ConversationStatus::Closed;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Direction;

    fn message(id: &str, conv: &str, direction: Direction, content: &str) -> Message {
        Message {
            id: id.into(),
            conversation_id: conv.into(),
            direction,
            content: content.into(),
            timestamp: None,
        }
    }

    fn conversation(id: &str, status: ConversationStatus) -> Conversation {
        Conversation {
            id: id.into(),
            status,
            created_at: None,
            closed_at: None,
            messages: vec![
                message(&format!("{id}-1"), id, Direction::Received, "hi"),
                message(&format!("{id}-2"), id, Direction::Sent, "hello"),
            ],
        }
    }

    fn open(id: &str) -> Conversation {
        conversation(id, ConversationStatus::Open)
    }

    fn viewing(conv: Conversation) -> ViewState {
        ViewState { conversations: vec![conv.clone()], selected: Some(conv), ..ViewState::new() }
    }

    fn loaded(id: &str, result: Outcome<Conversation>) -> Action {
        Action::ConversationLoaded { id: id.into(), result }
    }

    fn confirmed(event: WebhookEvent) -> Action {
        Action::EventSubmitted { event, result: Ok(()) }
    }

    fn rejected(event: WebhookEvent, err: &str) -> Action {
        Action::EventSubmitted { event, result: Err(err.into()) }
    }

    fn submitted(request: Option<Request>) -> WebhookEvent {
        match request {
            Some(Request::Submit(event)) => event,
            other => panic!("expected submit, got {other:?}"),
        }
    }

    #[test]
    fn select_enters_loading_and_discards_draft() {
        let mut state = viewing(conversation("a", ConversationStatus::Open));
        state.draft = "unsent".into();
        let (next, req) = update(&state, Action::Select("b".into()));
        assert_eq!(req, Some(Request::LoadConversation("b".into())));
        assert!(next.loading);
        assert!(next.selected.is_none());
        assert!(next.draft.is_empty());
        assert_eq!(next.pending.as_deref(), Some("b"));
    }

    #[test]
    fn stale_response_is_discarded() {
        let state = ViewState::new();
        let (state, _) = update(&state, Action::Select("a".into()));
        let (state, _) = update(&state, Action::Select("b".into()));
        let (state, _) = update(&state, loaded("b", Ok(open("b"))));
        let (state, _) = update(&state, loaded("a", Ok(open("a"))));
        assert!(state.is_selected("b"));
        assert!(!state.loading);
    }

    #[test]
    fn failed_load_returns_to_unselected() {
        let (state, _) = update(&ViewState::new(), Action::Select("a".into()));
        let (state, _) = update(&state, loaded("a", Err("HTTP 404".into())));
        assert!(state.selected.is_none());
        assert!(!state.loading);
        assert!(state.pending.is_none());
        assert!(state.notice.as_deref().is_some_and(|n| n.contains("404")));
    }

    #[test]
    fn stale_failure_does_not_clear_loading() {
        let (state, _) = update(&ViewState::new(), Action::Select("a".into()));
        let (state, _) = update(&state, Action::Select("b".into()));
        let (state, _) = update(&state, loaded("a", Err("boom".into())));
        assert!(state.loading);
        assert!(state.notice.is_none());
    }

    #[test]
    fn send_is_skipped_without_selection() {
        let state = ViewState { draft: "hello".into(), ..ViewState::new() };
        let (next, req) = update(&state, Action::Send);
        assert!(req.is_none());
        assert_eq!(next, state);
    }

    #[test]
    fn send_is_skipped_for_blank_draft() {
        let mut state = viewing(conversation("a", ConversationStatus::Open));
        for draft in ["", "   ", "\n\t"] {
            state.draft = draft.into();
            assert!(!state.can_send());
            let (next, req) = update(&state, Action::Send);
            assert!(req.is_none());
            assert_eq!(next, state);
        }
    }

    #[test]
    fn send_is_skipped_when_closed() {
        let mut state = viewing(conversation("a", ConversationStatus::Closed));
        state.draft = "hello".into();
        assert!(!state.can_send());
        assert!(!state.input_visible());
        let (next, req) = update(&state, Action::Send);
        assert!(req.is_none());
        assert_eq!(next, state);
    }

    #[test]
    fn send_waits_for_confirmation() {
        let mut state = viewing(conversation("a", ConversationStatus::Open));
        state.draft = "  new question ".into();
        let (pending, req) = update(&state, Action::Send);
        assert_eq!(pending.selected, state.selected);
        assert_eq!(pending.draft, state.draft);
        assert_eq!(pending.submitting.as_deref(), Some("a"));
        assert!(!pending.can_send());
        let event = submitted(req);
        let EventKind::NewMessage(msg) = &event.kind else { panic!("expected message") };
        assert_eq!(msg.content, "  new question ");
        assert_eq!(msg.direction, Direction::Sent);
        assert_eq!(msg.conversation_id, "a");

        let (next, _) = update(&pending, confirmed(event.clone()));
        assert!(next.submitting.is_none());
        let before = &state.selected.as_ref().unwrap().messages;
        let after = &next.selected.as_ref().unwrap().messages;
        assert_eq!(after.len(), before.len() + 1);
        assert_eq!(&after[..before.len()], &before[..]);
        assert_eq!(after.last(), Some(msg));
        assert!(next.draft.is_empty());
    }

    #[test]
    fn failed_send_leaves_state_unchanged() {
        let mut state = viewing(conversation("a", ConversationStatus::Open));
        state.draft = "hello".into();
        let (pending, req) = update(&state, Action::Send);
        let event = submitted(req);
        let (next, _) = update(&pending, rejected(event, "HTTP 400"));
        assert_eq!(next.selected, state.selected);
        assert!(next.submitting.is_none());
        assert!(next.can_send());
        assert_eq!(next.draft, "hello");
        assert!(next.notice.as_deref().is_some_and(|n| n.starts_with("Failed to send message")));
    }

    #[test]
    fn confirmation_after_switching_is_dropped() {
        let mut state = viewing(conversation("a", ConversationStatus::Open));
        state.draft = "hello".into();
        let (_, req) = update(&state, Action::Send);
        let event = submitted(req);
        let other = viewing(conversation("b", ConversationStatus::Open));
        let (next, _) = update(&other, confirmed(event));
        assert_eq!(next, other);
    }

    #[test]
    fn draft_edited_while_sending_is_kept() {
        let mut state = viewing(conversation("a", ConversationStatus::Open));
        state.draft = "first".into();
        let (mut pending, req) = update(&state, Action::Send);
        pending.draft = "second".into();
        let (next, _) = update(&pending, confirmed(submitted(req)));
        assert_eq!(next.draft, "second");
        assert_eq!(next.selected.unwrap().messages.last().unwrap().content, "first");
    }

    #[test]
    fn close_applies_after_confirmation_and_only_once() {
        let state = viewing(conversation("a", ConversationStatus::Open));
        assert!(state.close_visible());
        let (pending, req) = update(&state, Action::Close);
        assert!(pending.selected.as_ref().unwrap().is_open());
        let event = submitted(req);
        assert_eq!(event.conversation_id(), "a");

        let (closed, _) = update(&pending, confirmed(event));
        assert_eq!(closed.selected.as_ref().unwrap().status, ConversationStatus::Closed);
        assert_eq!(closed.conversations[0].status, ConversationStatus::Closed);
        assert!(!closed.input_visible());
        assert!(!closed.close_visible());

        let (again, req) = update(&closed, Action::Close);
        assert!(req.is_none());
        assert_eq!(again, closed);
    }

    #[test]
    fn second_close_while_first_is_in_flight_is_skipped() {
        let state = viewing(conversation("a", ConversationStatus::Open));
        let (first, req) = update(&state, Action::Close);
        let event = submitted(req);
        assert!(!first.can_close());

        let (second, req) = update(&first, Action::Close);
        assert!(req.is_none());
        assert_eq!(second, first);

        let (closed, _) = update(&second, confirmed(event));
        assert_eq!(closed.selected.unwrap().status, ConversationStatus::Closed);
    }

    #[test]
    fn repeated_send_of_one_draft_adds_one_message() {
        let mut state = viewing(conversation("a", ConversationStatus::Open));
        state.draft = "hello".into();
        let (first, req) = update(&state, Action::Send);
        let event = submitted(req);

        let (second, req) = update(&first, Action::Send);
        assert!(req.is_none());
        let (sent, _) = update(&second, confirmed(event));
        let before = state.selected.as_ref().unwrap().messages.len();
        assert_eq!(sent.selected.as_ref().unwrap().messages.len(), before + 1);
        assert!(sent.draft.is_empty());
    }

    #[test]
    fn close_waits_for_pending_send() {
        let mut state = viewing(conversation("a", ConversationStatus::Open));
        state.draft = "last words".into();
        let (sending, req) = update(&state, Action::Send);
        let (same, close) = update(&sending, Action::Close);
        assert!(close.is_none());
        let (sent, _) = update(&same, confirmed(submitted(req)));
        let (_, close) = update(&sent, Action::Close);
        assert!(matches!(close, Some(Request::Submit(_))));
    }

    #[test]
    fn leaving_a_conversation_releases_the_submit_lock() {
        let mut state = viewing(conversation("a", ConversationStatus::Open));
        state.draft = "hello".into();
        let (sending, req) = update(&state, Action::Send);
        let stale = submitted(req);

        let (state, _) = update(&sending, Action::Select("b".into()));
        assert!(state.submitting.is_none());
        let (mut state, _) = update(&state, loaded("b", Ok(open("b"))));
        state.draft = "for b".into();
        let (state, req) = update(&state, Action::Send);
        assert!(req.is_some());

        // a's late confirmation must not unlock b's in-flight submit
        let (state, _) = update(&state, confirmed(stale));
        assert_eq!(state.submitting.as_deref(), Some("b"));
    }

    #[test]
    fn reselecting_current_conversation_keeps_draft() {
        let mut state = viewing(conversation("a", ConversationStatus::Open));
        state.draft = "half typed".into();
        let (next, req) = update(&state, Action::Select("a".into()));
        assert_eq!(req, Some(Request::LoadConversation("a".into())));
        assert_eq!(next.draft, "half typed");
        assert!(next.loading);
    }

    #[test]
    fn failed_close_keeps_conversation_open() {
        let state = viewing(conversation("a", ConversationStatus::Open));
        let (pending, req) = update(&state, Action::Close);
        let (next, _) = update(&pending, rejected(submitted(req), "down"));
        assert!(next.selected.unwrap().is_open());
        assert!(next.notice.is_some());
    }

    #[test]
    fn refresh_replaces_list() {
        let state = viewing(conversation("a", ConversationStatus::Open));
        let (same, req) = update(&state, Action::Refresh);
        assert_eq!(req, Some(Request::LoadConversations));
        assert_eq!(same, state);
        let list = vec![
            conversation("x", ConversationStatus::Closed),
            conversation("y", ConversationStatus::Open),
        ];
        let (next, _) = update(&state, Action::ConversationsLoaded(Ok(list.clone())));
        assert_eq!(next.conversations, list);
        assert!(next.is_selected("a"));
    }

    #[test]
    fn notice_can_be_dismissed() {
        let (state, _) =
            update(&ViewState::new(), Action::ConversationsLoaded(Err("refused".into())));
        assert!(state.notice.is_some());
        assert!(state.conversations.is_empty());
        let (state, _) = update(&state, Action::DismissNotice);
        assert!(state.notice.is_none());
    }
}
