use std::future::Future;

use serde_json::Value;

use crate::api::{ApiClient, ApiError, Conversation, WebhookEvent};
use crate::state::{self, Action, Request, ViewState};

pub type ApiResult<T> = Result<T, ApiError>;

/// The three remote operations the view state depends on.
pub trait ConversationGateway {
    fn list_conversations(&self) -> impl Future<Output = ApiResult<Vec<Conversation>>> + Send;
    fn get_conversation(&self, id: &str) -> impl Future<Output = ApiResult<Conversation>> + Send;
    fn submit_event(&self, event: &WebhookEvent) -> impl Future<Output = ApiResult<Value>> + Send;
}

impl ConversationGateway for ApiClient {
    fn list_conversations(&self) -> impl Future<Output = ApiResult<Vec<Conversation>>> + Send {
        self.conversations()
    }

    fn get_conversation(&self, id: &str) -> impl Future<Output = ApiResult<Conversation>> + Send {
        self.conversation(id)
    }

    fn submit_event(&self, event: &WebhookEvent) -> impl Future<Output = ApiResult<Value>> + Send {
        ApiClient::submit_event(self, event)
    }
}

/// Performs `request` and reports the result as the action to dispatch next.
pub async fn execute<G: ConversationGateway>(gateway: &G, request: Request) -> Action {
    match request {
        Request::LoadConversations => {
            let result = gateway.list_conversations().await.map_err(|e| e.to_string());
            Action::ConversationsLoaded(result)
        }
        Request::LoadConversation(id) => {
            let result = gateway.get_conversation(&id).await.map_err(|e| e.to_string());
            Action::ConversationLoaded { id, result }
        }
        Request::Submit(event) => {
            let result = gateway
                .submit_event(&event)
                .await
                .map(|_| ())
                .map_err(|e| e.to_string());
            Action::EventSubmitted { event, result }
        }
    }
}

/// Drives [`ViewState`] against a gateway, awaiting each request in turn.
pub struct Controller<G> {
    gateway: G,
    state: ViewState,
}

impl<G: ConversationGateway> Controller<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway, state: ViewState::new() }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Applies `action` and every follow-up it triggers.
    pub async fn dispatch(&mut self, action: Action) {
        let mut action = action;
        loop {
            let (next, request) = state::update(&self.state, action);
            self.state = next;
            match request {
                Some(request) => action = execute(&self.gateway, request).await,
                None => break,
            }
        }
    }

    pub async fn refresh(&mut self) {
        self.dispatch(Action::Refresh).await
    }

    pub async fn select_conversation(&mut self, id: &str) {
        self.dispatch(Action::Select(id.to_string())).await
    }

    pub async fn send_message(&mut self, text: &str) {
        self.dispatch(Action::EditDraft(text.to_string())).await;
        self.dispatch(Action::Send).await
    }

    pub async fn close_conversation(&mut self) {
        self.dispatch(Action::Close).await
    }
}
