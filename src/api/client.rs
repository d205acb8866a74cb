use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::api::error::ApiError;
use crate::api::events::WebhookEvent;
use crate::api::models::Conversation;

#[derive(Debug, Clone)]
pub struct ApiClient {
    pub http: HttpClient,
    base: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_http(HttpClient::new(), base_url)
    }

    pub fn with_http(http: HttpClient, base_url: &str) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url.trim())?;
        let base = parsed.as_str().trim_end_matches('/').to_string();
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base, path)
    }

    async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(ApiError::Server { status: status.as_u16(), body: text });
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// `GET {base}/conversations/`
    pub async fn conversations(&self) -> Result<Vec<Conversation>, ApiError> {
        let endpoint = self.endpoint("conversations/");
        log::debug!("GET {endpoint}");
        let resp = self.http.get(&endpoint).send().await?;
        Self::read_json(resp).await
    }

    /// `GET {base}/conversations/{id}/`, messages in server order.
    pub async fn conversation(&self, id: &str) -> Result<Conversation, ApiError> {
        let endpoint = self.endpoint(&format!("conversations/{id}/"));
        log::debug!("GET {endpoint}");
        let resp = self.http.get(&endpoint).send().await?;
        Self::read_json(resp).await
    }

    /// `POST {base}/webhook/`. Returns whatever JSON the server answered with.
    pub async fn submit_event(&self, event: &WebhookEvent) -> Result<Value, ApiError> {
        let endpoint = self.endpoint("webhook/");
        log::debug!("POST {endpoint} ({})", event.conversation_id());
        // .json() sets Content-Type: application/json
        let resp = self.http.post(&endpoint).json(event).send().await?;
        Self::read_json(resp).await
    }
}
