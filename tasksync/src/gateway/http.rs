//! HTTP gateway to the remote task service.
//!
//! Maps each [`TaskGateway`] operation onto one JSON request against the
//! service's base URL (e.g. `http://127.0.0.1:10000/api/tasks`):
//!
//! ```text
//! GET    {base}              -> [Task]
//! POST   {base}              -> Task            (body: TaskDraft)
//! PUT    {base}/{id}         -> Task            (body: Task)
//! DELETE {base}/{id}         -> no content
//! PATCH  {base}/{id}/toggle  -> Task
//! POST   {base}/{id}/move    -> MoveOutcome     (body: MoveRequest)
//! ```

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use tasksync_proto::codec;
use tasksync_proto::{MoveDirection, MoveOutcome, MoveRequest, Task, TaskDraft, TaskId};
use url::Url;

use super::{GatewayError, TaskGateway};

/// Default connect timeout for new connections to the service.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// JSON-over-HTTP implementation of [`TaskGateway`].
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base: Url,
}

impl HttpGateway {
    /// Creates a gateway for the collection at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidUrl`] if `base_url` is not an absolute
    /// http(s) URL, or [`GatewayError::Transport`] if the HTTP client cannot
    /// be built.
    pub fn new(base_url: &str, connect_timeout: Duration) -> Result<Self, GatewayError> {
        let base =
            Url::parse(base_url).map_err(|e| GatewayError::InvalidUrl(format!("{base_url}: {e}")))?;
        if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
            return Err(GatewayError::InvalidUrl(format!(
                "{base_url}: expected an http or https url"
            )));
        }
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(Self { client, base })
    }

    /// Returns the collection URL requests are made against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base
    }

    /// Builds `{base}/{segments...}`, tolerating a trailing slash on the base.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Sends one request and returns the raw success body.
    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> Result<Vec<u8>, GatewayError> {
        tracing::debug!(%method, %url, "gateway request");
        let mut request = self.client.request(method, url).header(ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes).into_owned();
            tracing::warn!(status = status.as_u16(), %body, "gateway request rejected");
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(bytes.to_vec())
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> Result<T, GatewayError> {
        let bytes = self.send(method, url, body).await?;
        codec::decode(&bytes).map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

fn encode_body<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, GatewayError> {
    codec::encode(value).map_err(|e| GatewayError::Encode(e.to_string()))
}

impl TaskGateway for HttpGateway {
    async fn list(&self) -> Result<Vec<Task>, GatewayError> {
        self.send_json(Method::GET, self.endpoint(&[]), None).await
    }

    async fn create(&self, draft: TaskDraft) -> Result<Task, GatewayError> {
        let body = encode_body(&draft)?;
        self.send_json(Method::POST, self.endpoint(&[]), Some(body))
            .await
    }

    async fn update(&self, task: Task) -> Result<Task, GatewayError> {
        let body = encode_body(&task)?;
        let id = task.id.to_string();
        self.send_json(Method::PUT, self.endpoint(&[&id]), Some(body))
            .await
    }

    async fn delete(&self, id: TaskId) -> Result<(), GatewayError> {
        let id = id.to_string();
        self.send(Method::DELETE, self.endpoint(&[&id]), None)
            .await
            .map(drop)
    }

    async fn toggle(&self, id: TaskId) -> Result<Task, GatewayError> {
        let id = id.to_string();
        self.send_json(Method::PATCH, self.endpoint(&[&id, "toggle"]), None)
            .await
    }

    async fn move_task(
        &self,
        id: TaskId,
        direction: MoveDirection,
    ) -> Result<MoveOutcome, GatewayError> {
        let body = encode_body(&MoveRequest { direction })?;
        let id = id.to_string();
        self.send_json(Method::POST, self.endpoint(&[&id, "move"]), Some(body))
            .await
    }
}
