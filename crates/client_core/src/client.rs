use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use shared::{
    domain::{DocumentId, PitchFields, StoredStartup, UserId},
    error::ApiError,
    protocol::{CreatePitchRequest, LoginRequest, LoginResponse, SubmissionResult},
};
use tokio::sync::RwLock;
use tracing::debug;

use crate::{error::ClientError, PitchSubmitter};

/// HTTP client for the pitch server.
pub struct PitchClient {
    http: Client,
    server_url: String,
    token: RwLock<Option<String>>,
}

impl PitchClient {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            server_url: server_url.into().trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        }
    }

    pub async fn login(&self, username: &str) -> Result<UserId, ClientError> {
        let res = self
            .http
            .post(format!("{}/login", self.server_url))
            .json(&LoginRequest {
                username: username.to_string(),
            })
            .send()
            .await?;
        let body: LoginResponse = decode_or_api_error(res).await?;
        *self.token.write().await = Some(body.token);
        Ok(body.user_id)
    }

    pub async fn is_logged_in(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// Posts a pitch. The server answers every outcome with a
    /// `SubmissionResult` body, so the status code is not inspected.
    pub async fn submit_pitch(
        &self,
        previous: &SubmissionResult,
        fields: &PitchFields,
        pitch: &str,
    ) -> Result<SubmissionResult, ClientError> {
        let request = self
            .http
            .post(format!("{}/pitches", self.server_url))
            .json(&CreatePitchRequest {
                previous: previous.clone(),
                fields: fields.clone(),
                pitch: pitch.to_string(),
            });
        let res = self.authorized(request).await.send().await?;
        let status = res.status();
        let bytes = res.bytes().await?;
        serde_json::from_slice::<SubmissionResult>(&bytes).map_err(|error| {
            debug!(%status, %error, "undecodable submission response");
            ClientError::UnexpectedResponse {
                status: status.as_u16(),
            }
        })
    }

    pub async fn fetch_startup(&self, id: &DocumentId) -> Result<StoredStartup, ClientError> {
        let res = self
            .http
            .get(format!("{}/startup/{id}", self.server_url))
            .send()
            .await?;
        decode_or_api_error(res).await
    }

    async fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token.read().await.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl PitchSubmitter for PitchClient {
    async fn create_pitch(
        &self,
        previous: &SubmissionResult,
        fields: &PitchFields,
        pitch: &str,
    ) -> Result<SubmissionResult> {
        Ok(self.submit_pitch(previous, fields, pitch).await?)
    }
}

async fn decode_or_api_error<T: serde::de::DeserializeOwned>(
    res: Response,
) -> Result<T, ClientError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res.json().await?);
    }

    let bytes = res.bytes().await?;
    match serde_json::from_slice::<ApiError>(&bytes) {
        Ok(api_error) => Err(api_error.into()),
        Err(_) => Err(ClientError::UnexpectedResponse {
            status: status.as_u16(),
        }),
    }
}

#[cfg(test)]
#[path = "tests/client_tests.rs"]
mod tests;
