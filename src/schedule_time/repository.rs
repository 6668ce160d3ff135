//! Repository seam and REST implementation for the `schedule-times` resource.

use super::config::ClientConfig;
use super::error::ScheduleTimeError;
use super::types::{ListQuery, NewScheduleTime, Page, ScheduleTime, ScheduleTimePatch};
use async_trait::async_trait;
use rand::Rng;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use url::Url;

/// Data access boundary for schedule-time records.
///
/// The synchronizer only talks to this trait, so tests and alternative
/// transports plug in without touching the optimistic-update logic.
#[async_trait]
pub trait ScheduleTimeRepository: Send + Sync {
    async fn list(&self, query: &ListQuery) -> Result<Page<ScheduleTime>, ScheduleTimeError>;

    async fn create(&self, new: &NewScheduleTime) -> Result<ScheduleTime, ScheduleTimeError>;

    async fn update(
        &self,
        id: i64,
        patch: &ScheduleTimePatch,
    ) -> Result<ScheduleTime, ScheduleTimeError>;

    /// Hard delete (the legacy list variant). Soft deletes go through
    /// `update` with an `isDeleted` patch.
    async fn delete(&self, id: i64) -> Result<(), ScheduleTimeError>;
}

/// REST repository backed by the dashboard's backend.
pub struct RestScheduleTimeRepository {
    client: Client,
    config: ClientConfig,
    /// Log-safe identifier for the configured token; never the token itself
    token_fingerprint: Option<String>,
}

impl RestScheduleTimeRepository {
    pub fn new(config: ClientConfig) -> Result<Self, ScheduleTimeError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ScheduleTimeError::Network {
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        let token_fingerprint = config.auth_token.as_deref().map(token_fingerprint);
        if let Some(fingerprint) = &token_fingerprint {
            debug!(token = %fingerprint, "Repository configured with bearer token");
        }

        Ok(Self {
            client,
            config,
            token_fingerprint,
        })
    }

    fn resource_url(&self) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.resource
        )
    }

    fn record_url(&self, id: i64) -> String {
        format!("{}/{}", self.resource_url(), id)
    }

    fn list_url(&self, query: &ListQuery) -> Result<Url, ScheduleTimeError> {
        let mut url = Url::parse(&self.resource_url())?;
        url.query_pairs_mut().extend_pairs(query.query_pairs());
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Returns the log-safe fingerprint of the configured token, if any.
    pub fn token_fingerprint(&self) -> Option<&str> {
        self.token_fingerprint.as_deref()
    }
}

#[async_trait]
impl ScheduleTimeRepository for RestScheduleTimeRepository {
    async fn list(&self, query: &ListQuery) -> Result<Page<ScheduleTime>, ScheduleTimeError> {
        let correlation_id = generate_correlation_id();
        let url = self.list_url(query)?;
        info!(correlation_id = %correlation_id, url = %url, "Listing schedule times");

        let response = self.authorized(self.client.get(url)).send().await?;
        let response = check_status(response, None, &correlation_id).await?;
        let page: Page<ScheduleTime> = decode_json(response).await?;

        if (page.items.len() as u32) < query.page_size {
            debug!(
                correlation_id = %correlation_id,
                returned = page.items.len(),
                requested = query.page_size,
                "Server returned a short page"
            );
        }

        Ok(page)
    }

    async fn create(&self, new: &NewScheduleTime) -> Result<ScheduleTime, ScheduleTimeError> {
        let correlation_id = generate_correlation_id();
        info!(
            correlation_id = %correlation_id,
            day_group = %new.day_group_name,
            "Creating schedule time"
        );

        let response = self
            .authorized(self.client.post(self.resource_url()))
            .json(new)
            .send()
            .await?;
        let response = check_status(response, None, &correlation_id).await?;
        decode_json(response).await
    }

    async fn update(
        &self,
        id: i64,
        patch: &ScheduleTimePatch,
    ) -> Result<ScheduleTime, ScheduleTimeError> {
        let correlation_id = generate_correlation_id();
        info!(correlation_id = %correlation_id, id = id, "Updating schedule time");

        let response = self
            .authorized(self.client.patch(self.record_url(id)))
            .json(patch)
            .send()
            .await?;
        let response = check_status(response, Some(id), &correlation_id).await?;
        decode_json(response).await
    }

    async fn delete(&self, id: i64) -> Result<(), ScheduleTimeError> {
        let correlation_id = generate_correlation_id();
        info!(correlation_id = %correlation_id, id = id, "Deleting schedule time");

        let response = self
            .authorized(self.client.delete(self.record_url(id)))
            .send()
            .await?;
        check_status(response, Some(id), &correlation_id).await?;
        Ok(())
    }
}

/// Maps a non-success status to the matching error, consuming the body for
/// diagnostics on unexpected statuses.
async fn check_status(
    response: Response,
    id: Option<i64>,
    correlation_id: &str,
) -> Result<Response, ScheduleTimeError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::NOT_FOUND => Err(ScheduleTimeError::NotFound {
            id: id.unwrap_or_default(),
        }),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            warn!(correlation_id = %correlation_id, status = %status, "Backend rejected credentials");
            Err(ScheduleTimeError::Unauthorized {
                status: status.as_u16(),
            })
        }
        _ => {
            let body = response.text().await.unwrap_or_default();
            Err(ScheduleTimeError::UnexpectedResponse {
                message: format!("status {}: {}", status, excerpt(&body)),
            })
        }
    }
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, ScheduleTimeError> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| ScheduleTimeError::Decode {
        message: e.to_string(),
    })
}

/// Truncates a response body for log/error messages.
fn excerpt(body: &str) -> &str {
    let end = body
        .char_indices()
        .nth(200)
        .map(|(i, _)| i)
        .unwrap_or(body.len());
    body[..end].trim_end()
}

/// Generates a unique correlation ID for request tracing.
fn generate_correlation_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros();
    let random: u32 = rand::thread_rng().gen();
    format!("{:x}-{:08x}", timestamp & 0xFFFF_FFFF, random)
}

/// Hashes a bearer token to a short identifier safe to put in logs.
fn token_fingerprint(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    let digest = hasher.finalize();
    digest[..8].iter().map(|b| format!("{:02x}", b)).collect()
}
