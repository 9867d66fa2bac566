//! Notification API client
//!
//! Pulls routed notifications from the publications router REST API.
//!
//! - list: `GET {base}/routed[/{repo_id}]?since=..&page=..&pageSize=..`
//! - single: `GET {base}/notification/{id}`

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::instrument;

use super::{NotificationRecord, NotificationSource};
use crate::config::Config;
use crate::cursor::Scope;
use crate::dates::format_datestamp;
use crate::error::{GateError, Result};

/// List responses are either a bare array or the paging envelope
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListBody {
    Envelope { notifications: Vec<NotificationRecord> },
    Bare(Vec<NotificationRecord>),
}

impl ListBody {
    fn into_records(self) -> Vec<NotificationRecord> {
        match self {
            ListBody::Envelope { notifications } => notifications,
            ListBody::Bare(records) => records,
        }
    }
}

#[derive(Clone)]
pub struct JperClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl JperClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.backend_timeout)
            .user_agent(concat!("oaigate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GateError::Config(format!("http client: {e}")))?;

        let base_url = Url::parse(config.backend_url.trim_end_matches('/'))
            .map_err(|e| GateError::Config(format!("backend url {:?}: {e}", config.backend_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(GateError::Config(format!(
                "backend url {:?} cannot carry a path",
                config.backend_url
            )));
        }

        Ok(Self {
            client,
            base_url,
            api_key: config.backend_api_key.clone(),
        })
    }

    /// Base URL with extra path segments, each percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.query(&[("api_key", key.as_str())]),
            None => request,
        }
    }
}

/// Map a non-success status to the error the engine understands
fn status_error(status: StatusCode, scope: Option<&Scope>, body: String) -> GateError {
    if status == StatusCode::NOT_FOUND {
        if let Some(Scope::Repository(id)) = scope {
            return GateError::UnknownScope(id.clone());
        }
    }
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        return GateError::BackendUnavailable(format!("status {status}"));
    }
    GateError::BackendRejected {
        status: status.as_u16(),
        message: body,
    }
}

#[async_trait]
impl NotificationSource for JperClient {
    #[instrument(level = "debug", skip(self))]
    async fn list(
        &self,
        scope: &Scope,
        since: DateTime<Utc>,
        page: u32,
        page_size: usize,
    ) -> Result<Vec<NotificationRecord>> {
        let url = match scope {
            Scope::Global => self.endpoint(&["routed"]),
            Scope::Repository(id) => self.endpoint(&["routed", id.as_str()]),
        };

        let since = format_datestamp(&since);
        let page = page.to_string();
        let page_size = page_size.to_string();
        let request = self.client.get(url).query(&[
            ("since", since.as_str()),
            ("page", page.as_str()),
            ("pageSize", page_size.as_str()),
        ]);

        let resp = self.authorize(request).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(status_error(status, Some(scope), body));
        }

        let body: ListBody = resp.json().await?;
        Ok(body.into_records())
    }

    #[instrument(level = "debug", skip(self))]
    async fn get(&self, id: &str) -> Result<Option<NotificationRecord>> {
        let url = self.endpoint(&["notification", id]);

        let resp = self.authorize(self.client.get(url)).send().await?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(status_error(status, None, body));
        }

        Ok(Some(resp.json().await?))
    }
}
