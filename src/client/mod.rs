//! HTTP client for the upstream feed and relation APIs
//!
//! The [`DynamicApi`] trait is the seam between the engine and the network.
//! [`HttpApi`] implements it over `reqwest`; tests substitute an in-memory
//! double. Every request made through [`HttpApi`] runs under the configured
//! [`RetryConfig`](crate::config::RetryConfig).

mod form;


pub use form::encode_form;

use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, COOKIE};

use crate::config::{ApiConfig, Config, RetryConfig};
use crate::error::{Error, Result};
use crate::retry::with_retry;
use crate::session::Session;
use crate::types::{FollowerList, OperationResult, SpaceHistory};

/// Upstream operations used by the bulk engine
#[async_trait]
pub trait DynamicApi: Send + Sync {
    /// Fetch one page of `host_uid`'s activity feed, starting after `offset`
    ///
    /// An offset of `"0"` requests the newest page.
    async fn space_history(&self, host_uid: u64, offset: &str) -> Result<SpaceHistory>;

    /// Delete one of the signed-in user's feed entries
    async fn remove_dynamic(&self, entry_id: &str) -> Result<OperationResult>;

    /// Unfollow `target_uid` on behalf of the signed-in user
    async fn unfollow_user(&self, target_uid: u64) -> Result<OperationResult>;

    /// Fetch the follower list of `owner_uid` in one call
    async fn followers(&self, owner_uid: u64) -> Result<FollowerList>;
}

/// [`DynamicApi`] over HTTP
pub struct HttpApi {
    http: reqwest::Client,
    api: ApiConfig,
    retry: RetryConfig,
    session: Session,
}

impl HttpApi {
    /// Create a client for the configured endpoints
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the HTTP client cannot be built.
    pub fn new(config: &Config, session: Session) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.api.timeout)
            .user_agent(config.api.user_agent.clone())
            .build()
            .map_err(|e| Error::config(format!("failed to create HTTP client: {e}"), "api"))?;

        Ok(Self {
            http,
            api: config.api.clone(),
            retry: config.retry.clone(),
            session,
        })
    }

    /// Session used for credentialed requests
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Send one credentialed request and decode the JSON envelope
    ///
    /// GET requests carry `payload` as the query string; other methods send it
    /// as an `application/x-www-form-urlencoded` body. The session cookie is
    /// attached. No retry is applied here.
    ///
    /// # Errors
    /// [`Error::Transport`] when the request cannot be sent or read,
    /// [`Error::HttpStatus`] for a non-2xx status, [`Error::Serialization`]
    /// when the body is not a JSON envelope.
    pub async fn request(
        &self,
        url: &str,
        payload: &[(&str, String)],
        method: Method,
    ) -> Result<OperationResult> {
        self.send(url, payload, method, true).await
    }

    async fn send(
        &self,
        url: &str,
        payload: &[(&str, String)],
        method: Method,
        with_cookie: bool,
    ) -> Result<OperationResult> {
        let encoded = encode_form(payload);

        let mut request = if method == Method::GET {
            let full_url = if encoded.is_empty() {
                url.to_string()
            } else if url.contains('?') {
                format!("{url}&{encoded}")
            } else {
                format!("{url}?{encoded}")
            };
            self.http.get(full_url)
        } else {
            self.http
                .request(method.clone(), url)
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(encoded)
        };

        if with_cookie {
            request = request.header(COOKIE, self.session.cookie_header());
        }

        tracing::debug!(method = %method, url = %url, "sending request");

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl DynamicApi for HttpApi {
    async fn space_history(&self, host_uid: u64, offset: &str) -> Result<SpaceHistory> {
        let payload = [
            ("visitor_uid", self.session.uid().to_string()),
            ("host_uid", host_uid.to_string()),
            ("offset_dynamic_id", offset.to_string()),
        ];

        let result = with_retry(&self.retry, || {
            self.request(&self.api.feed_url, &payload, Method::GET)
        })
        .await?;

        result.into_data()
    }

    async fn remove_dynamic(&self, entry_id: &str) -> Result<OperationResult> {
        let payload = [
            ("dynamic_id", entry_id.to_string()),
            ("csrf_token", self.session.csrf_token().to_string()),
        ];

        with_retry(&self.retry, || {
            self.request(&self.api.delete_url, &payload, Method::POST)
        })
        .await
    }

    async fn unfollow_user(&self, target_uid: u64) -> Result<OperationResult> {
        let csrf = self.session.csrf_token().to_string();
        let payload = [
            ("uid", self.session.uid().to_string()),
            ("type", "0".to_string()),
            ("follow", target_uid.to_string()),
            ("re_src", "18".to_string()),
            ("csrf_token", csrf.clone()),
            ("csrf", csrf),
            ("visit_id", String::new()),
        ];

        with_retry(&self.retry, || {
            self.request(&self.api.unfollow_url, &payload, Method::POST)
        })
        .await
    }

    async fn followers(&self, owner_uid: u64) -> Result<FollowerList> {
        let payload = [("vmid", owner_uid.to_string())];

        // The follower list is a public endpoint; no session cookie is sent
        let result = with_retry(&self.retry, || {
            self.send(&self.api.followers_url, &payload, Method::GET, false)
        })
        .await?;

        result.into_data()
    }
}
