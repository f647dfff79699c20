//! HTTP client for the Findora REST backend.
//!
//! [`ApiClient`] owns the `reqwest` client and the session store. It injects
//! `Authorization: {tokenType} {accessToken}`, decodes JSON through the
//! [`envelope`] shim and turns every non-2xx response into a typed
//! [`ApiError`]. Per-resource calls live in the submodules as further
//! `impl ApiClient` blocks.

pub mod auth;
pub mod authority;
pub mod bookmarks;
pub mod comments;
pub mod envelope;
pub mod images;
pub mod likes;
pub mod messages;
pub mod posts;
pub mod users;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::session::SessionStore;

/// Whether a request carries the session token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    /// Never attach a token (login, refresh, registration)
    Anonymous,
    /// Attach the token when a valid session exists
    Session,
    /// Fail with `NotAuthenticated` when there is no valid session
    Required,
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, session: SessionStore) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            session,
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn request(
        &self,
        method: Method,
        path: &str,
        access: Access,
    ) -> ApiResult<RequestBuilder> {
        let mut builder = self.http.request(method, self.url(path));

        if access != Access::Anonymous {
            match self.session.authorization_header() {
                Some(header) => {
                    builder = builder.header(reqwest::header::AUTHORIZATION, header);
                }
                None if access == Access::Required => return Err(ApiError::NotAuthenticated),
                None => {}
            }
        }

        Ok(builder)
    }

    /// Send a request, mapping transport failures and non-2xx statuses
    pub(crate) async fn execute(&self, builder: RequestBuilder) -> ApiResult<Response> {
        let request = builder.build()?;
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "Sending request");

        let response = self.http.execute(request).await.map_err(|e| {
            warn!(%method, %url, error = %e, "Request failed");
            ApiError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = ApiError::from_response(status, &body);
            warn!(%method, %url, status = status.as_u16(), error = %err, "Request rejected");
            return Err(err);
        }

        Ok(response)
    }

    /// Send and read the body as JSON; an empty body reads as `null`
    pub(crate) async fn execute_json(&self, builder: RequestBuilder) -> ApiResult<Value> {
        let response = self.execute(builder).await?;
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    pub(crate) async fn get_item<T: DeserializeOwned>(
        &self,
        path: &str,
        access: Access,
    ) -> ApiResult<T> {
        let value = self.execute_json(self.request(Method::GET, path, access)?).await?;
        envelope::normalize_item(value)
    }

    pub(crate) async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        access: Access,
    ) -> ApiResult<Vec<T>> {
        let value = self.execute_json(self.request(Method::GET, path, access)?).await?;
        envelope::normalize_list(value)
    }

    pub(crate) async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        access: Access,
    ) -> ApiResult<T> {
        let builder = self.request(method, path, access)?.json(body);
        let value = self.execute_json(builder).await?;
        envelope::normalize_item(value)
    }

    /// Send a request whose response body is ignored
    pub(crate) async fn send_unit<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        access: Access,
    ) -> ApiResult<()> {
        let mut builder = self.request(method, path, access)?;
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.execute(builder).await?;
        Ok(())
    }
}
