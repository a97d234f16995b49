//! HTTP client implementation.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, instrument};
use url::Url;

use super::ApiError;
use super::envelope;
use crate::config::ClientConfig;
use crate::error::capture_error;
use crate::notify::{Notification, Notifier};
use crate::router::{LOGIN_PATH, Navigator};
use crate::session::Session;

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the Points Mall backend.
///
/// Cheap to clone; clones share the connection pool, the session and the
/// notification sink.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
    api_prefix: String,
    session: Session,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(
        config: &ClientConfig,
        session: Session,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Request(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url: config.base_url.clone(),
                api_prefix: config.api_prefix.clone(),
                session,
                notifier,
                navigator,
            }),
        })
    }

    /// Absolute URL for an API path, with optional query parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Request`] if the path does not form a valid URL.
    pub fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, ApiError> {
        let full_path = format!(
            "{}/{}",
            self.inner.api_prefix,
            path.trim_start_matches('/')
        );
        let mut url = self
            .inner
            .base_url
            .join(&full_path)
            .map_err(|e| ApiError::Request(format!("invalid path {path}: {e}")))?;

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    // =========================================================================
    // Verbs
    // =========================================================================

    /// `GET` an API path.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; see [`ApiError`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.get_with_query(path, &[]).await
    }

    /// `GET` an API path with query parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; see [`ApiError`].
    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = self.checked_endpoint(path, query)?;
        self.execute(Method::GET, url, None).await
    }

    /// `POST` a JSON body to an API path.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; see [`ApiError`].
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.checked_endpoint(path, &[])?;
        let body = serde_json::to_value(body)?;
        self.execute(Method::POST, url, Some(body)).await
    }

    /// `PUT` a JSON body to an API path.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; see [`ApiError`].
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.checked_endpoint(path, &[])?;
        let body = serde_json::to_value(body)?;
        self.execute(Method::PUT, url, Some(body)).await
    }

    /// `DELETE` an API path.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; see [`ApiError`].
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.checked_endpoint(path, &[])?;
        self.execute(Method::DELETE, url, None).await
    }

    // =========================================================================
    // Request Pipeline
    // =========================================================================

    fn checked_endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, ApiError> {
        self.endpoint(path, query).inspect_err(|e| {
            error!(error = %e, "Request error");
        })
    }

    /// Send a request and map every outcome to a value or a reported error.
    #[instrument(skip_all, fields(method = %method, path = %url.path()))]
    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let mut request = self.inner.http.request(method, url);
        if let Some(token) = self.inner.session.bearer() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) if e.is_builder() => {
                error!(error = %e, "Request error");
                return Err(ApiError::Request(e.to_string()));
            }
            Err(e) => return Err(self.network_failure(e)),
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => return Err(self.network_failure(e)),
        };

        if !status.is_success() {
            return Err(self.status_failure(status, &text));
        }

        let body: Value = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).map_err(|e| {
                error!(
                    error = %e,
                    body = %text.chars().take(500).collect::<String>(),
                    "Failed to parse API response"
                );
                self.decode_failure(e)
            })?
        };

        if let Some(message) = envelope::logical_failure(&body) {
            debug!(reason = %message, "API rejected request");
            self.notify(&message);
            return Err(ApiError::Rejected { message });
        }

        serde_json::from_value(body).map_err(|e| {
            error!(error = %e, "API response has an unexpected shape");
            self.decode_failure(e)
        })
    }

    fn status_failure(&self, status: StatusCode, text: &str) -> ApiError {
        let server_message = envelope::server_message(text);
        self.notify(&envelope::status_message(
            status.as_u16(),
            server_message.as_deref(),
        ));

        if status == StatusCode::UNAUTHORIZED {
            self.inner.session.expire_token();
            self.inner.navigator.redirect(LOGIN_PATH);
        }

        let err = ApiError::Status {
            status: status.as_u16(),
            message: server_message,
        };
        if status.is_server_error() {
            capture_error(&err, "API returned server error");
        } else {
            debug!(status = %status, "API returned error status");
        }
        err
    }

    fn decode_failure(&self, err: serde_json::Error) -> ApiError {
        self.notify(envelope::REQUEST_FAILED);
        ApiError::Serialization(err)
    }

    fn network_failure(&self, err: reqwest::Error) -> ApiError {
        self.notify(envelope::NETWORK_ERROR);
        capture_error(&err, "API request failed without response");
        ApiError::Network(err)
    }

    fn notify(&self, message: &str) {
        self.inner.notifier.notify(Notification::new(message));
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("api_prefix", &self.inner.api_prefix)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::notify::NotificationLog;
    use crate::router::Router;
    use crate::storage::MemoryStore;

    fn client(base_url: &str, api_prefix: &str) -> ApiClient {
        let session = Session::new(Arc::new(MemoryStore::new()));
        let router = Router::new(session.clone());
        let mut config = ClientConfig::new(Url::parse(base_url).unwrap());
        config.api_prefix = api_prefix.to_string();
        ApiClient::new(
            &config,
            session,
            Arc::new(NotificationLog::new()),
            Arc::new(router),
        )
        .unwrap()
    }

    #[test]
    fn test_endpoint_joins_prefix() {
        let api = client("https://mall.example.com", "/api");

        assert_eq!(
            api.endpoint("/products", &[]).unwrap().as_str(),
            "https://mall.example.com/api/products"
        );
        assert_eq!(
            api.endpoint("orders/7", &[]).unwrap().as_str(),
            "https://mall.example.com/api/orders/7"
        );
    }

    #[test]
    fn test_endpoint_without_prefix() {
        let api = client("http://127.0.0.1:8080", "");

        assert_eq!(
            api.endpoint("/points/balance", &[]).unwrap().as_str(),
            "http://127.0.0.1:8080/points/balance"
        );
    }

    #[test]
    fn test_endpoint_query() {
        let api = client("https://mall.example.com", "/api");

        let url = api
            .endpoint("/products", &[("page", "2"), ("keyword", "tea cup")])
            .unwrap();
        assert_eq!(url.path(), "/api/products");
        assert_eq!(url.query(), Some("page=2&keyword=tea+cup"));
    }
}
