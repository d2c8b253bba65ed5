//! Workbrew API client.
//!
//! Low-level HTTP transport that handles workspace URLs, authentication and
//! response metadata. Resource records decode from what it returns.

use std::env;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::{form_urlencoded, Url};

use crate::error::{BrewError, Result};
use crate::query::QueryBuilder;
use crate::response::{ApiResponse, ResponseMeta};

const DEFAULT_API_URL: &str = "https://console.workbrew.com";
const DEFAULT_API_VERSION: &str = "v0";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const API_VERSION_HEADER: &str = "X-Workbrew-API-Version";
const USER_AGENT: &str = concat!("brewapi/", env!("CARGO_PKG_VERSION"));

const MIME_JSON: &str = "application/json";
const MIME_CSV: &str = "text/csv";

/// Per-request options for [`BrewClient::request`].
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Query parameters, sent as the canonical query string.
    pub query: QueryBuilder,
    /// Extra headers; these replace defaults of the same name.
    pub headers: HeaderMap,
    /// JSON request body.
    pub body: Option<serde_json::Value>,
}

impl RequestOptions {
    /// Options carrying only a query.
    #[must_use]
    pub fn with_query(query: QueryBuilder) -> Self {
        Self {
            query,
            ..Default::default()
        }
    }

    /// Options carrying only a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be encoded as JSON.
    pub fn with_body<B: Serialize + ?Sized>(body: &B) -> Result<Self> {
        Ok(Self {
            body: Some(serde_json::to_value(body)?),
            ..Default::default()
        })
    }
}

/// Low-level Workbrew API client.
///
/// Every path is resolved inside the configured workspace, so
/// `client.get("devices.json", ..)` hits
/// `{base}/workspaces/{workspace}/devices.json`.
///
/// This struct is cheaply cloneable; clones reference the same underlying
/// connection pool.
///
/// # Example
///
/// ```no_run
/// use brewapi::BrewClient;
///
/// # async fn example() -> brewapi::Result<()> {
/// // Create from environment variables
/// let client = BrewClient::from_env()?;
///
/// // Or configure manually
/// let client = BrewClient::new("your-api-key", "my-workspace", "https://console.workbrew.com")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct BrewClient {
    http: Client,
    workspace_url: Arc<Url>,
    token: String,
    api_version: String,
}

impl std::fmt::Debug for BrewClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrewClient")
            .field("workspace_url", &self.workspace_url.as_str())
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

impl BrewClient {
    /// Create a client from environment variables.
    ///
    /// Reads `WORKBREW_API_KEY` and `WORKBREW_WORKSPACE`, plus the optional
    /// `WORKBREW_API_URL` (defaults to `https://console.workbrew.com`) and
    /// `WORKBREW_API_VERSION` (defaults to `v0`).
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is not set.
    pub fn from_env() -> Result<Self> {
        let token = required_env("WORKBREW_API_KEY")?;
        let workspace = required_env("WORKBREW_WORKSPACE")?;
        let base_url =
            env::var("WORKBREW_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let client = Self::new(&token, &workspace, &base_url)?;
        Ok(match env::var("WORKBREW_API_VERSION") {
            Ok(version) if !version.is_empty() => client.with_api_version(version),
            _ => client,
        })
    }

    /// Create a new client for one workspace.
    ///
    /// # Arguments
    ///
    /// * `token` - Workbrew API key
    /// * `workspace` - Workspace name as it appears in console URLs
    /// * `base_url` - Console base URL (e.g., `https://console.workbrew.com`)
    ///
    /// # Errors
    ///
    /// Returns an error if the workspace is empty or the base URL is invalid.
    pub fn new(token: &str, workspace: &str, base_url: &str) -> Result<Self> {
        if workspace.is_empty() {
            return Err(BrewError::ConfigMissing("workspace name is empty".to_string()));
        }

        let base_url_str = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let workspace_url = Url::parse(&base_url_str)?
            .join(&format!("workspaces/{}/", urlencoding::encode(workspace)))?;

        Ok(Self {
            http: build_http(DEFAULT_TIMEOUT)?,
            workspace_url: Arc::new(workspace_url),
            token: token.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
        })
    }

    /// Use a different API version header value.
    #[must_use]
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Rebuild the HTTP client with a different request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http = build_http(timeout)?;
        Ok(self)
    }

    /// The workspace root every path is resolved against.
    pub fn workspace_url(&self) -> &Url {
        &self.workspace_url
    }

    /// The API version sent with each request.
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Resolve a workspace-relative path and attach the canonical query string.
    ///
    /// An inline query on `path` (`devices.json?page=2`) is merged with
    /// `query`; `query` wins on conflicting keys.
    ///
    /// # Errors
    ///
    /// Returns [`BrewError::InvalidPath`] if the path is an absolute URL,
    /// contains a `..` segment or a fragment, or otherwise resolves outside
    /// the workspace.
    pub fn endpoint(&self, path: &str, query: &QueryBuilder) -> Result<Url> {
        if Url::parse(path).is_ok() {
            return Err(BrewError::InvalidPath(path.to_string()));
        }

        let (route, inline) = match path.split_once('?') {
            Some((route, inline)) => (route, Some(inline)),
            None => (path, None),
        };
        if route.contains('#')
            || inline.is_some_and(|q| q.contains('#'))
            || route.split('/').any(is_parent_segment)
        {
            return Err(BrewError::InvalidPath(path.to_string()));
        }

        let mut url = self.workspace_url.join(route.trim_start_matches('/'))?;
        if url.origin() != self.workspace_url.origin()
            || !url.path().starts_with(self.workspace_url.path())
        {
            return Err(BrewError::InvalidPath(path.to_string()));
        }

        let mut params: QueryBuilder = inline
            .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();
        params.merge(query.build());

        if !params.is_empty() {
            url.set_query(Some(&params.build_string()));
        }
        Ok(url)
    }

    /// Make a GET request and decode a JSON body.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &QueryBuilder,
    ) -> Result<ApiResponse<T>> {
        self.request(Method::GET, path, RequestOptions::with_query(query.clone()))
            .await
    }

    /// Make a GET request for a CSV export and return the raw bytes.
    pub async fn get_csv(&self, path: &str, query: &QueryBuilder) -> Result<ApiResponse<Vec<u8>>> {
        let mut options = RequestOptions::with_query(query.clone());
        options
            .headers
            .insert(ACCEPT, HeaderValue::from_static(MIME_CSV));
        let meta = self.execute(Method::GET, path, options).await?;
        Ok(ApiResponse {
            data: meta.body.clone(),
            meta,
        })
    }

    /// Make a POST request with a JSON body.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<ApiResponse<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::POST, path, RequestOptions::with_body(body)?)
            .await
    }

    /// Make a PUT request with a JSON body.
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<ApiResponse<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::PUT, path, RequestOptions::with_body(body)?)
            .await
    }

    /// Make a PATCH request with a JSON body.
    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<ApiResponse<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::PATCH, path, RequestOptions::with_body(body)?)
            .await
    }

    /// Make a DELETE request. The body, if any, is left undecoded in the metadata.
    pub async fn delete(&self, path: &str) -> Result<ResponseMeta> {
        self.execute(Method::DELETE, path, RequestOptions::default())
            .await
    }

    /// Make a request with explicit options and decode a JSON body.
    ///
    /// An empty body decodes as JSON `null`, so `T = ()` or `Option<_>`
    /// works for endpoints that return nothing.
    ///
    /// # Errors
    ///
    /// Returns [`BrewError::Decode`] with the response metadata if the body
    /// does not match `T`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse<T>> {
        let meta = self.execute(method, path, options).await?;

        let body: &[u8] = if meta.body.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &meta.body
        };

        match serde_json::from_slice(body) {
            Ok(data) => Ok(ApiResponse { data, meta }),
            Err(source) => {
                tracing::warn!(status = %meta.status, error = %source, "failed to decode response body");
                Err(BrewError::Decode {
                    source,
                    response: Box::new(meta),
                })
            }
        }
    }

    /// Send a request and collect its metadata, mapping failures to errors.
    #[tracing::instrument(skip(self, options), fields(status = tracing::field::Empty))]
    async fn execute(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<ResponseMeta> {
        let url = self.endpoint(path, &options.query)?;

        let mut request = self
            .http
            .request(method, url)
            .bearer_auth(&self.token)
            .header(ACCEPT, MIME_JSON)
            .header(API_VERSION_HEADER, self.api_version.as_str());
        if !options.headers.is_empty() {
            request = request.headers(options.headers);
        }
        if let Some(body) = &options.body {
            request = request.json(body);
        }

        let started = Instant::now();
        let response = request.send().await.map_err(BrewError::HttpError)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(BrewError::HttpError)?.to_vec();

        let meta = ResponseMeta {
            status,
            headers,
            body,
            elapsed: started.elapsed(),
            received_at: Utc::now(),
        };
        tracing::Span::current().record("status", meta.status.as_u16());
        tracing::debug!(elapsed_ms = meta.elapsed.as_millis() as u64, "response received");

        Self::check_response(meta)
    }

    /// Check response status and convert errors.
    fn check_response(meta: ResponseMeta) -> Result<ResponseMeta> {
        let status = meta.status;

        if status.is_success() {
            return Ok(meta);
        }

        if status.as_u16() == 429 {
            let retry_after_secs = meta.retry_after_secs();
            tracing::warn!(?retry_after_secs, "rate limited");
            return Err(BrewError::RateLimited {
                retry_after_secs,
                response: Box::new(meta),
            });
        }

        let message = extract_error_message(&meta);
        tracing::warn!(status = status.as_u16(), %message, "API request failed");
        Err(BrewError::Api {
            message,
            status_code: status.as_u16(),
            response: Box::new(meta),
        })
    }
}

fn build_http(timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .brotli(true)
        .gzip(true)
        .deflate(true)
        .timeout(timeout)
        .build()
        .map_err(BrewError::HttpError)
}

/// `..` in any spelling the URL parser treats as a parent directory.
fn is_parent_segment(segment: &str) -> bool {
    matches!(
        segment.to_ascii_lowercase().as_str(),
        ".." | ".%2e" | "%2e." | "%2e%2e"
    ) || segment.split('\\').any(|part| part == "..")
}

fn required_env(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(BrewError::ConfigMissing(format!(
            "{name} environment variable not set"
        ))),
    }
}

/// Extract error message from a failed response.
fn extract_error_message(meta: &ResponseMeta) -> String {
    let body = meta.body_text();
    if body.trim().is_empty() {
        return format!("HTTP {}", meta.status);
    }

    if let Ok(json) = serde_json::from_str::<serde_json::Value>(&body) {
        if let Some(msg) = json.get("message").and_then(|m| m.as_str()) {
            return msg.to_string();
        }
        if let Some(err) = json.get("error").and_then(|m| m.as_str()) {
            return err.to_string();
        }
        if let Some(first) = json
            .get("errors")
            .and_then(|e| e.as_array())
            .and_then(|e| e.first())
            .and_then(|m| m.as_str())
        {
            return first.to_string();
        }
    }

    body.into_owned()
}
