//! Client implementation for consuming the EasyPost v2 API. The client only knows about HTTP,
//! authentication and JSON. Resource specific behavior lives on the types in
//! [`resource`](crate::resource), which use this client as their transport.

mod error;

use std::time::Duration;

use base64::Engine;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::Client as HttpClient;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, instrument, trace};
use url::Url;

pub use error::ClientError;

/// A shorthand `Result` type that always uses `ClientError` as its error variant
pub type Result<T> = std::result::Result<T, ClientError>;

pub const DEFAULT_BASE_URL: &str = "https://api.easypost.com/v2/";
/// Environment variable holding the API key, read by [`ClientBuilder::from_env`]
pub const API_KEY_ENV: &str = "EASYPOST_API_KEY";
/// Environment variable overriding the base URL, read by [`ClientBuilder::from_env`]
pub const API_BASE_ENV: &str = "EASYPOST_API_BASE";
const JSON_MIME_TYPE: &str = "application/json";
const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// A client type for interacting with the API
#[derive(Clone)]
pub struct Client {
    client: HttpClient,
    base_url: Url,
    max_retries: u32,
    retry_backoff: Duration,
}

/// A builder for for setting up a `Client`. Created using `Client::builder`
pub struct ClientBuilder {
    api_key: Option<String>,
    base_url: String,
    timeout: Option<Duration>,
    max_retries: u32,
    retry_backoff: Duration,
    http2_prior_knowledge: bool,
    danger_accept_invalid_certs: bool,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: None,
            max_retries: 0,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            http2_prior_knowledge: false,
            danger_accept_invalid_certs: false,
        }
    }
}

impl ClientBuilder {
    /// Returns a builder configured from the environment. `EASYPOST_API_KEY` must be set.
    /// `EASYPOST_API_BASE` is optional and defaults to the production API
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| ClientError::InvalidConfig(format!("{} is not set", API_KEY_ENV)))?;
        let builder = ClientBuilder::default().api_key(api_key);
        Ok(match std::env::var(API_BASE_ENV) {
            Ok(base) if !base.is_empty() => builder.base_url(base),
            _ => builder,
        })
    }

    /// Sets the API key. It is sent as the user name of an HTTP basic auth header
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the base URL of the API, including the version segment (e.g.
    /// `https://api.easypost.com/v2/`). Defaults to [`DEFAULT_BASE_URL`]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets a timeout for each individual request attempt. No timeout is set by default
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The number of extra attempts made for a request that failed with a transient error (see
    /// [`ClientError::is_retryable`]). Defaults to 0
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// The base delay between retries. The nth retry waits n times this long. Defaults to 500ms
    pub fn retry_backoff(mut self, retry_backoff: Duration) -> Self {
        self.retry_backoff = retry_backoff;
        self
    }

    /// Controls whether the client assumes HTTP/2 or attempts to negotiate it. Defaults to false.
    pub fn http2_prior_knowledge(mut self, http2_prior_knowledge: bool) -> Self {
        self.http2_prior_knowledge = http2_prior_knowledge;
        self
    }

    /// Controls whether the client accepts invalid certificates. The default is to reject invalid
    /// certificates. It is sometimes necessary to set this option in dev-test situations where you
    /// may be working with self-signed certificates or the like. Defaults to false.
    pub fn danger_accept_invalid_certs(mut self, danger_accept_invalid_certs: bool) -> Self {
        self.danger_accept_invalid_certs = danger_accept_invalid_certs;
        self
    }

    /// Returns a new Client configured using the set options. Will return an error if no API key
    /// was given or the base URL is not valid
    pub fn build(self) -> Result<Client> {
        let api_key = match self.api_key {
            Some(k) if !k.is_empty() => k,
            _ => return Err(ClientError::InvalidConfig("An API key is required".into())),
        };
        let (base_parsed, mut headers) = base_url_and_headers(&self.base_url)?;

        let data = base64::engine::general_purpose::STANDARD.encode(format!("{}:", api_key));
        let mut header_val = HeaderValue::from_str(&format!("Basic {}", data))
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;
        header_val.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, header_val);

        let builder = HttpClient::builder()
            .and_if(self.http2_prior_knowledge, |b| b.http2_prior_knowledge())
            .and_if(self.danger_accept_invalid_certs, |b| {
                b.danger_accept_invalid_certs(true)
            })
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .default_headers(headers);
        let builder = match self.timeout {
            Some(t) => builder.timeout(t),
            None => builder,
        };
        let client = builder
            .build()
            .map_err(|e| ClientError::Other(e.to_string()))?;

        Ok(Client {
            client,
            base_url: base_parsed,
            max_retries: self.max_retries,
            retry_backoff: self.retry_backoff,
        })
    }
}

fn base_url_and_headers(base_url: &str) -> Result<(Url, HeaderMap)> {
    // Note that the trailing slash is important, otherwise the URL parser will treat is as a
    // "file" component of the URL. So we need to check that it is added before parsing
    let mut base = base_url.to_owned();
    if !base.ends_with('/') {
        info!("Provided base URL missing trailing slash, adding...");
        base.push('/');
    }
    let base_parsed = Url::parse(&base)?;
    let mut headers = header::HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static(JSON_MIME_TYPE));
    Ok((base_parsed, headers))
}

impl Client {
    /// Returns a new Client for the production API using the given API key and the default
    /// options
    pub fn new(api_key: &str) -> Result<Self> {
        ClientBuilder::default().api_key(api_key).build()
    }

    /// Returns a [`ClientBuilder`](ClientBuilder) configured with defaults
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// The normalized base URL every request path is joined onto
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Performs a raw request using the underlying HTTP client and returns the raw response. The
    /// path is just the path part of your URL. It will be joined with the configured base URL for
    /// the client. No status checking or retrying is done
    #[instrument(level = "trace", skip(self, body))]
    pub async fn raw(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<impl Into<reqwest::Body>>,
    ) -> anyhow::Result<reqwest::Response> {
        let req = self.client.request(method, self.base_url.join(path)?);
        let req = match body {
            Some(b) => req.body(b),
            None => req,
        };
        req.send().await.map_err(|e| e.into())
    }

    /// Sends a GET to the given path and decodes the JSON response
    #[instrument(level = "trace", skip(self))]
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let req = self.client.get(self.base_url.join(path)?);
        self.send_json(req, true).await
    }

    /// Same as `get`, but serializes the given value as the query string
    #[instrument(level = "trace", skip(self, query))]
    pub(crate) async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let req = self.client.get(self.base_url.join(path)?).query(query);
        self.send_json(req, true).await
    }

    #[instrument(level = "trace", skip(self, body))]
    pub(crate) async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let req = self.client.post(self.base_url.join(path)?);
        self.send_json(with_json_body(req, body)?, false).await
    }

    #[instrument(level = "trace", skip(self, body))]
    pub(crate) async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let req = self.client.put(self.base_url.join(path)?);
        self.send_json(with_json_body(req, body)?, true).await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        idempotent: bool,
    ) -> Result<T> {
        let resp = self.send(req, idempotent).await?;
        Ok(serde_json::from_slice(&resp.bytes().await?)?)
    }

    /// Sends the request, retrying transient failures up to the configured number of times.
    /// Requests that are not idempotent are only retried when the server cannot have acted on them
    async fn send(&self, req: RequestBuilder, idempotent: bool) -> Result<reqwest::Response> {
        let mut attempt: u32 = 0;
        loop {
            // Bodies are always in memory, so a clone only fails on programmer error
            let this_try = req.try_clone().ok_or_else(|| {
                ClientError::Other("Request body cannot be cloned for sending".into())
            })?;
            trace!(req = ?this_try, attempt);
            let res = match this_try.send().await {
                Ok(resp) => unwrap_status(resp).await,
                Err(e) => Err(e.into()),
            };
            match res {
                Err(e) if can_retry(&e, idempotent) && attempt < self.max_retries => {
                    attempt += 1;
                    debug!(attempt, error = %e, "Request failed with a transient error, will retry");
                    tokio::time::sleep(self.retry_backoff * attempt).await;
                }
                other => return other,
            }
        }
    }
}

fn can_retry(err: &ClientError, idempotent: bool) -> bool {
    match err {
        _ if idempotent => err.is_retryable(),
        // Rejected before processing or never delivered, so a resend cannot duplicate anything
        ClientError::RateLimited => true,
        ClientError::HttpClientError(e) => e.is_connect(),
        _ => false,
    }
}

fn with_json_body<B: Serialize + ?Sized>(req: RequestBuilder, body: &B) -> Result<RequestBuilder> {
    Ok(req
        .header(header::CONTENT_TYPE, JSON_MIME_TYPE)
        .body(serde_json::to_vec(body)?))
}

async fn unwrap_status(resp: reqwest::Response) -> Result<reqwest::Response> {
    match resp.status() {
        s if s.is_success() => Ok(resp),
        StatusCode::NOT_FOUND => Err(ClientError::ResourceNotFound),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ClientError::Unauthorized),
        StatusCode::TOO_MANY_REQUESTS => Err(ClientError::RateLimited),
        // You can't range match on u16 so we use a guard
        s if s.is_server_error() => Err(ClientError::ServerError(parse_error_from_body(resp).await)),
        s if s.is_client_error() => Err(ClientError::InvalidRequest {
            status_code: s,
            message: parse_error_from_body(resp).await,
        }),
        _ => Err(ClientError::Other(format!(
            "Unknown error: {}",
            parse_error_from_body(resp).await.unwrap_or_default()
        ))),
    }
}

async fn parse_error_from_body(resp: reqwest::Response) -> Option<String> {
    let bytes = match resp.bytes().await {
        Ok(b) => b,
        Err(_) => return None,
    };

    match serde_json::from_slice::<crate::ErrorResponse>(&bytes) {
        Ok(e) => Some(format!("{}: {}", e.error.code, e.error.message)),
        Err(_) => None,
    }
}

trait ConditionalBuilder {
    fn and_if(self, condition: bool, build_method: impl Fn(Self) -> Self) -> Self
    where
        Self: Sized,
    {
        if condition {
            build_method(self)
        } else {
            self
        }
    }
}

impl ConditionalBuilder for reqwest::ClientBuilder {}
