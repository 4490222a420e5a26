//! HTTP plumbing between the provisioning flows and the controller.
//!
//! The flows only see [`ControllerTransport`]; failures come back as
//! [`TransportError`] categories decided from structured error data.

use async_trait::async_trait;
use log::{debug, trace};
use reqwest::Url;
use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

use crate::error_handling::types::TransportError;

/// Connect deadline for every controller request.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub bearer: Option<String>,
    pub json_body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            bearer: None,
            json_body: None,
        }
    }

    pub fn post_json(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            bearer: None,
            json_body: Some(body),
        }
    }

    pub fn with_bearer(mut self, token: &str) -> Self {
        self.bearer = Some(token.to_string());
        self
    }
}

// Bearer tokens and login bodies stay out of logs.
impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("bearer", &self.bearer.as_ref().map(|_| "<redacted>"))
            .field("json_body", &self.json_body.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Status and raw body of a completed exchange, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait ControllerTransport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// `reqwest` transport. Certificate verification is off: lab controllers
/// ship self-signed certificates.
pub struct HttpsTransport {
    client: reqwest::Client,
    connect_timeout: Duration,
}

impl HttpsTransport {
    /// `request_timeout` bounds a whole exchange; connecting is always
    /// bounded by [`CONNECT_TIMEOUT`].
    pub fn new(request_timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(request_timeout)
            .build()
            .map_err(|e| TransportError::Other(format!("unable to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            connect_timeout: CONNECT_TIMEOUT,
        })
    }

    /// Resolves the request host up front so a name failure is reported as
    /// such instead of surfacing as a generic connect error.
    async fn resolve(&self, url: &Url) -> Result<(), TransportError> {
        let host = url
            .host_str()
            .ok_or_else(|| TransportError::UnresolvedHost(url.to_string()))?
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_string();
        let port = url.port_or_known_default().unwrap_or(443);

        let lookup = tokio::time::timeout(
            self.connect_timeout,
            tokio::net::lookup_host((host.clone(), port)),
        )
        .await;
        match lookup {
            Err(_) => Err(TransportError::ConnectTimeout),
            Ok(Err(e)) => {
                debug!("Name resolution for {} failed: {}", host, e);
                Err(TransportError::UnresolvedHost(host))
            }
            Ok(Ok(mut addrs)) => {
                if addrs.next().is_none() {
                    return Err(TransportError::UnresolvedHost(host));
                }
                Ok(())
            }
        }
    }
}

#[async_trait]
impl ControllerTransport for HttpsTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = Url::parse(&request.url)
            .map_err(|e| TransportError::UnresolvedHost(format!("{} ({})", request.url, e)))?;
        self.resolve(&url).await?;

        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };
        builder = builder.header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.json_body {
            builder = builder.json(body);
        }

        trace!("{:?} {}", request.method, request.url);
        let response = builder.send().await.map_err(classify_reqwest_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify_reqwest_error)?;
        Ok(ApiResponse { status, body })
    }
}

/// Maps a `reqwest` failure onto a transport category using its error kind
/// flags and the `io::ErrorKind` found in its source chain.
pub fn classify_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        return TransportError::ConnectTimeout;
    }
    if err.is_connect() {
        return match io_error_kind(&err) {
            Some(kind) => classify_io_kind(kind, err.to_string()),
            None => TransportError::Unreachable(err.to_string()),
        };
    }
    TransportError::Other(err.to_string())
}

fn io_error_kind(err: &(dyn StdError + 'static)) -> Option<std::io::ErrorKind> {
    let mut source: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(current) = source {
        if let Some(io) = current.downcast_ref::<std::io::Error>() {
            return Some(io.kind());
        }
        source = current.source();
    }
    None
}

/// Connect-phase `io::ErrorKind` to transport category.
pub fn classify_io_kind(kind: std::io::ErrorKind, detail: String) -> TransportError {
    use std::io::ErrorKind;
    match kind {
        ErrorKind::TimedOut => TransportError::ConnectTimeout,
        ErrorKind::ConnectionRefused | ErrorKind::AddrNotAvailable => {
            TransportError::Unreachable(detail)
        }
        ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted => TransportError::Other(detail),
        _ => TransportError::Unreachable(detail),
    }
}
