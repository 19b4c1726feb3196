//! Transports that execute a fully prepared request.
//!
//! `SimpleClientHttpRequestFactory` is the baseline transport every client
//! starts with. `ReqwestClientHttpRequestFactory` is the preferred transport
//! when the `reqwest` feature is compiled in.

use std::any::Any;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::header::{CONTENT_TYPE, HOST};
use http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use http_body_util::{BodyExt, Full};
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;

use crate::error::{RestClientError, Result};

#[derive(Debug, Clone)]
pub struct ClientHttpRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ClientHttpRequest {
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn body_as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }
}

#[derive(Debug, Clone)]
pub struct ClientHttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ClientHttpResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }
}

#[async_trait]
pub trait ClientHttpRequestFactory: Send + Sync {
    async fn execute(&self, request: ClientHttpRequest) -> Result<ClientHttpResponse>;

    /// Short transport name for logging and diagnostics
    fn name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;
}

impl std::fmt::Debug for dyn ClientHttpRequestFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ClientHttpRequestFactory({})", self.name())
    }
}

/// One HTTP/1.1 connection per request, plain `http` only.
#[derive(Debug, Clone, Default)]
pub struct SimpleClientHttpRequestFactory {
    connect_timeout: Option<Duration>,
    read_timeout: Option<Duration>,
}

impl SimpleClientHttpRequestFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeouts(connect_timeout: Option<Duration>, read_timeout: Option<Duration>) -> Self {
        Self {
            connect_timeout,
            read_timeout,
        }
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout
    }

    async fn connect(&self, authority: &str) -> Result<TcpStream> {
        let connect = TcpStream::connect(authority);
        match self.connect_timeout {
            Some(limit) => tokio::time::timeout(limit, connect)
                .await
                .map_err(|_| RestClientError::Timeout(limit))?
                .map_err(RestClientError::from),
            None => Ok(connect.await?),
        }
    }

    async fn send(&self, request: ClientHttpRequest) -> Result<ClientHttpResponse> {
        let scheme = request.uri.scheme_str().unwrap_or("http");
        if scheme != "http" {
            return Err(RestClientError::UnsupportedScheme {
                transport: self.name(),
                scheme: scheme.to_string(),
            });
        }
        let host = request
            .uri
            .host()
            .ok_or_else(|| RestClientError::InvalidUrl(request.uri.to_string()))?;
        let port = request.uri.port_u16().unwrap_or(80);
        let authority = format!("{}:{}", host, port);

        let stream = self.connect(&authority).await?;
        let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream)).await?;
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                log::debug!("Connection closed with error: {}", e);
            }
        });

        let path = request
            .uri
            .path_and_query()
            .map(|p| p.as_str())
            .unwrap_or("/");
        let mut outgoing = hyper::Request::builder()
            .method(request.method)
            .uri(path)
            .body(Full::new(request.body))?;
        *outgoing.headers_mut() = request.headers;
        if !outgoing.headers().contains_key(HOST) {
            let host_header = match request.uri.port_u16() {
                Some(port) => format!("{}:{}", host, port),
                None => host.to_string(),
            };
            let value = HeaderValue::from_str(&host_header)
                .map_err(|_| RestClientError::InvalidUrl(request.uri.to_string()))?;
            outgoing.headers_mut().insert(HOST, value);
        }

        let response = sender.send_request(outgoing).await?;
        let (parts, body) = response.into_parts();
        let body = body.collect().await?.to_bytes();
        Ok(ClientHttpResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }
}

#[async_trait]
impl ClientHttpRequestFactory for SimpleClientHttpRequestFactory {
    async fn execute(&self, request: ClientHttpRequest) -> Result<ClientHttpResponse> {
        match self.read_timeout {
            Some(limit) => tokio::time::timeout(limit, self.send(request))
                .await
                .map_err(|_| RestClientError::Timeout(limit))?,
            None => self.send(request).await,
        }
    }

    fn name(&self) -> &'static str {
        "simple"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(feature = "reqwest")]
#[derive(Debug, Clone)]
pub struct ReqwestClientHttpRequestFactory {
    client: reqwest::Client,
}

#[cfg(feature = "reqwest")]
impl ReqwestClientHttpRequestFactory {
    pub fn new() -> Result<Self> {
        Self::with_timeouts(None, None)
    }

    pub fn with_timeouts(connect_timeout: Option<Duration>, read_timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = read_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Wrap an already configured reqwest client
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[cfg(feature = "reqwest")]
#[async_trait]
impl ClientHttpRequestFactory for ReqwestClientHttpRequestFactory {
    async fn execute(&self, request: ClientHttpRequest) -> Result<ClientHttpResponse> {
        let response = self
            .client
            .request(request.method, request.uri.to_string())
            .headers(request.headers)
            .body(request.body)
            .send()
            .await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        Ok(ClientHttpResponse {
            status,
            headers,
            body,
        })
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
