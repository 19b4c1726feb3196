use std::sync::Arc;

use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::converter::{HttpMessageConverter, Payload, PayloadKind, default_converters};
use crate::error::{RestClientError, Result};
use crate::request_factory::{
    ClientHttpRequest, ClientHttpRequestFactory, ClientHttpResponse, SimpleClientHttpRequestFactory,
};

#[derive(Debug, Clone)]
pub struct ResponseEntity {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Option<Payload>,
}

/// HTTP client that delegates transport to a request factory and body
/// conversion to an ordered list of message converters.
#[derive(Debug, Clone)]
pub struct RestClient {
    request_factory: Arc<dyn ClientHttpRequestFactory>,
    message_converters: Vec<Arc<dyn HttpMessageConverter>>,
}

impl Default for RestClient {
    fn default() -> Self {
        Self {
            request_factory: Arc::new(SimpleClientHttpRequestFactory::new()),
            message_converters: default_converters(),
        }
    }
}

impl RestClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_factory(&self) -> &Arc<dyn ClientHttpRequestFactory> {
        &self.request_factory
    }

    pub fn set_request_factory(&mut self, request_factory: Arc<dyn ClientHttpRequestFactory>) {
        self.request_factory = request_factory;
    }

    pub fn message_converters(&self) -> &[Arc<dyn HttpMessageConverter>] {
        &self.message_converters
    }

    /// Replace the whole converter list
    pub fn set_message_converters(&mut self, message_converters: Vec<Arc<dyn HttpMessageConverter>>) {
        self.message_converters = message_converters;
    }

    pub async fn exchange(
        &self,
        method: Method,
        url: &str,
        body: Option<Payload>,
        headers: HeaderMap,
        response_kind: PayloadKind,
    ) -> Result<ResponseEntity> {
        let uri: Uri = url
            .parse()
            .map_err(|_| RestClientError::InvalidUrl(url.to_string()))?;
        let mut request = ClientHttpRequest::new(method, uri);
        request.headers = headers;
        self.write_accept(&mut request, response_kind);
        if let Some(payload) = body {
            self.write_body(&mut request, &payload)?;
        }

        log::debug!("{} {} via {}", request.method, url, self.request_factory.name());
        let response = self.request_factory.execute(request).await?;
        log::debug!("{} returned {}", url, response.status);

        let response = check_status(response)?;
        let body = self.read_body(&response, response_kind)?;
        Ok(ResponseEntity {
            status: response.status,
            headers: response.headers,
            body,
        })
    }

    pub async fn get_for_string(&self, url: &str) -> Result<String> {
        let entity = self
            .exchange(Method::GET, url, None, HeaderMap::new(), PayloadKind::Text)
            .await?;
        match entity.body {
            Some(Payload::Text(text)) => Ok(text),
            _ => Ok(String::new()),
        }
    }

    pub async fn get_for_bytes(&self, url: &str) -> Result<bytes::Bytes> {
        let entity = self
            .exchange(Method::GET, url, None, HeaderMap::new(), PayloadKind::Binary)
            .await?;
        match entity.body {
            Some(Payload::Binary(bytes)) => Ok(bytes),
            _ => Ok(bytes::Bytes::new()),
        }
    }

    pub async fn get_for_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let entity = self
            .exchange(Method::GET, url, None, HeaderMap::new(), PayloadKind::Json)
            .await?;
        json_body(entity)
    }

    pub async fn post_for_json<B: Serialize, T: DeserializeOwned>(&self, url: &str, body: &B) -> Result<T> {
        let payload = Payload::Json(serde_json::to_value(body)?);
        let entity = self
            .exchange(Method::POST, url, Some(payload), HeaderMap::new(), PayloadKind::Json)
            .await?;
        json_body(entity)
    }

    pub async fn put_json<B: Serialize>(&self, url: &str, body: &B) -> Result<StatusCode> {
        let payload = Payload::Json(serde_json::to_value(body)?);
        let entity = self
            .exchange(Method::PUT, url, Some(payload), HeaderMap::new(), PayloadKind::Binary)
            .await?;
        Ok(entity.status)
    }

    pub async fn delete(&self, url: &str) -> Result<StatusCode> {
        let entity = self
            .exchange(Method::DELETE, url, None, HeaderMap::new(), PayloadKind::Binary)
            .await?;
        Ok(entity.status)
    }

    fn write_accept(&self, request: &mut ClientHttpRequest, response_kind: PayloadKind) {
        if request.headers.contains_key(ACCEPT) {
            return;
        }
        let mut media_types: Vec<&'static str> = Vec::new();
        for converter in self
            .message_converters
            .iter()
            .filter(|c| c.can_read(response_kind, None))
        {
            for media_type in converter.supported_media_types() {
                if !media_types.contains(&media_type) {
                    media_types.push(media_type);
                }
            }
        }
        if media_types.is_empty() {
            return;
        }
        if let Ok(value) = HeaderValue::from_str(&media_types.join(", ")) {
            request.headers.insert(ACCEPT, value);
        }
    }

    fn write_body(&self, request: &mut ClientHttpRequest, payload: &Payload) -> Result<()> {
        let requested = request
            .headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let converter = self
            .message_converters
            .iter()
            .find(|c| c.can_write(payload.kind(), requested.as_deref()))
            .ok_or_else(|| RestClientError::NoConverter {
                action: "write",
                kind: payload.kind(),
                content_type: requested.clone(),
            })?;
        let (body, content_type) = converter.write(payload)?;
        if requested.is_none() {
            let value = HeaderValue::from_str(&content_type)
                .map_err(|e| RestClientError::Conversion(e.to_string()))?;
            request.headers.insert(CONTENT_TYPE, value);
        }
        request.body = body;
        Ok(())
    }

    fn read_body(&self, response: &ClientHttpResponse, kind: PayloadKind) -> Result<Option<Payload>> {
        if response.body.is_empty() {
            return Ok(None);
        }
        let content_type = response.content_type();
        let converter = self
            .message_converters
            .iter()
            .find(|c| c.can_read(kind, content_type))
            .ok_or_else(|| RestClientError::NoConverter {
                action: "read",
                kind,
                content_type: content_type.map(str::to_string),
            })?;
        converter
            .read(kind, response.body.clone(), content_type)
            .map(Some)
    }
}

fn check_status(response: ClientHttpResponse) -> Result<ClientHttpResponse> {
    if response.status.is_client_error() {
        return Err(RestClientError::HttpClientError {
            status: response.status,
            body: response.body,
        });
    }
    if response.status.is_server_error() {
        return Err(RestClientError::HttpServerError {
            status: response.status,
            body: response.body,
        });
    }
    Ok(response)
}

fn json_body<T: DeserializeOwned>(entity: ResponseEntity) -> Result<T> {
    let value = match entity.body {
        Some(Payload::Json(value)) => value,
        _ => serde_json::Value::Null,
    };
    Ok(serde_json::from_value(value)?)
}
