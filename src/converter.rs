use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;

use bytes::Bytes;

use crate::error::{RestClientError, Result};

pub const APPLICATION_OCTET_STREAM: &str = "application/octet-stream";
pub const APPLICATION_JSON: &str = "application/json";
pub const TEXT_PLAIN_UTF8: &str = "text/plain;charset=utf-8";
pub const ALL: &str = "*/*";

/// Request or response body in converted form
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    Binary(Bytes),
    Json(serde_json::Value),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    Text,
    Binary,
    Json,
}

impl Payload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            Payload::Text(_) => PayloadKind::Text,
            Payload::Binary(_) => PayloadKind::Binary,
            Payload::Json(_) => PayloadKind::Json,
        }
    }
}

/// Returns true if `media_type` is covered by `pattern`.
///
/// Parameters are ignored, `*/*` and `type/*` act as wildcards and
/// `application/*+json` matches any json suffixed subtype.
pub fn media_type_matches(pattern: &str, media_type: &str) -> bool {
    let pattern = essence(pattern);
    let media_type = essence(media_type);
    if pattern == ALL || media_type == ALL {
        return true;
    }
    let (p_type, p_sub) = pattern.split_once('/').unwrap_or((pattern.as_str(), "*"));
    let (m_type, m_sub) = media_type.split_once('/').unwrap_or((media_type.as_str(), "*"));
    if p_type != m_type {
        return false;
    }
    if p_sub == "*" || m_sub == "*" || p_sub == m_sub {
        return true;
    }
    match p_sub.strip_prefix("*+") {
        Some(suffix) => m_sub.ends_with(&format!("+{}", suffix)),
        None => false,
    }
}

fn essence(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Serializes request bodies and deserializes response bodies.
pub trait HttpMessageConverter: Send + Sync + Debug {
    fn supported_media_types(&self) -> Vec<&'static str>;

    fn can_read(&self, kind: PayloadKind, content_type: Option<&str>) -> bool;

    fn can_write(&self, kind: PayloadKind, content_type: Option<&str>) -> bool;

    fn read(&self, kind: PayloadKind, body: Bytes, content_type: Option<&str>) -> Result<Payload>;

    /// Encode the payload, returning the body and the content type to send
    fn write(&self, payload: &Payload) -> Result<(Bytes, String)>;

    fn as_any(&self) -> &dyn Any;

    fn supports(&self, content_type: Option<&str>) -> bool {
        match content_type {
            None => true,
            Some(ct) => self
                .supported_media_types()
                .iter()
                .any(|supported| media_type_matches(supported, ct)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ByteArrayHttpMessageConverter;

impl HttpMessageConverter for ByteArrayHttpMessageConverter {
    fn supported_media_types(&self) -> Vec<&'static str> {
        vec![APPLICATION_OCTET_STREAM, ALL]
    }

    fn can_read(&self, kind: PayloadKind, _content_type: Option<&str>) -> bool {
        kind == PayloadKind::Binary
    }

    fn can_write(&self, kind: PayloadKind, content_type: Option<&str>) -> bool {
        kind == PayloadKind::Binary && self.supports(content_type)
    }

    fn read(&self, _kind: PayloadKind, body: Bytes, _content_type: Option<&str>) -> Result<Payload> {
        Ok(Payload::Binary(body))
    }

    fn write(&self, payload: &Payload) -> Result<(Bytes, String)> {
        match payload {
            Payload::Binary(bytes) => Ok((bytes.clone(), APPLICATION_OCTET_STREAM.to_string())),
            other => Err(unexpected_payload("ByteArrayHttpMessageConverter", other)),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct StringHttpMessageConverter;

impl HttpMessageConverter for StringHttpMessageConverter {
    fn supported_media_types(&self) -> Vec<&'static str> {
        vec![TEXT_PLAIN_UTF8, ALL]
    }

    fn can_read(&self, kind: PayloadKind, _content_type: Option<&str>) -> bool {
        kind == PayloadKind::Text
    }

    fn can_write(&self, kind: PayloadKind, content_type: Option<&str>) -> bool {
        kind == PayloadKind::Text && self.supports(content_type)
    }

    fn read(&self, _kind: PayloadKind, body: Bytes, _content_type: Option<&str>) -> Result<Payload> {
        String::from_utf8(body.to_vec())
            .map(Payload::Text)
            .map_err(|e| RestClientError::Conversion(format!("Body is not valid UTF-8: {}", e)))
    }

    fn write(&self, payload: &Payload) -> Result<(Bytes, String)> {
        match payload {
            Payload::Text(text) => Ok((Bytes::from(text.clone()), TEXT_PLAIN_UTF8.to_string())),
            other => Err(unexpected_payload("StringHttpMessageConverter", other)),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct JsonHttpMessageConverter;

impl HttpMessageConverter for JsonHttpMessageConverter {
    fn supported_media_types(&self) -> Vec<&'static str> {
        vec![APPLICATION_JSON, "application/*+json"]
    }

    fn can_read(&self, kind: PayloadKind, content_type: Option<&str>) -> bool {
        kind == PayloadKind::Json && self.supports(content_type)
    }

    fn can_write(&self, kind: PayloadKind, content_type: Option<&str>) -> bool {
        kind == PayloadKind::Json && self.supports(content_type)
    }

    fn read(&self, _kind: PayloadKind, body: Bytes, _content_type: Option<&str>) -> Result<Payload> {
        Ok(Payload::Json(serde_json::from_slice(&body)?))
    }

    fn write(&self, payload: &Payload) -> Result<(Bytes, String)> {
        match payload {
            Payload::Json(value) => Ok((
                Bytes::from(serde_json::to_vec(value)?),
                APPLICATION_JSON.to_string(),
            )),
            other => Err(unexpected_payload("JsonHttpMessageConverter", other)),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn unexpected_payload(converter: &str, payload: &Payload) -> RestClientError {
    RestClientError::Conversion(format!(
        "{} cannot write {:?} payload",
        converter,
        payload.kind()
    ))
}

/// Converters a freshly created client starts with
pub fn default_converters() -> Vec<Arc<dyn HttpMessageConverter>> {
    vec![
        Arc::new(ByteArrayHttpMessageConverter),
        Arc::new(StringHttpMessageConverter),
        Arc::new(JsonHttpMessageConverter),
    ]
}

/// Aggregates application supplied converters with the defaults.
///
/// The exported order is the additional converters as given, followed by the
/// defaults unless those were disabled.
#[derive(Debug, Clone)]
pub struct HttpMessageConverters {
    converters: Vec<Arc<dyn HttpMessageConverter>>,
}

impl HttpMessageConverters {
    pub fn new<I>(additional: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn HttpMessageConverter>>,
    {
        Self::with_defaults(true, additional)
    }

    pub fn with_defaults<I>(add_defaults: bool, additional: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn HttpMessageConverter>>,
    {
        let mut converters: Vec<_> = additional.into_iter().collect();
        if add_defaults {
            converters.extend(default_converters());
        }
        Self { converters }
    }

    pub fn converters(&self) -> &[Arc<dyn HttpMessageConverter>] {
        &self.converters
    }
}

impl Default for HttpMessageConverters {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
