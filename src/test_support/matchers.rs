//! Request matchers and response creators for mock expectations.

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderName, HeaderValue, Method, StatusCode};

use crate::converter::{APPLICATION_JSON, TEXT_PLAIN_UTF8};
use crate::error::{RestClientError, Result};
use crate::request_factory::{ClientHttpRequest, ClientHttpResponse};
use crate::test_support::expectation::{RequestMatcher, ResponseCreator};

/// Match the full request URI
pub fn request_to(uri: &str) -> impl RequestMatcher + use<> {
    let expected = uri.to_string();
    move |request: &ClientHttpRequest| {
        let actual = request.uri.to_string();
        if actual == expected {
            Ok(())
        } else {
            Err(format!("Request URI expected:<{}> but was:<{}>", expected, actual))
        }
    }
}

pub fn method(expected: Method) -> impl RequestMatcher {
    move |request: &ClientHttpRequest| {
        if request.method == expected {
            Ok(())
        } else {
            Err(format!(
                "Unexpected HttpMethod expected:<{}> but was:<{}>",
                expected, request.method
            ))
        }
    }
}

pub fn header(name: &'static str, value: &str) -> impl RequestMatcher + use<> {
    let expected = value.to_string();
    move |request: &ClientHttpRequest| match request.headers.get(name) {
        Some(actual) if actual.as_bytes() == expected.as_bytes() => Ok(()),
        Some(actual) => Err(format!(
            "Request header [{}] expected:<{}> but was:<{:?}>",
            name, expected, actual
        )),
        None => Err(format!("Expected header <{}>", name)),
    }
}

pub fn content_string(expected: &str) -> impl RequestMatcher + use<> {
    let expected = expected.to_string();
    move |request: &ClientHttpRequest| match request.body_as_str() {
        Some(actual) if actual == expected => Ok(()),
        actual => Err(format!(
            "Request content expected:<{}> but was:<{}>",
            expected,
            actual.unwrap_or("<binary>")
        )),
    }
}

/// Match a JSON body structurally, ignoring formatting
pub fn json_content(expected: serde_json::Value) -> impl RequestMatcher {
    move |request: &ClientHttpRequest| -> std::result::Result<(), String> {
        let actual: serde_json::Value = serde_json::from_slice(&request.body)
            .map_err(|e| format!("Request content is not JSON: {}", e))?;
        if actual == expected {
            Ok(())
        } else {
            Err(format!(
                "JSON content expected:<{}> but was:<{}>",
                expected, actual
            ))
        }
    }
}

/// Response scripted for a mock expectation
#[derive(Debug, Clone)]
pub struct DefaultResponseCreator {
    status: StatusCode,
    body: Bytes,
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl DefaultResponseCreator {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            body: Bytes::new(),
            headers: Vec::new(),
        }
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn content_type(self, content_type: &'static str) -> Self {
        self.header(CONTENT_TYPE, HeaderValue::from_static(content_type))
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.push((name, value));
        self
    }
}

impl ResponseCreator for DefaultResponseCreator {
    fn create_response(&self, _request: &ClientHttpRequest) -> Result<ClientHttpResponse> {
        let mut response = ClientHttpResponse::new(self.status, self.body.clone());
        for (name, value) in &self.headers {
            response.headers.insert(name.clone(), value.clone());
        }
        Ok(response)
    }
}

pub fn with_success(body: impl Into<Bytes>, content_type: &'static str) -> DefaultResponseCreator {
    DefaultResponseCreator::new(StatusCode::OK)
        .body(body)
        .content_type(content_type)
}

pub fn with_text(body: impl Into<String>) -> DefaultResponseCreator {
    let body: String = body.into();
    with_success(body, TEXT_PLAIN_UTF8)
}

pub fn with_json(value: serde_json::Value) -> DefaultResponseCreator {
    with_success(value.to_string(), APPLICATION_JSON)
}

pub fn with_status(status: StatusCode) -> DefaultResponseCreator {
    DefaultResponseCreator::new(status)
}

pub fn with_bad_request() -> DefaultResponseCreator {
    with_status(StatusCode::BAD_REQUEST)
}

pub fn with_server_error() -> DefaultResponseCreator {
    with_status(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Fail the request as if the transport broke
pub fn with_exception(message: &str) -> impl ResponseCreator + use<> {
    let message = message.to_string();
    move |_: &ClientHttpRequest| -> Result<ClientHttpResponse> {
        Err(RestClientError::Io(std::io::Error::other(message.clone())))
    }
}

#[cfg(test)]
mod tests {
    use http::Uri;

    use super::*;

    fn request() -> ClientHttpRequest {
        let mut request = ClientHttpRequest::new(Method::POST, Uri::from_static("http://example.com/users?page=2"));
        request
            .headers
            .insert("x-trace", HeaderValue::from_static("abc"));
        request.body = Bytes::from_static(br#"{ "name": "ada" }"#);
        request
    }

    #[test]
    fn test_request_to_compares_full_uri() {
        assert!(request_to("http://example.com/users?page=2").matches(&request()).is_ok());
        assert!(request_to("http://example.com/users").matches(&request()).is_err());
    }

    #[test]
    fn test_method_and_header() {
        assert!(method(Method::POST).matches(&request()).is_ok());
        assert!(method(Method::GET).matches(&request()).is_err());
        assert!(header("x-trace", "abc").matches(&request()).is_ok());
        assert!(header("x-trace", "xyz").matches(&request()).is_err());
        assert!(header("x-missing", "abc").matches(&request()).is_err());
    }

    #[test]
    fn test_content_matchers() {
        assert!(json_content(serde_json::json!({"name": "ada"}))
            .matches(&request())
            .is_ok());
        assert!(content_string("nope").matches(&request()).is_err());
    }

    #[test]
    fn test_with_json_sets_content_type() {
        let response = with_json(serde_json::json!({"ok": true}))
            .create_response(&request())
            .unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.content_type(), Some(APPLICATION_JSON));
        assert_eq!(&response.body[..], br#"{"ok":true}"#);
    }

    #[test]
    fn test_with_exception() {
        let result = with_exception("boom").create_response(&request());
        assert!(matches!(result, Err(RestClientError::Io(_))));
    }
}
