#![cfg(feature = "mock")]

use std::sync::Arc;

use http::Method;
use rest_autoconfig::test_support::matchers::{
    json_content, method, request_to, with_json, with_text,
};
use rest_autoconfig::test_support::{
    ExpectedCount, MockStandIn, RestClientAutoConfiguration, RestClientTestExecutionListener,
    TestContext, TestExecutionListener,
};
use rest_autoconfig::{RestClientBuilder, RestClientError};
use serde_json::json;

#[tokio::test]
async fn test_listener_resets_mock_server_between_tests() {
    let builder = RestClientBuilder::new();
    let mut client = RestClientAutoConfiguration::rest_client(Some(&builder));
    let server = RestClientAutoConfiguration::mock_rest_service_server(&mut client, None);

    let context = TestContext::new();
    context.register("mockRestServiceServer", server.clone() as Arc<dyn MockStandIn>);
    let listener = RestClientTestExecutionListener::detect();
    assert!(listener.is_enabled());

    // first test method leaves an unmet expectation behind
    listener.before_test_method(&context).unwrap();
    server
        .expect_times(ExpectedCount::times(2), request_to("http://localhost/engines"))
        .and_respond(with_text("[]"));
    client.get_for_string("http://localhost/engines").await.unwrap();
    assert!(server.verify().is_err());
    listener.after_test_method(&context).unwrap();

    // second test method starts clean
    listener.before_test_method(&context).unwrap();
    server.verify().unwrap();
    server
        .expect(request_to("http://localhost/generate"))
        .and_expect(method(Method::POST))
        .and_expect(json_content(json!({"text": "hi"})))
        .and_respond(with_json(json!({"text": "hello"})));
    let reply: serde_json::Value = client
        .post_for_json("http://localhost/generate", &json!({"text": "hi"}))
        .await
        .unwrap();
    assert_eq!(reply["text"], "hello");
    server.verify().unwrap();
    listener.after_test_method(&context).unwrap();
}

#[tokio::test]
async fn test_stale_expectation_is_gone_after_reset() {
    let mut client = RestClientAutoConfiguration::rest_client(None);
    let server = RestClientAutoConfiguration::mock_rest_service_server(&mut client, None);
    let context = TestContext::new();
    context.register("server", server.clone() as Arc<dyn MockStandIn>);

    server
        .expect(request_to("http://localhost/old"))
        .and_respond(with_text("old"));
    RestClientTestExecutionListener::with_mock_support(true)
        .after_test_method(&context)
        .unwrap();

    let result = client.get_for_string("http://localhost/old").await;
    assert!(matches!(result, Err(RestClientError::Assertion(_))));
}

#[tokio::test]
async fn test_disabled_listener_keeps_state() {
    let mut client = RestClientAutoConfiguration::rest_client(None);
    let server = RestClientAutoConfiguration::mock_rest_service_server(&mut client, None);
    let context = TestContext::new();
    context.register("server", server.clone() as Arc<dyn MockStandIn>);

    server
        .expect(request_to("http://localhost/kept"))
        .and_respond(with_text("kept"));
    RestClientTestExecutionListener::with_mock_support(false)
        .after_test_method(&context)
        .unwrap();

    assert_eq!(
        client.get_for_string("http://localhost/kept").await.unwrap(),
        "kept"
    );
    server.verify().unwrap();
}
