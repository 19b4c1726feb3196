use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;

use crate::client::RestClient;
use crate::error::Result;
use crate::request_factory::{ClientHttpRequest, ClientHttpRequestFactory, ClientHttpResponse};
use crate::test_support::expectation::{
    ExpectedCount, RequestExpectation, RequestExpectationManager, RequestMatcher, ResponseCreator,
    SimpleRequestExpectationManager, UnorderedRequestExpectationManager,
};
use crate::test_support::listener::MockStandIn;

/// Request factory that answers from recorded expectations instead of the network
pub struct MockClientHttpRequestFactory {
    manager: Arc<dyn RequestExpectationManager>,
}

#[async_trait]
impl ClientHttpRequestFactory for MockClientHttpRequestFactory {
    async fn execute(&self, request: ClientHttpRequest) -> Result<ClientHttpResponse> {
        self.manager.validate_request(&request)
    }

    fn name(&self) -> &'static str {
        "mock"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Server-side stand-in for tests of code that uses a [`RestClient`].
///
/// Binding replaces the client's request factory, so every request the client
/// makes is checked against the declared expectations and answered with the
/// scripted response.
///
/// ```ignore
/// let mut client = RestClient::new();
/// let server = MockRestServiceServer::bind_to(&mut client).build();
/// server
///     .expect(request_to("http://localhost/greeting"))
///     .and_respond(with_text("hello"));
/// assert_eq!(client.get_for_string("http://localhost/greeting").await?, "hello");
/// server.verify()?;
/// ```
pub struct MockRestServiceServer {
    manager: Arc<dyn RequestExpectationManager>,
}

impl MockRestServiceServer {
    pub fn bind_to(client: &mut RestClient) -> MockRestServiceServerBuilder<'_> {
        MockRestServiceServerBuilder {
            client,
            ignore_expect_order: false,
        }
    }

    /// Bind with the default ordered expectation manager
    pub fn create_server(client: &mut RestClient) -> Self {
        Self::bind_to(client).build()
    }

    pub fn expect(&self, matcher: impl RequestMatcher + 'static) -> ResponseActions {
        self.expect_times(ExpectedCount::once(), matcher)
    }

    pub fn expect_times(
        &self,
        count: ExpectedCount,
        matcher: impl RequestMatcher + 'static,
    ) -> ResponseActions {
        ResponseActions {
            expectation: self.manager.expect_request(count, Box::new(matcher)),
        }
    }

    pub fn verify(&self) -> Result<()> {
        self.manager.verify()
    }

    pub fn reset(&self) {
        self.manager.reset();
    }
}

impl MockStandIn for MockRestServiceServer {
    fn reset(&self) {
        MockRestServiceServer::reset(self);
    }
}

pub struct MockRestServiceServerBuilder<'a> {
    client: &'a mut RestClient,
    ignore_expect_order: bool,
}

impl MockRestServiceServerBuilder<'_> {
    /// Accept requests in any order rather than declaration order
    pub fn ignore_expect_order(mut self, ignore: bool) -> Self {
        self.ignore_expect_order = ignore;
        self
    }

    pub fn build(self) -> MockRestServiceServer {
        let manager: Arc<dyn RequestExpectationManager> = if self.ignore_expect_order {
            Arc::new(UnorderedRequestExpectationManager::new())
        } else {
            Arc::new(SimpleRequestExpectationManager::new())
        };
        self.build_with(manager)
    }

    pub fn build_with(self, manager: Arc<dyn RequestExpectationManager>) -> MockRestServiceServer {
        self.client
            .set_request_factory(Arc::new(MockClientHttpRequestFactory {
                manager: manager.clone(),
            }));
        MockRestServiceServer { manager }
    }
}

pub struct ResponseActions {
    expectation: Arc<RequestExpectation>,
}

impl ResponseActions {
    pub fn and_expect(self, matcher: impl RequestMatcher + 'static) -> Self {
        self.expectation.add_matcher(Box::new(matcher));
        self
    }

    pub fn and_respond(self, creator: impl ResponseCreator + 'static) {
        self.expectation.set_response_creator(Box::new(creator));
    }
}
