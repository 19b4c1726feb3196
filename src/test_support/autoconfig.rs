#[cfg(feature = "mock")]
use std::sync::Arc;

use crate::builder::RestClientBuilder;
use crate::client::RestClient;
#[cfg(feature = "mock")]
use crate::test_support::{MockRestServiceServer, RequestExpectationManager};

/// Client and mock server wiring for tests.
pub struct RestClientAutoConfiguration;

impl RestClientAutoConfiguration {
    /// Client built from the available builder, or a plain default client
    pub fn rest_client(builder: Option<&RestClientBuilder>) -> RestClient {
        match builder {
            Some(builder) => builder.build(),
            None => RestClient::new(),
        }
    }

    /// Bind a mock server to `client`, ordered unless a manager is supplied
    #[cfg(feature = "mock")]
    pub fn mock_rest_service_server(
        client: &mut RestClient,
        manager: Option<Arc<dyn RequestExpectationManager>>,
    ) -> Arc<MockRestServiceServer> {
        let builder = MockRestServiceServer::bind_to(client);
        let server = match manager {
            Some(manager) => builder.build_with(manager),
            None => builder.build(),
        };
        Arc::new(server)
    }
}
