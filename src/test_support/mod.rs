//! Test support: a mock server that stands in for real endpoints and the
//! listener that resets such stand-ins between test methods.

pub mod autoconfig;
#[cfg(feature = "mock")]
pub mod expectation;
pub mod listener;
#[cfg(feature = "mock")]
pub mod matchers;
#[cfg(feature = "mock")]
pub mod mock_server;

pub use autoconfig::RestClientAutoConfiguration;
#[cfg(feature = "mock")]
pub use expectation::{
    ExpectedCount, RequestExpectationManager, RequestMatcher, ResponseCreator,
    SimpleRequestExpectationManager, UnorderedRequestExpectationManager,
};
pub use listener::{MockStandIn, RestClientTestExecutionListener, TestContext, TestExecutionListener};
#[cfg(feature = "mock")]
pub use mock_server::{MockRestServiceServer, ResponseActions};
