pub mod autoconfig;
pub mod builder;
pub mod client;
pub mod config;
pub mod converter;
pub mod error;
pub mod logging;
pub mod request_factory;
pub mod test_support;

pub use autoconfig::{RequestFactoryProvider, WebClientAutoConfiguration};
pub use builder::RestClientBuilder;
pub use client::{ResponseEntity, RestClient};
pub use config::{RestClientProperties, TransportPreference};
pub use converter::{HttpMessageConverter, HttpMessageConverters, Payload, PayloadKind};
pub use error::{RestClientError, Result};
pub use request_factory::{
    ClientHttpRequest, ClientHttpRequestFactory, ClientHttpResponse, SimpleClientHttpRequestFactory,
};
#[cfg(feature = "reqwest")]
pub use request_factory::ReqwestClientHttpRequestFactory;
