//! Assembly of a preconfigured [`RestClientBuilder`].
//!
//! Transport selection is a prioritized provider list evaluated once: the
//! first provider reporting itself available supplies the request factory,
//! and the baseline transport is used when none does.

use std::sync::Arc;

use crate::builder::RestClientBuilder;
use crate::config::{RestClientProperties, TransportPreference};
use crate::converter::HttpMessageConverters;
use crate::error::Result;
use crate::request_factory::{ClientHttpRequestFactory, SimpleClientHttpRequestFactory};

pub trait RequestFactoryProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn is_available(&self, props: &RestClientProperties) -> bool;

    fn create(&self, props: &RestClientProperties) -> Result<Arc<dyn ClientHttpRequestFactory>>;
}

/// Preferred transport, backed by reqwest
#[cfg(feature = "reqwest")]
#[derive(Debug, Default)]
pub struct ReqwestRequestFactoryProvider;

#[cfg(feature = "reqwest")]
impl RequestFactoryProvider for ReqwestRequestFactoryProvider {
    fn name(&self) -> &'static str {
        "reqwest"
    }

    fn is_available(&self, props: &RestClientProperties) -> bool {
        props.transport != TransportPreference::Simple
    }

    fn create(&self, props: &RestClientProperties) -> Result<Arc<dyn ClientHttpRequestFactory>> {
        let factory = crate::request_factory::ReqwestClientHttpRequestFactory::with_timeouts(
            props.connect_timeout(),
            props.read_timeout(),
        )?;
        Ok(Arc::new(factory))
    }
}

/// Baseline transport, always available
#[derive(Debug, Default)]
pub struct SimpleRequestFactoryProvider;

impl RequestFactoryProvider for SimpleRequestFactoryProvider {
    fn name(&self) -> &'static str {
        "simple"
    }

    fn is_available(&self, _props: &RestClientProperties) -> bool {
        true
    }

    fn create(&self, props: &RestClientProperties) -> Result<Arc<dyn ClientHttpRequestFactory>> {
        Ok(Arc::new(baseline_factory(props)))
    }
}

fn baseline_factory(props: &RestClientProperties) -> SimpleClientHttpRequestFactory {
    SimpleClientHttpRequestFactory::with_timeouts(props.connect_timeout(), props.read_timeout())
}

pub fn default_providers() -> Vec<Box<dyn RequestFactoryProvider>> {
    let mut providers: Vec<Box<dyn RequestFactoryProvider>> = Vec::new();
    #[cfg(feature = "reqwest")]
    providers.push(Box::new(ReqwestRequestFactoryProvider));
    providers.push(Box::new(SimpleRequestFactoryProvider));
    providers
}

pub fn select_request_factory(
    providers: &[Box<dyn RequestFactoryProvider>],
    props: &RestClientProperties,
) -> Result<Arc<dyn ClientHttpRequestFactory>> {
    if props.transport == TransportPreference::Reqwest
        && !providers.iter().any(|p| p.name() == "reqwest")
    {
        log::warn!("reqwest transport requested but not compiled in, falling back");
    }
    match providers.iter().find(|p| p.is_available(props)) {
        Some(provider) => {
            log::info!("Using {} request factory", provider.name());
            provider.create(props)
        }
        None => {
            log::warn!("No request factory provider available, using the simple transport");
            Ok(Arc::new(baseline_factory(props)))
        }
    }
}

pub struct WebClientAutoConfiguration {
    properties: RestClientProperties,
    providers: Vec<Box<dyn RequestFactoryProvider>>,
}

impl WebClientAutoConfiguration {
    pub fn new(properties: RestClientProperties) -> Self {
        Self::with_providers(properties, default_providers())
    }

    pub fn with_providers(
        properties: RestClientProperties,
        providers: Vec<Box<dyn RequestFactoryProvider>>,
    ) -> Self {
        Self {
            properties,
            providers,
        }
    }

    pub fn properties(&self) -> &RestClientProperties {
        &self.properties
    }

    /// Builder handed to the application.
    ///
    /// A builder supplied by the application is returned as is. Otherwise a new
    /// builder gets the aggregator's converters, when one is supplied, and the
    /// selected request factory.
    pub fn rest_client_builder(
        &self,
        user_builder: Option<RestClientBuilder>,
        converters: Option<&HttpMessageConverters>,
    ) -> Result<RestClientBuilder> {
        if let Some(builder) = user_builder {
            log::debug!("Using application supplied RestClientBuilder");
            return Ok(builder);
        }
        let mut builder = RestClientBuilder::new();
        if let Some(converters) = converters {
            builder = builder.message_converters_from(converters);
        }
        let factory = select_request_factory(&self.providers, &self.properties)?;
        Ok(builder.request_factory(factory))
    }
}

impl Default for WebClientAutoConfiguration {
    fn default() -> Self {
        Self::new(RestClientProperties::default())
    }
}
