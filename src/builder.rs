use std::sync::Arc;

use crate::client::RestClient;
use crate::converter::{HttpMessageConverter, HttpMessageConverters};
use crate::error::{RestClientError, Result};
use crate::request_factory::ClientHttpRequestFactory;

/// Builder used to create a [`RestClient`] with sensible defaults.
///
/// Every setting is optional. A setting that was never given leaves the
/// client's own value untouched, and giving a setting again replaces the
/// previous value entirely.
#[derive(Debug, Clone, Default)]
pub struct RestClientBuilder {
    request_factory: Option<Arc<dyn ClientHttpRequestFactory>>,
    message_converters: Option<Vec<Arc<dyn HttpMessageConverter>>>,
}

impl RestClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the given request factory
    pub fn request_factory(mut self, request_factory: Arc<dyn ClientHttpRequestFactory>) -> Self {
        self.request_factory = Some(request_factory);
        self
    }

    /// Same as [`request_factory`](Self::request_factory) for an optional collaborator
    pub fn try_request_factory(
        self,
        request_factory: Option<Arc<dyn ClientHttpRequestFactory>>,
    ) -> Result<Self> {
        match request_factory {
            Some(factory) => Ok(self.request_factory(factory)),
            None => Err(RestClientError::invalid_argument(
                "RequestFactory must not be null",
            )),
        }
    }

    /// Use the converters exported by the given aggregator
    pub fn message_converters_from(self, converters: &HttpMessageConverters) -> Self {
        self.message_converters(converters.converters().iter().cloned())
    }

    /// Use exactly the given converters, in order
    pub fn message_converters<I>(mut self, converters: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn HttpMessageConverter>>,
    {
        self.message_converters = Some(converters.into_iter().collect());
        self
    }

    pub fn has_request_factory(&self) -> bool {
        self.request_factory.is_some()
    }

    pub fn has_message_converters(&self) -> bool {
        self.message_converters.is_some()
    }

    /// Build a new client with the state of this builder
    pub fn build(&self) -> RestClient {
        let mut client = RestClient::new();
        self.configure(&mut client);
        client
    }

    /// Apply the state of this builder onto an existing client
    pub fn configure(&self, client: &mut RestClient) {
        if let Some(factory) = &self.request_factory {
            client.set_request_factory(factory.clone());
        }
        if let Some(converters) = &self.message_converters {
            client.set_message_converters(converters.clone());
        }
    }

    pub fn try_configure(&self, client: Option<&mut RestClient>) -> Result<()> {
        let client =
            client.ok_or_else(|| RestClientError::invalid_argument("RestClient must not be null"))?;
        self.configure(client);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::{
        ByteArrayHttpMessageConverter, JsonHttpMessageConverter, StringHttpMessageConverter,
        default_converters,
    };
    use crate::request_factory::SimpleClientHttpRequestFactory;

    fn factory() -> Arc<dyn ClientHttpRequestFactory> {
        Arc::new(SimpleClientHttpRequestFactory::new())
    }

    fn same_converters(
        left: &[Arc<dyn HttpMessageConverter>],
        right: &[Arc<dyn HttpMessageConverter>],
    ) -> bool {
        left.len() == right.len() && left.iter().zip(right).all(|(l, r)| Arc::ptr_eq(l, r))
    }

    #[test]
    fn test_build_without_overrides_matches_default_client() {
        let client = RestClientBuilder::new().build();
        let default_client = RestClient::new();
        assert_eq!(
            client.message_converters().len(),
            default_client.message_converters().len()
        );
        assert_eq!(client.request_factory().name(), default_client.request_factory().name());

        let converters = client.message_converters();
        assert_eq!(converters.len(), 3);
        assert!(converters[0].as_any().is::<ByteArrayHttpMessageConverter>());
        assert!(converters[1].as_any().is::<StringHttpMessageConverter>());
        assert!(converters[2].as_any().is::<JsonHttpMessageConverter>());
    }

    #[test]
    fn test_configure_without_overrides_is_noop() {
        let mut client = RestClient::new();
        let factory_before = client.request_factory().clone();
        let converters_before = client.message_converters().to_vec();

        RestClientBuilder::new().configure(&mut client);

        assert!(Arc::ptr_eq(client.request_factory(), &factory_before));
        assert!(same_converters(client.message_converters(), &converters_before));
    }

    #[test]
    fn test_last_write_wins_per_field() {
        let first = factory();
        let second = factory();
        let json: Arc<dyn HttpMessageConverter> = Arc::new(JsonHttpMessageConverter);
        let text: Arc<dyn HttpMessageConverter> = Arc::new(StringHttpMessageConverter);

        let client = RestClientBuilder::new()
            .message_converters(vec![json.clone()])
            .request_factory(first)
            .message_converters(vec![text.clone()])
            .request_factory(second.clone())
            .build();

        assert!(Arc::ptr_eq(client.request_factory(), &second));
        assert!(same_converters(client.message_converters(), &[text]));
    }

    #[test]
    fn test_converters_replace_rather_than_append() {
        let mut client = RestClient::new();
        let json: Arc<dyn HttpMessageConverter> = Arc::new(JsonHttpMessageConverter);
        RestClientBuilder::new()
            .message_converters(vec![json.clone()])
            .configure(&mut client);
        assert!(same_converters(client.message_converters(), &[json]));
    }

    #[test]
    fn test_message_converters_from_aggregator() {
        let aggregator = HttpMessageConverters::new(vec![
            Arc::new(StringHttpMessageConverter) as Arc<dyn HttpMessageConverter>,
        ]);
        let client = RestClientBuilder::new()
            .message_converters_from(&aggregator)
            .build();
        assert!(same_converters(client.message_converters(), aggregator.converters()));
        assert_eq!(client.message_converters().len(), default_converters().len() + 1);
    }

    #[test]
    fn test_fields_are_independent() {
        let custom = factory();
        let mut client = RestClient::new();
        let converters_before = client.message_converters().to_vec();

        RestClientBuilder::new()
            .request_factory(custom.clone())
            .configure(&mut client);

        assert!(Arc::ptr_eq(client.request_factory(), &custom));
        assert!(same_converters(client.message_converters(), &converters_before));
    }

    #[test]
    fn test_configure_is_idempotent() {
        let builder = RestClientBuilder::new()
            .request_factory(factory())
            .message_converters(vec![
                Arc::new(JsonHttpMessageConverter) as Arc<dyn HttpMessageConverter>,
            ]);
        let mut client = RestClient::new();
        builder.configure(&mut client);
        let factory_once = client.request_factory().clone();
        let converters_once = client.message_converters().to_vec();

        builder.configure(&mut client);

        assert!(Arc::ptr_eq(client.request_factory(), &factory_once));
        assert!(same_converters(client.message_converters(), &converters_once));
    }

    #[test]
    fn test_build_does_not_change_builder() {
        let builder = RestClientBuilder::new().request_factory(factory());
        let _ = builder.build();
        assert!(builder.has_request_factory());
        assert!(!builder.has_message_converters());
    }

    #[test]
    fn test_try_request_factory_rejects_none() {
        let result = RestClientBuilder::new().try_request_factory(None);
        assert!(matches!(result, Err(RestClientError::InvalidArgument(_))));
    }

    #[test]
    fn test_try_configure_rejects_none() {
        let builder = RestClientBuilder::new().request_factory(factory());
        let result = builder.try_configure(None);
        assert!(matches!(result, Err(RestClientError::InvalidArgument(_))));
    }

    #[test]
    fn test_try_configure_applies_overrides() {
        let custom = factory();
        let builder = RestClientBuilder::new().request_factory(custom.clone());
        let mut client = RestClient::new();
        builder.try_configure(Some(&mut client)).unwrap();
        assert!(Arc::ptr_eq(client.request_factory(), &custom));
    }
}
