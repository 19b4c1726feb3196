use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{RestClientError, Result};
use crate::request_factory::{ClientHttpRequest, ClientHttpResponse};

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub trait RequestMatcher: Send + Sync {
    fn matches(&self, request: &ClientHttpRequest) -> std::result::Result<(), String>;
}

impl<F> RequestMatcher for F
where
    F: Fn(&ClientHttpRequest) -> std::result::Result<(), String> + Send + Sync,
{
    fn matches(&self, request: &ClientHttpRequest) -> std::result::Result<(), String> {
        self(request)
    }
}

pub trait ResponseCreator: Send + Sync {
    fn create_response(&self, request: &ClientHttpRequest) -> Result<ClientHttpResponse>;
}

impl<F> ResponseCreator for F
where
    F: Fn(&ClientHttpRequest) -> Result<ClientHttpResponse> + Send + Sync,
{
    fn create_response(&self, request: &ClientHttpRequest) -> Result<ClientHttpResponse> {
        self(request)
    }
}

/// How many times an expectation may be matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpectedCount {
    pub min: usize,
    pub max: usize,
}

impl ExpectedCount {
    pub fn once() -> Self {
        Self::times(1)
    }

    pub fn times(count: usize) -> Self {
        Self {
            min: count,
            max: count,
        }
    }

    pub fn min(min: usize) -> Self {
        Self {
            min,
            max: usize::MAX,
        }
    }

    pub fn between(min: usize, max: usize) -> Self {
        Self {
            min,
            max: max.max(min),
        }
    }
}

pub struct RequestExpectation {
    count: ExpectedCount,
    matchers: Mutex<Vec<Box<dyn RequestMatcher>>>,
    response_creator: Mutex<Option<Box<dyn ResponseCreator>>>,
    match_count: AtomicUsize,
}

impl RequestExpectation {
    pub fn new(count: ExpectedCount, matcher: Box<dyn RequestMatcher>) -> Self {
        Self {
            count,
            matchers: Mutex::new(vec![matcher]),
            response_creator: Mutex::new(None),
            match_count: AtomicUsize::new(0),
        }
    }

    pub fn count(&self) -> ExpectedCount {
        self.count
    }

    pub fn match_count(&self) -> usize {
        self.match_count.load(Ordering::SeqCst)
    }

    pub fn add_matcher(&self, matcher: Box<dyn RequestMatcher>) {
        lock(&self.matchers).push(matcher);
    }

    pub fn set_response_creator(&self, creator: Box<dyn ResponseCreator>) {
        *lock(&self.response_creator) = Some(creator);
    }

    pub fn matches(&self, request: &ClientHttpRequest) -> std::result::Result<(), String> {
        lock(&self.matchers)
            .iter()
            .try_for_each(|matcher| matcher.matches(request))
    }

    /// Record a match and produce the scripted response
    pub fn create_response(&self, request: &ClientHttpRequest) -> Result<ClientHttpResponse> {
        self.record_match();
        self.respond(request)
    }

    fn record_match(&self) {
        self.match_count.fetch_add(1, Ordering::SeqCst);
    }

    /// Run the response creator without counting a match. Callers must not
    /// hold the manager state lock, the creator may call back into the server.
    fn respond(&self, request: &ClientHttpRequest) -> Result<ClientHttpResponse> {
        match lock(&self.response_creator).as_ref() {
            Some(creator) => creator.create_response(request),
            None => Err(RestClientError::Assertion(format!(
                "No response creator set for {} {}",
                request.method, request.uri
            ))),
        }
    }

    pub fn has_remaining_count(&self) -> bool {
        self.match_count() < self.count.max
    }

    pub fn is_satisfied(&self) -> bool {
        self.match_count() >= self.count.min
    }
}

/// Records expectations and validates actual requests against them.
pub trait RequestExpectationManager: Send + Sync {
    fn expect_request(
        &self,
        count: ExpectedCount,
        matcher: Box<dyn RequestMatcher>,
    ) -> Arc<RequestExpectation>;

    fn validate_request(&self, request: &ClientHttpRequest) -> Result<ClientHttpResponse>;

    fn verify(&self) -> Result<()>;

    fn reset(&self);
}

#[derive(Default)]
struct ExpectationState {
    expectations: Vec<Arc<RequestExpectation>>,
    requests: Vec<ClientHttpRequest>,
    position: usize,
}

impl ExpectationState {
    fn verify(&self) -> Result<()> {
        let unsatisfied = self
            .expectations
            .iter()
            .filter(|e| !e.is_satisfied())
            .count();
        if unsatisfied == 0 {
            return Ok(());
        }
        Err(RestClientError::Assertion(format!(
            "Further request(s) expected leaving {} unsatisfied expectation(s).\n{}",
            unsatisfied,
            self.request_details()
        )))
    }

    fn request_details(&self) -> String {
        let mut details = format!("{} request(s) executed", self.requests.len());
        for request in &self.requests {
            details.push_str(&format!("\n{} {}", request.method, request.uri));
        }
        details
    }

    fn unexpected(&self, request: &ClientHttpRequest, reason: &str) -> RestClientError {
        RestClientError::Assertion(format!(
            "Unexpected request {} {}: {}\n{}",
            request.method,
            request.uri,
            reason,
            self.request_details()
        ))
    }
}

/// Expectations must be met in the order they were declared.
#[derive(Default)]
pub struct SimpleRequestExpectationManager {
    state: Mutex<ExpectationState>,
}

impl SimpleRequestExpectationManager {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RequestExpectationManager for SimpleRequestExpectationManager {
    fn expect_request(
        &self,
        count: ExpectedCount,
        matcher: Box<dyn RequestMatcher>,
    ) -> Arc<RequestExpectation> {
        let expectation = Arc::new(RequestExpectation::new(count, matcher));
        lock(&self.state).expectations.push(expectation.clone());
        expectation
    }

    fn validate_request(&self, request: &ClientHttpRequest) -> Result<ClientHttpResponse> {
        let matched = {
            let mut state = lock(&self.state);
            state.requests.push(request.clone());
            loop {
                let Some(current) = state.expectations.get(state.position).cloned() else {
                    return Err(state.unexpected(request, "no further requests expected"));
                };
                if current.has_remaining_count() {
                    match current.matches(request) {
                        Ok(()) => {
                            current.record_match();
                            break current;
                        }
                        Err(reason) if !current.is_satisfied() => {
                            return Err(state.unexpected(request, &reason));
                        }
                        Err(_) => {}
                    }
                }
                state.position += 1;
            }
        };
        matched.respond(request)
    }

    fn verify(&self) -> Result<()> {
        lock(&self.state).verify()
    }

    fn reset(&self) {
        *lock(&self.state) = ExpectationState::default();
    }
}

/// Any expectation with remaining count may serve a request.
#[derive(Default)]
pub struct UnorderedRequestExpectationManager {
    state: Mutex<ExpectationState>,
}

impl UnorderedRequestExpectationManager {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RequestExpectationManager for UnorderedRequestExpectationManager {
    fn expect_request(
        &self,
        count: ExpectedCount,
        matcher: Box<dyn RequestMatcher>,
    ) -> Arc<RequestExpectation> {
        let expectation = Arc::new(RequestExpectation::new(count, matcher));
        lock(&self.state).expectations.push(expectation.clone());
        expectation
    }

    fn validate_request(&self, request: &ClientHttpRequest) -> Result<ClientHttpResponse> {
        let matched = {
            let mut state = lock(&self.state);
            state.requests.push(request.clone());
            let found = state
                .expectations
                .iter()
                .find(|e| e.has_remaining_count() && e.matches(request).is_ok())
                .cloned();
            match found {
                Some(expectation) => {
                    expectation.record_match();
                    expectation
                }
                None => return Err(state.unexpected(request, "no matching expectation")),
            }
        };
        matched.respond(request)
    }

    fn verify(&self) -> Result<()> {
        lock(&self.state).verify()
    }

    fn reset(&self) {
        *lock(&self.state) = ExpectationState::default();
    }
}

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode, Uri};

    use super::*;

    fn request(path: &'static str) -> ClientHttpRequest {
        ClientHttpRequest::new(Method::GET, Uri::from_static(path))
    }

    fn path_is(expected: &'static str) -> Box<dyn RequestMatcher> {
        Box::new(move |req: &ClientHttpRequest| {
            if req.uri.path() == expected {
                Ok(())
            } else {
                Err(format!("expected {} but was {}", expected, req.uri.path()))
            }
        })
    }

    fn ok(_: &ClientHttpRequest) -> Result<ClientHttpResponse> {
        Ok(ClientHttpResponse::new(StatusCode::OK, "ok"))
    }

    #[test]
    fn test_expected_count_ranges() {
        assert_eq!(ExpectedCount::once(), ExpectedCount { min: 1, max: 1 });
        assert_eq!(ExpectedCount::between(3, 1), ExpectedCount { min: 3, max: 3 });
        assert_eq!(ExpectedCount::min(2).max, usize::MAX);
    }

    #[test]
    fn test_ordered_manager_rejects_out_of_order() {
        let manager = SimpleRequestExpectationManager::new();
        manager
            .expect_request(ExpectedCount::once(), path_is("/a"))
            .set_response_creator(Box::new(ok));
        manager
            .expect_request(ExpectedCount::once(), path_is("/b"))
            .set_response_creator(Box::new(ok));

        let result = manager.validate_request(&request("http://h/b"));
        assert!(matches!(result, Err(RestClientError::Assertion(_))));
    }

    #[test]
    fn test_ordered_manager_advances_after_satisfied() {
        let manager = SimpleRequestExpectationManager::new();
        for _ in 0..2 {
            manager
                .expect_request(ExpectedCount::once(), Box::new(|_: &ClientHttpRequest| Ok::<(), String>(())))
                .set_response_creator(Box::new(ok));
        }
        manager.validate_request(&request("http://h/a")).unwrap();
        assert!(manager.verify().is_err());
        manager.validate_request(&request("http://h/b")).unwrap();
        manager.verify().unwrap();

        let result = manager.validate_request(&request("http://h/c"));
        assert!(matches!(result, Err(RestClientError::Assertion(_))));
    }

    #[test]
    fn test_ordered_manager_skips_satisfied_range() {
        let manager = SimpleRequestExpectationManager::new();
        manager
            .expect_request(ExpectedCount::between(1, 3), path_is("/a"))
            .set_response_creator(Box::new(ok));
        manager
            .expect_request(ExpectedCount::once(), path_is("/b"))
            .set_response_creator(Box::new(ok));

        manager.validate_request(&request("/a")).unwrap();
        manager.validate_request(&request("/b")).unwrap();
        manager.verify().unwrap();
    }

    #[test]
    fn test_unordered_manager_accepts_any_order() {
        let manager = UnorderedRequestExpectationManager::new();
        manager
            .expect_request(ExpectedCount::once(), path_is("/a"))
            .set_response_creator(Box::new(ok));
        manager
            .expect_request(ExpectedCount::once(), path_is("/b"))
            .set_response_creator(Box::new(ok));

        manager.validate_request(&request("/b")).unwrap();
        manager.validate_request(&request("/a")).unwrap();
        manager.verify().unwrap();
    }

    #[test]
    fn test_missing_response_creator() {
        let manager = UnorderedRequestExpectationManager::new();
        manager.expect_request(ExpectedCount::once(), path_is("/a"));
        let result = manager.validate_request(&request("/a"));
        assert!(matches!(result, Err(RestClientError::Assertion(_))));
    }

    #[test]
    fn test_reset_clears_expectations() {
        let manager = SimpleRequestExpectationManager::new();
        manager.expect_request(ExpectedCount::once(), path_is("/a"));
        assert!(manager.verify().is_err());
        manager.reset();
        manager.verify().unwrap();
    }
}
