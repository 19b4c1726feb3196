use std::sync::Arc;

use dashmap::DashMap;

use crate::error::Result;

/// Test double whose recorded state must not leak between tests
pub trait MockStandIn: Send + Sync {
    fn reset(&self);
}

/// Stand-ins registered for the test currently running, by name
#[derive(Default)]
pub struct TestContext {
    stand_ins: DashMap<String, Arc<dyn MockStandIn>>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a stand-in, returning the one previously registered under `name`
    pub fn register(
        &self,
        name: impl Into<String>,
        stand_in: Arc<dyn MockStandIn>,
    ) -> Option<Arc<dyn MockStandIn>> {
        self.stand_ins.insert(name.into(), stand_in)
    }

    pub fn remove(&self, name: &str) -> Option<Arc<dyn MockStandIn>> {
        self.stand_ins.remove(name).map(|(_, stand_in)| stand_in)
    }

    pub fn stand_ins(&self) -> Vec<Arc<dyn MockStandIn>> {
        self.stand_ins
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.stand_ins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stand_ins.is_empty()
    }
}

pub trait TestExecutionListener: Send + Sync {
    fn before_test_method(&self, _context: &TestContext) -> Result<()> {
        Ok(())
    }

    fn after_test_method(&self, _context: &TestContext) -> Result<()> {
        Ok(())
    }
}

/// Resets every registered mock stand-in after each test method.
///
/// Whether mock support exists is decided once when the listener is created.
/// Without it the listener does nothing.
#[derive(Debug, Clone, Copy)]
pub struct RestClientTestExecutionListener {
    mock_support: bool,
}

impl RestClientTestExecutionListener {
    /// Enabled when the crate was compiled with the `mock` feature
    pub fn detect() -> Self {
        Self::with_mock_support(cfg!(feature = "mock"))
    }

    pub fn with_mock_support(mock_support: bool) -> Self {
        Self { mock_support }
    }

    pub fn is_enabled(&self) -> bool {
        self.mock_support
    }
}

impl Default for RestClientTestExecutionListener {
    fn default() -> Self {
        Self::detect()
    }
}

impl TestExecutionListener for RestClientTestExecutionListener {
    fn after_test_method(&self, context: &TestContext) -> Result<()> {
        if !self.mock_support {
            return Ok(());
        }
        let stand_ins = context.stand_ins();
        for stand_in in &stand_ins {
            stand_in.reset();
        }
        log::debug!("Reset {} mock stand-in(s) after test method", stand_ins.len());
        Ok(())
    }
}
