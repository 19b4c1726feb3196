use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Which transport the assembly layer should hand to the builder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransportPreference {
    /// First available transport in priority order
    #[default]
    Auto,
    Reqwest,
    Simple,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RestClientProperties {
    pub transport: TransportPreference,
    pub connect_timeout_secs: Option<u64>,
    pub read_timeout_secs: Option<u64>,
}

impl RestClientProperties {
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let props = RestClientProperties::default();
        assert_eq!(props.transport, TransportPreference::Auto);
        assert!(props.connect_timeout().is_none());
        assert!(props.read_timeout().is_none());
    }

    #[test]
    fn test_deserialize_partial() {
        let props: RestClientProperties =
            serde_json::from_str(r#"{"transport": "simple", "read_timeout_secs": 5}"#).unwrap();
        assert_eq!(props.transport, TransportPreference::Simple);
        assert_eq!(props.read_timeout(), Some(Duration::from_secs(5)));
        assert!(props.connect_timeout_secs.is_none());
    }
}
