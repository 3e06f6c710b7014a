//! Host detection and resolver configuration.
//!
//! The resolver never sniffs its environment; it receives a `HostKind`
//! at construction time.

use serde::{Deserialize, Serialize};

/// Which interception behavior the embedding host exhibits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostKind {
    /// Rewrites failures into 200 responses whose body starts with `_error_=`.
    Android,
    /// Passes statuses through and signals network failure with status 999.
    Other,
}

impl HostKind {
    /// Classify a user agent. With no user agent to inspect, the rewrite
    /// behavior is assumed.
    pub fn from_user_agent(user_agent: Option<&str>) -> Self {
        match user_agent {
            Some(ua) if !ua.to_ascii_lowercase().contains("android") => HostKind::Other,
            _ => HostKind::Android,
        }
    }

    pub fn rewrites_errors(self) -> bool {
        matches!(self, HostKind::Android)
    }
}

/// Configuration injected into `ResponseResolver`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    pub host: HostKind,
    /// Status the direct host uses to signal network failure.
    #[serde(default = "default_network_failure_status")]
    pub network_failure_status: u16,
}

fn default_network_failure_status() -> u16 {
    999
}

impl ResolverConfig {
    pub fn new(host: HostKind) -> Self {
        Self {
            host,
            network_failure_status: default_network_failure_status(),
        }
    }

    pub fn from_user_agent(user_agent: Option<&str>) -> Self {
        Self::new(HostKind::from_user_agent(user_agent))
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::from_user_agent(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANDROID_UA: &str = "Mozilla/5.0 (Linux; Android 13; Pixel 7) AppleWebKit/537.36 Mobile Safari/537.36";
    const IOS_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 Mobile/15E148";

    #[test]
    fn detects_android_case_insensitively() {
        assert_eq!(HostKind::from_user_agent(Some(ANDROID_UA)), HostKind::Android);
        assert_eq!(HostKind::from_user_agent(Some("ANDROID")), HostKind::Android);
    }

    #[test]
    fn other_user_agents_are_direct() {
        assert_eq!(HostKind::from_user_agent(Some(IOS_UA)), HostKind::Other);
        assert_eq!(HostKind::from_user_agent(Some("")), HostKind::Other);
    }

    #[test]
    fn missing_user_agent_assumes_rewrites() {
        assert_eq!(HostKind::from_user_agent(None), HostKind::Android);
        assert!(ResolverConfig::default().host.rewrites_errors());
    }

    #[test]
    fn config_deserializes_with_default_sentinel() {
        let config: ResolverConfig = serde_json::from_str(r#"{"host":"other"}"#).unwrap();
        assert_eq!(config.host, HostKind::Other);
        assert_eq!(config.network_failure_status, 999);
    }
}
