use serde::Deserialize;
use std::time::Duration;

/// Router settings, usually deserialized from the application's configuration file.
///
/// ```
/// use micro_router::config::{DuplicateNamePolicy, RouterConfig};
///
/// let config: RouterConfig = serde_json::from_str(r#"{ "duplicate_name": "reject" }"#).unwrap();
/// assert_eq!(config.duplicate_name, DuplicateNamePolicy::Reject);
/// assert_eq!(config.default_timeout(), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub duplicate_name: DuplicateNamePolicy,
    /// Deadline for routes registered without their own timeout.
    pub default_timeout_ms: Option<u64>,
}

impl RouterConfig {
    pub fn default_timeout(&self) -> Option<Duration> {
        self.default_timeout_ms.map(Duration::from_millis)
    }
}

/// What to do when two routes are registered under the same name.
///
/// Either way only the first route keeps the name and the rejection is logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateNamePolicy {
    /// Skip the later route and keep building.
    #[default]
    Skip,
    /// Fail the build.
    Reject,
}
