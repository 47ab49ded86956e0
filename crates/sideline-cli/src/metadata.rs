use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use sideline_core::UtcDateTime;
use uuid::Uuid;

/// Request identifier (UUID v4) attached to every command output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Command metadata rendered ahead of the data.
///
/// Field order is fixed to keep JSON output stable across runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metadata {
    pub request_id: RequestId,
    pub generated_at: UtcDateTime,
    /// Sources that served the data, in result order. `mock` marks simulated data.
    pub sources: Vec<String>,
    pub latency_ms: u64,
    pub cache_hit: bool,
    pub degraded: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Metadata {
    pub fn new(sources: Vec<String>, latency_ms: u64, cache_hit: bool, degraded: bool) -> Self {
        Self {
            request_id: RequestId::new_v4(),
            generated_at: UtcDateTime::now(),
            sources,
            latency_ms,
            cache_hit,
            degraded,
            warnings: Vec::new(),
        }
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_id_is_uuid_v4() {
        let request_id = RequestId::new_v4();
        assert_eq!(request_id.0.get_version_num(), 4);
    }

    #[test]
    fn empty_warnings_are_omitted_from_json() {
        let mut metadata = Metadata::new(vec![String::from("espn")], 4200, false, false);
        let rendered = serde_json::to_string(&metadata).expect("serializes");
        assert!(rendered.contains("\"latency_ms\":4200"));
        assert!(!rendered.contains("warnings"));

        metadata.push_warning("w1");
        let rendered = serde_json::to_string(&metadata).expect("serializes");
        assert!(rendered.contains("\"warnings\":[\"w1\"]"));
    }
}
