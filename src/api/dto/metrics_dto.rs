//! Metrics API DTOs

use serde::Deserialize;
use validator::Validate;

/// Optional namespace/pod filter. Empty values mean "no filter".
#[derive(Deserialize, Debug, Default, Validate)]
pub struct UsageScopeQuery {
    #[validate(length(max = 63))]
    pub namespace: Option<String>,
    #[validate(length(max = 253))]
    pub pod: Option<String>,
}

impl UsageScopeQuery {
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref().filter(|v| !v.is_empty())
    }

    pub fn pod(&self) -> Option<&str> {
        self.pod.as_deref().filter(|v| !v.is_empty())
    }
}
