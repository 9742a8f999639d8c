//! Run identity for tracking collection runs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one collection run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunIdentity {
    /// The unique ID for this run.
    pub run_id: Uuid,

    /// The tenant being collected, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,
}

impl RunIdentity {
    /// Creates a new run identity with a generated run ID.
    #[must_use]
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            tenant: None,
        }
    }

    /// Creates a run identity with a specific run ID.
    #[must_use]
    pub fn with_run_id(run_id: Uuid) -> Self {
        Self {
            run_id,
            tenant: None,
        }
    }

    /// Sets the tenant.
    #[must_use]
    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }
}

impl Default for RunIdentity {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_generates_v4() {
        let identity = RunIdentity::new();
        assert_eq!(identity.run_id.get_version_num(), 4);
        assert!(identity.tenant.is_none());
    }

    #[test]
    fn test_serialization_skips_missing_tenant() {
        let identity = RunIdentity::with_run_id(Uuid::nil());
        let json = serde_json::to_value(&identity).unwrap();
        assert!(json.get("tenant").is_none());

        let json = serde_json::to_value(identity.with_tenant("contoso")).unwrap();
        assert_eq!(json["tenant"], "contoso");
    }
}
