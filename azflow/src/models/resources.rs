//! Azure Resource Manager objects.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A tenant visible to the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    /// Resource id, `/tenants/{tenantId}`.
    pub id: String,
    /// Tenant GUID.
    pub tenant_id: String,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Default verified domain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_domain: Option<String>,
    /// Remaining properties.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A subscription.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    /// Resource id, `/subscriptions/{subscriptionId}`.
    pub id: String,
    /// Subscription GUID.
    pub subscription_id: String,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// `Enabled`, `Disabled`, ...
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Owning tenant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    /// Remaining properties.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A compute virtual machine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachine {
    /// Resource id.
    pub id: String,
    /// Resource name.
    pub name: String,
    /// Region.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Remaining properties.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An Azure RBAC role assignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureRoleAssignment {
    /// Resource id of the assignment.
    pub id: String,
    /// Assignment name (a GUID).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Assignment properties.
    pub properties: AzureRoleAssignmentProperties,
    /// Remaining properties.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Properties of an Azure RBAC role assignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureRoleAssignmentProperties {
    /// Full resource id of the role definition.
    pub role_definition_id: String,
    /// Assignee.
    pub principal_id: String,
    /// `User`, `Group`, `ServicePrincipal`, ...
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal_type: Option<String>,
    /// Scope the assignment applies to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Remaining properties.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AzureRoleAssignment {
    /// Returns the role definition GUID, the last segment of its resource id.
    #[must_use]
    pub fn role_definition_guid(&self) -> &str {
        let id = self.properties.role_definition_id.trim_end_matches('/');
        id.rsplit('/').next().unwrap_or(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_definition_guid() {
        let json = r#"{
            "id": "/subscriptions/s1/providers/Microsoft.Authorization/roleAssignments/a1",
            "name": "a1",
            "properties": {
                "roleDefinitionId": "/subscriptions/s1/providers/Microsoft.Authorization/roleDefinitions/b24988ac-6180-42a0-ab88-20f7382dd24c",
                "principalId": "p1",
                "scope": "/subscriptions/s1"
            }
        }"#;

        let assignment: AzureRoleAssignment = serde_json::from_str(json).unwrap();
        assert_eq!(assignment.role_definition_guid(), "b24988ac-6180-42a0-ab88-20f7382dd24c");
        assert_eq!(assignment.properties.principal_id, "p1");
    }

    #[test]
    fn test_role_definition_guid_without_path() {
        let assignment = AzureRoleAssignment {
            properties: AzureRoleAssignmentProperties {
                role_definition_id: "plain-guid".into(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(assignment.role_definition_guid(), "plain-guid");
    }

    #[test]
    fn test_subscription_decoding() {
        let json = r#"{
            "id": "/subscriptions/s1",
            "subscriptionId": "s1",
            "displayName": "Production",
            "state": "Enabled",
            "subscriptionPolicies": {"quotaId": "x"}
        }"#;
        let sub: Subscription = serde_json::from_str(json).unwrap();
        assert_eq!(sub.subscription_id, "s1");
        assert!(sub.extra.contains_key("subscriptionPolicies"));
    }
}
