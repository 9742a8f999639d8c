//! Microsoft Graph directory objects.
//!
//! Each model names the properties the collector relies on and keeps every
//! other property in `extra`, so records reach the sink unabridged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A generic directory object, as returned by owner and member listings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryObject {
    /// Object id.
    pub id: String,
    /// Concrete type, e.g. `#microsoft.graph.user`.
    #[serde(rename = "@odata.type", skip_serializing_if = "Option::is_none")]
    pub odata_type: Option<String>,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Remaining properties.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An Entra ID user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Object id.
    pub id: String,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// User principal name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_principal_name: Option<String>,
    /// Whether sign-in is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_enabled: Option<bool>,
    /// SID of the synced on-premises account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_premises_security_identifier: Option<String>,
    /// Remaining properties.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An Entra ID group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Object id.
    pub id: String,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Whether the group is a security group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_enabled: Option<bool>,
    /// Whether directory roles can be assigned to the group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_assignable_to_role: Option<bool>,
    /// Remaining properties.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A registered device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Object id.
    pub id: String,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Device id assigned at registration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    /// Operating system.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operating_system: Option<String>,
    /// Remaining properties.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An application registration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    /// Object id.
    pub id: String,
    /// Client (application) id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Remaining properties.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A service principal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePrincipal {
    /// Object id.
    pub id: String,
    /// Client id of the backing application.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// `Application`, `ManagedIdentity`, ...
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_principal_type: Option<String>,
    /// Remaining properties.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A directory role definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    /// Role definition id.
    pub id: String,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Whether the role is built in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_built_in: Option<bool>,
    /// Template id shared across tenants.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    /// Remaining properties.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A directory role assignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssignment {
    /// Assignment id.
    pub id: String,
    /// Assigned role definition.
    pub role_definition_id: String,
    /// Assignee.
    pub principal_id: String,
    /// Scope of the assignment, `/` for the whole directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory_scope_id: Option<String>,
    /// Remaining properties.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_keeps_unknown_properties() {
        let json = r#"{
            "id": "u1",
            "displayName": "Ada",
            "userPrincipalName": "ada@contoso.com",
            "accountEnabled": true,
            "jobTitle": "Engineer"
        }"#;

        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.user_principal_name.as_deref(), Some("ada@contoso.com"));
        assert_eq!(user.extra["jobTitle"], "Engineer");

        let back = serde_json::to_value(&user).unwrap();
        assert_eq!(back["jobTitle"], "Engineer");
        assert_eq!(back["accountEnabled"], true);
    }

    #[test]
    fn test_directory_object_type() {
        let json = r##"{"@odata.type": "#microsoft.graph.servicePrincipal", "id": "sp1"}"##;
        let object: DirectoryObject = serde_json::from_str(json).unwrap();
        assert_eq!(object.odata_type.as_deref(), Some("#microsoft.graph.servicePrincipal"));
        assert!(object.extra.is_empty());
    }
}
