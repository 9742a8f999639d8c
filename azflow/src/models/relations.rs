//! Relation records emitted by dependent listings.
//!
//! Each record names its parent explicitly so consumers can rebuild the
//! edge without holding the parent in memory.

use super::directory::DirectoryObject;
use super::resources::{AzureRoleAssignment, VirtualMachine};
use serde::{Deserialize, Serialize};

/// One owner of an application registration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppOwner {
    /// Object id of the application.
    pub app_id: String,
    /// The owner.
    pub owner: DirectoryObject,
}

/// One registered owner of a device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceOwner {
    /// Object id of the device.
    pub device_id: String,
    /// The owner.
    pub owner: DirectoryObject,
}

/// One owner of a group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupOwner {
    /// Object id of the group.
    pub group_id: String,
    /// The owner.
    pub owner: DirectoryObject,
}

/// One member of a group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMember {
    /// Object id of the group.
    pub group_id: String,
    /// The member.
    pub member: DirectoryObject,
}

/// One owner of a service principal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePrincipalOwner {
    /// Object id of the service principal.
    pub service_principal_id: String,
    /// The owner.
    pub owner: DirectoryObject,
}

/// A virtual machine found in a subscription.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionVirtualMachine {
    /// Subscription GUID.
    pub subscription_id: String,
    /// The virtual machine.
    pub virtual_machine: VirtualMachine,
}

/// An RBAC assignment scoped to a virtual machine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineRoleAssignment {
    /// Resource id of the virtual machine.
    pub virtual_machine_id: String,
    /// The assignment.
    pub role_assignment: AzureRoleAssignment,
}

/// A principal holding Contributor on a virtual machine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineContributor {
    /// Resource id of the virtual machine.
    pub virtual_machine_id: String,
    /// The Contributor assignment.
    pub contributor: AzureRoleAssignment,
}

impl VirtualMachineContributor {
    /// Keeps `assignment` only when it grants the Contributor role.
    #[must_use]
    pub fn from_assignment(assignment: VirtualMachineRoleAssignment) -> Option<Self> {
        (assignment.role_assignment.role_definition_guid() == super::CONTRIBUTOR_ROLE_ID).then(|| Self {
            virtual_machine_id: assignment.virtual_machine_id,
            contributor: assignment.role_assignment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AzureRoleAssignmentProperties;

    fn assignment(role: &str) -> VirtualMachineRoleAssignment {
        VirtualMachineRoleAssignment {
            virtual_machine_id: "/subscriptions/s1/virtualMachines/vm1".into(),
            role_assignment: AzureRoleAssignment {
                id: "ra1".into(),
                properties: AzureRoleAssignmentProperties {
                    role_definition_id: format!(
                        "/subscriptions/s1/providers/Microsoft.Authorization/roleDefinitions/{role}"
                    ),
                    principal_id: "p1".into(),
                    ..Default::default()
                },
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_contributor_kept() {
        let contributor =
            VirtualMachineContributor::from_assignment(assignment(crate::models::CONTRIBUTOR_ROLE_ID)).unwrap();
        assert_eq!(contributor.virtual_machine_id, "/subscriptions/s1/virtualMachines/vm1");
        assert_eq!(contributor.contributor.properties.principal_id, "p1");
    }

    #[test]
    fn test_other_roles_dropped() {
        // Reader
        let reader = assignment("acdd72a7-3385-48ef-bd42-f606fba81ae7");
        assert!(VirtualMachineContributor::from_assignment(reader).is_none());
    }

    #[test]
    fn test_relation_serialization() {
        let record = GroupMember {
            group_id: "g1".into(),
            member: DirectoryObject {
                id: "u1".into(),
                ..Default::default()
            },
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["groupId"], "g1");
        assert_eq!(value["member"]["id"], "u1");
    }
}
