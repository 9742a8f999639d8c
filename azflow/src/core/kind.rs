//! Entity kinds as named by the ingest format.

use crate::errors::AzflowError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of a collected record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Application registration.
    #[serde(rename = "AZApp")]
    App,
    /// Owner of an application registration.
    #[serde(rename = "AZAppOwner")]
    AppOwner,
    /// Registered device.
    #[serde(rename = "AZDevice")]
    Device,
    /// Owner of a device.
    #[serde(rename = "AZDeviceOwner")]
    DeviceOwner,
    /// Group.
    #[serde(rename = "AZGroup")]
    Group,
    /// Member of a group.
    #[serde(rename = "AZGroupMember")]
    GroupMember,
    /// Owner of a group.
    #[serde(rename = "AZGroupOwner")]
    GroupOwner,
    /// Directory role definition.
    #[serde(rename = "AZRole")]
    Role,
    /// Directory role assignment.
    #[serde(rename = "AZRoleAssignment")]
    RoleAssignment,
    /// Service principal.
    #[serde(rename = "AZServicePrincipal")]
    ServicePrincipal,
    /// Owner of a service principal.
    #[serde(rename = "AZServicePrincipalOwner")]
    ServicePrincipalOwner,
    /// Tenant.
    #[serde(rename = "AZTenant")]
    Tenant,
    /// User.
    #[serde(rename = "AZUser")]
    User,
    /// Subscription.
    #[serde(rename = "AZSubscription")]
    Subscription,
    /// Virtual machine.
    #[serde(rename = "AZVM")]
    VirtualMachine,
    /// RBAC assignment on a virtual machine.
    #[serde(rename = "AZVMRoleAssignment")]
    VirtualMachineRoleAssignment,
    /// Contributor on a virtual machine.
    #[serde(rename = "AZVMContributor")]
    VirtualMachineContributor,
}

impl EntityKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 17] = [
        Self::App,
        Self::AppOwner,
        Self::Device,
        Self::DeviceOwner,
        Self::Group,
        Self::GroupMember,
        Self::GroupOwner,
        Self::Role,
        Self::RoleAssignment,
        Self::ServicePrincipal,
        Self::ServicePrincipalOwner,
        Self::Tenant,
        Self::User,
        Self::Subscription,
        Self::VirtualMachine,
        Self::VirtualMachineRoleAssignment,
        Self::VirtualMachineContributor,
    ];

    /// Returns the ingest name, e.g. `AZGroupMember`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::App => "AZApp",
            Self::AppOwner => "AZAppOwner",
            Self::Device => "AZDevice",
            Self::DeviceOwner => "AZDeviceOwner",
            Self::Group => "AZGroup",
            Self::GroupMember => "AZGroupMember",
            Self::GroupOwner => "AZGroupOwner",
            Self::Role => "AZRole",
            Self::RoleAssignment => "AZRoleAssignment",
            Self::ServicePrincipal => "AZServicePrincipal",
            Self::ServicePrincipalOwner => "AZServicePrincipalOwner",
            Self::Tenant => "AZTenant",
            Self::User => "AZUser",
            Self::Subscription => "AZSubscription",
            Self::VirtualMachine => "AZVM",
            Self::VirtualMachineRoleAssignment => "AZVMRoleAssignment",
            Self::VirtualMachineContributor => "AZVMContributor",
        }
    }

    /// Returns the kind whose records drive the listing of this kind.
    ///
    /// Root kinds are listed directly and have no parent.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        match self {
            Self::AppOwner => Some(Self::App),
            Self::DeviceOwner => Some(Self::Device),
            Self::GroupMember | Self::GroupOwner => Some(Self::Group),
            Self::RoleAssignment => Some(Self::Role),
            Self::ServicePrincipalOwner => Some(Self::ServicePrincipal),
            Self::VirtualMachine => Some(Self::Subscription),
            Self::VirtualMachineRoleAssignment => Some(Self::VirtualMachine),
            Self::VirtualMachineContributor => Some(Self::VirtualMachineRoleAssignment),
            _ => None,
        }
    }

    /// Returns the kinds derived directly from this kind.
    pub fn children(self) -> impl Iterator<Item = Self> {
        Self::ALL.into_iter().filter(move |kind| kind.parent() == Some(self))
    }

    /// Returns true for kinds read from Azure Resource Manager.
    #[must_use]
    pub fn is_resource_manager(&self) -> bool {
        matches!(
            self,
            Self::Subscription
                | Self::VirtualMachine
                | Self::VirtualMachineRoleAssignment
                | Self::VirtualMachineContributor
        )
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = AzflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| AzflowError::Config(format!("unknown entity kind '{s}'")))
    }
}
