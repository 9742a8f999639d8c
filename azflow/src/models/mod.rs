//! Entity models for Microsoft Graph and Azure Resource Manager.

mod directory;
mod relations;
mod resources;

pub use directory::{Application, Device, DirectoryObject, Group, Role, RoleAssignment, ServicePrincipal, User};
pub use relations::{
    AppOwner, DeviceOwner, GroupMember, GroupOwner, ServicePrincipalOwner, SubscriptionVirtualMachine,
    VirtualMachineContributor, VirtualMachineRoleAssignment,
};
pub use resources::{AzureRoleAssignment, AzureRoleAssignmentProperties, Subscription, Tenant, VirtualMachine};

use crate::pipeline::Identified;

/// Microsoft Graph API version.
pub const GRAPH_API_VERSION: &str = "v1.0";

/// `api-version` for tenant listings.
pub const TENANTS_API_VERSION: &str = "2020-01-01";

/// `api-version` for subscription listings.
pub const SUBSCRIPTIONS_API_VERSION: &str = "2020-01-01";

/// `api-version` for compute resource listings.
pub const COMPUTE_API_VERSION: &str = "2021-07-01";

/// `api-version` for RBAC role assignment listings.
pub const ROLE_ASSIGNMENTS_API_VERSION: &str = "2015-07-01";

/// Built-in Azure Contributor role definition GUID.
pub const CONTRIBUTOR_ROLE_ID: &str = "b24988ac-6180-42a0-ab88-20f7382dd24c";

macro_rules! identified_by {
    ($field:ident: $($ty:ty),+ $(,)?) => {
        $(impl Identified for $ty {
            fn id(&self) -> &str {
                &self.$field
            }
        })+
    };
}

identified_by!(id: DirectoryObject, User, Group, Device, Application, ServicePrincipal, Role, RoleAssignment);
identified_by!(id: Tenant, VirtualMachine, AzureRoleAssignment);
identified_by!(subscription_id: Subscription);
identified_by!(virtual_machine_id: VirtualMachineRoleAssignment);

impl Identified for SubscriptionVirtualMachine {
    fn id(&self) -> &str {
        &self.virtual_machine.id
    }
}
