//! Tagged records for the merge point.

use super::kind::EntityKind;
use crate::models::{
    AppOwner, Application, Device, DeviceOwner, Group, GroupMember, GroupOwner, Role, RoleAssignment,
    ServicePrincipal, ServicePrincipalOwner, Subscription, SubscriptionVirtualMachine, Tenant, User,
    VirtualMachineContributor, VirtualMachineRoleAssignment,
};
use serde::Serialize;

/// A collected record of any kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Entity {
    /// An application registration.
    App(Application),
    /// An application owner.
    AppOwner(AppOwner),
    /// A device.
    Device(Device),
    /// A device owner.
    DeviceOwner(DeviceOwner),
    /// A group.
    Group(Group),
    /// A group member.
    GroupMember(GroupMember),
    /// A group owner.
    GroupOwner(GroupOwner),
    /// A directory role.
    Role(Role),
    /// A directory role assignment.
    RoleAssignment(RoleAssignment),
    /// A service principal.
    ServicePrincipal(ServicePrincipal),
    /// A service principal owner.
    ServicePrincipalOwner(ServicePrincipalOwner),
    /// A tenant.
    Tenant(Tenant),
    /// A user.
    User(User),
    /// A subscription.
    Subscription(Subscription),
    /// A virtual machine with its subscription.
    VirtualMachine(SubscriptionVirtualMachine),
    /// An RBAC assignment on a virtual machine.
    VirtualMachineRoleAssignment(VirtualMachineRoleAssignment),
    /// A Contributor on a virtual machine.
    VirtualMachineContributor(VirtualMachineContributor),
}

macro_rules! entity_variants {
    ($($variant:ident($ty:ty)),+ $(,)?) => {
        impl Entity {
            /// Returns the kind of the payload.
            #[must_use]
            pub fn kind(&self) -> EntityKind {
                match self {
                    $(Self::$variant(_) => EntityKind::$variant,)+
                }
            }
        }

        $(impl From<$ty> for Entity {
            fn from(value: $ty) -> Self {
                Self::$variant(value)
            }
        })+
    };
}

entity_variants!(
    App(Application),
    AppOwner(AppOwner),
    Device(Device),
    DeviceOwner(DeviceOwner),
    Group(Group),
    GroupMember(GroupMember),
    GroupOwner(GroupOwner),
    Role(Role),
    RoleAssignment(RoleAssignment),
    ServicePrincipal(ServicePrincipal),
    ServicePrincipalOwner(ServicePrincipalOwner),
    Tenant(Tenant),
    User(User),
    Subscription(Subscription),
    VirtualMachine(SubscriptionVirtualMachine),
    VirtualMachineRoleAssignment(VirtualMachineRoleAssignment),
    VirtualMachineContributor(VirtualMachineContributor),
);

/// A record labelled with its kind.
///
/// The kind is derived from the payload, so the two can never disagree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaggedItem {
    /// Kind of `data`.
    pub kind: EntityKind,
    /// The record.
    pub data: Entity,
}

impl TaggedItem {
    /// Tags `data` with its own kind.
    #[must_use]
    pub fn new(data: impl Into<Entity>) -> Self {
        let data = data.into();
        Self {
            kind: data.kind(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DirectoryObject;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_tagged_item_shape() {
        let item = TaggedItem::new(GroupMember {
            group_id: "g1".into(),
            member: DirectoryObject {
                id: "u1".into(),
                ..Default::default()
            },
        });

        assert_eq!(item.kind, EntityKind::GroupMember);
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!({"kind": "AZGroupMember", "data": {"groupId": "g1", "member": {"id": "u1"}}})
        );
    }

    #[test]
    fn test_kind_follows_payload() {
        let tenant = Entity::from(Tenant {
            id: "/tenants/t1".into(),
            tenant_id: "t1".into(),
            ..Default::default()
        });
        assert_eq!(tenant.kind(), EntityKind::Tenant);
        assert_eq!(
            TaggedItem::new(SubscriptionVirtualMachine::default()).kind,
            EntityKind::VirtualMachine
        );
    }
}
