//! Wires listing, tee, dependent and merge stages into one output stream.

use super::plan::CollectionPlan;
use super::queries::QuerySet;
use crate::client::{AzureClient, QueryParams};
use crate::context::RunContext;
use crate::core::{Entity, EntityKind, TaggedItem};
use crate::models::{
    AppOwner, Application, Device, DeviceOwner, Group, GroupMember, GroupOwner, Role, ServicePrincipal,
    ServicePrincipalOwner, Subscription, SubscriptionVirtualMachine, VirtualMachineContributor,
    VirtualMachineRoleAssignment,
};
use crate::pipeline::{dependents, filter_map_with, mux, tag, tee_n, Identified, ItemStream, ParentErrors};
use tracing::{debug, error, info};

/// A consumer of one branch of a listed stream.
///
/// The second argument says whether this branch must carry the stream's
/// `Err` items to the output.
type Branch<'a, T> = Box<dyn FnOnce(ItemStream<T>, ParentErrors) -> Vec<ItemStream<TaggedItem>> + 'a>;

/// Builds the stage graph for `plan` and returns the merged output.
///
/// Every kind in the plan is listed, directly or through its ancestors, and
/// tagged on the way out. A listed stream with several consumers is split
/// with a tee; a stream with one consumer is handed over as is; a kind with
/// no consumers is never listed. Wiring itself performs no I/O; each
/// listing stage starts fetching once spawned and then waits on its
/// downstream handoff.
pub fn collect(
    ctx: &RunContext,
    client: &AzureClient,
    plan: &CollectionPlan,
    queries: &QuerySet,
) -> ItemStream<TaggedItem> {
    let wiring = Wiring {
        ctx,
        client,
        plan,
        queries,
    };

    let outputs: Vec<_> = [
        wiring.apps(),
        wiring.devices(),
        wiring.groups(),
        wiring.service_principals(),
        wiring.roles(),
        wiring.tenants(),
        wiring.users(),
        wiring.subscriptions(),
    ]
    .into_iter()
    .flatten()
    .collect();

    info!(
        run_id = %ctx.identity().run_id,
        kinds = plan.len(),
        outputs = outputs.len(),
        "collection stages wired"
    );
    mux(ctx, outputs)
}

#[derive(Clone, Copy)]
struct Wiring<'a> {
    ctx: &'a RunContext,
    client: &'a AzureClient,
    plan: &'a CollectionPlan,
    queries: &'a QuerySet,
}

impl<'a> Wiring<'a> {
    /// Lists `kind` once and hands one copy of the stream to each branch.
    ///
    /// When `kind` itself is not emitted, the first branch forwards the
    /// listing's errors so they still reach the output exactly once.
    fn fan_out<T>(
        self,
        kind: EntityKind,
        list: impl FnOnce() -> ItemStream<T>,
        branches: impl IntoIterator<Item = Option<Branch<'a, T>>>,
    ) -> Vec<ItemStream<TaggedItem>>
    where
        T: Clone + Send + 'static,
    {
        let branches: Vec<_> = branches.into_iter().flatten().collect();
        let width = self.plan.branches(kind);
        if branches.len() != width {
            error!(%kind, width, wired = branches.len(), "branch wiring does not match the plan");
            self.ctx.cancel(format!("structural error: {kind} wired with {} of {width} branches", branches.len()));
            return Vec::new();
        }

        let streams = match width {
            0 => {
                debug!(%kind, "not required, skipping listing");
                return Vec::new();
            }
            1 => vec![list()],
            n => {
                debug!(%kind, branches = n, "splitting listing");
                tee_n(self.ctx, list(), n)
            }
        };

        let first = if self.plan.contains(kind) {
            ParentErrors::Skip
        } else {
            ParentErrors::Forward
        };
        branches
            .into_iter()
            .zip(streams)
            .enumerate()
            .flat_map(|(i, (branch, stream))| branch(stream, if i == 0 { first } else { ParentErrors::Skip }))
            .collect()
    }

    /// Emits the stream's own records when `kind` is planned.
    fn output<T>(self, kind: EntityKind) -> Option<Branch<'a, T>>
    where
        T: Into<Entity> + Send + 'static,
    {
        if !self.plan.contains(kind) {
            return None;
        }
        let branch: Branch<'a, T> = Box::new(move |stream, _| vec![tag(self.ctx, stream)]);
        Some(branch)
    }

    /// Lists `kind` for every parent and emits the relation records.
    fn dependent<P, C, R, F, M>(self, kind: EntityKind, stage: &'static str, list: F, relate: M) -> Option<Branch<'a, P>>
    where
        P: Identified + Send + 'static,
        C: Send + 'static,
        R: Into<Entity> + Send + 'static,
        F: Fn(&AzureClient, &RunContext, &P, &QueryParams) -> ItemStream<C> + Send + 'static,
        M: Fn(&P, C) -> R + Send + 'static,
    {
        if !self.plan.requires(kind) {
            return None;
        }
        let client = self.client.clone();
        let query = self.queries.get(kind);
        let branch: Branch<'a, P> = Box::new(move |parents, parent_errors| {
            let records = dependents(
                self.ctx,
                stage,
                parents,
                parent_errors,
                move |ctx, parent: &P| list(&client, ctx, parent, &query),
                relate,
            );
            vec![tag(self.ctx, records)]
        });
        Some(branch)
    }

    fn apps(self) -> Vec<ItemStream<TaggedItem>> {
        self.fan_out(
            EntityKind::App,
            || self.client.list_apps(self.ctx, &self.queries.get(EntityKind::App)),
            [
                self.output(EntityKind::App),
                self.dependent(
                    EntityKind::AppOwner,
                    "app_owners",
                    |client, ctx, app: &Application, query| client.list_app_owners(ctx, &app.id, query),
                    |app, owner| AppOwner {
                        app_id: app.id.clone(),
                        owner,
                    },
                ),
            ],
        )
    }

    fn devices(self) -> Vec<ItemStream<TaggedItem>> {
        self.fan_out(
            EntityKind::Device,
            || self.client.list_devices(self.ctx, &self.queries.get(EntityKind::Device)),
            [
                self.output(EntityKind::Device),
                self.dependent(
                    EntityKind::DeviceOwner,
                    "device_owners",
                    |client, ctx, device: &Device, query| client.list_device_owners(ctx, &device.id, query),
                    |device, owner| DeviceOwner {
                        device_id: device.id.clone(),
                        owner,
                    },
                ),
            ],
        )
    }

    fn groups(self) -> Vec<ItemStream<TaggedItem>> {
        self.fan_out(
            EntityKind::Group,
            || self.client.list_groups(self.ctx, &self.queries.get(EntityKind::Group)),
            [
                self.output(EntityKind::Group),
                self.dependent(
                    EntityKind::GroupMember,
                    "group_members",
                    |client, ctx, group: &Group, query| client.list_group_members(ctx, &group.id, query),
                    |group, member| GroupMember {
                        group_id: group.id.clone(),
                        member,
                    },
                ),
                self.dependent(
                    EntityKind::GroupOwner,
                    "group_owners",
                    |client, ctx, group: &Group, query| client.list_group_owners(ctx, &group.id, query),
                    |group, owner| GroupOwner {
                        group_id: group.id.clone(),
                        owner,
                    },
                ),
            ],
        )
    }

    fn service_principals(self) -> Vec<ItemStream<TaggedItem>> {
        self.fan_out(
            EntityKind::ServicePrincipal,
            || {
                self.client
                    .list_service_principals(self.ctx, &self.queries.get(EntityKind::ServicePrincipal))
            },
            [
                self.output(EntityKind::ServicePrincipal),
                self.dependent(
                    EntityKind::ServicePrincipalOwner,
                    "service_principal_owners",
                    |client, ctx, sp: &ServicePrincipal, query| client.list_service_principal_owners(ctx, &sp.id, query),
                    |sp, owner| ServicePrincipalOwner {
                        service_principal_id: sp.id.clone(),
                        owner,
                    },
                ),
            ],
        )
    }

    fn roles(self) -> Vec<ItemStream<TaggedItem>> {
        self.fan_out(
            EntityKind::Role,
            || self.client.list_roles(self.ctx, &self.queries.get(EntityKind::Role)),
            [
                self.output(EntityKind::Role),
                self.dependent(
                    EntityKind::RoleAssignment,
                    "role_assignments",
                    |client, ctx, role: &Role, query| client.list_role_assignments(ctx, &role.id, query),
                    |_, assignment| assignment,
                ),
            ],
        )
    }

    fn tenants(self) -> Vec<ItemStream<TaggedItem>> {
        self.fan_out(
            EntityKind::Tenant,
            || self.client.list_tenants(self.ctx, &self.queries.get(EntityKind::Tenant)),
            [self.output(EntityKind::Tenant)],
        )
    }

    fn users(self) -> Vec<ItemStream<TaggedItem>> {
        self.fan_out(
            EntityKind::User,
            || self.client.list_users(self.ctx, &self.queries.get(EntityKind::User)),
            [self.output(EntityKind::User)],
        )
    }

    fn subscriptions(self) -> Vec<ItemStream<TaggedItem>> {
        self.fan_out(
            EntityKind::Subscription,
            || {
                self.client
                    .list_subscriptions(self.ctx, &self.queries.get(EntityKind::Subscription))
            },
            [self.output(EntityKind::Subscription), self.virtual_machines()],
        )
    }

    fn virtual_machines(self) -> Option<Branch<'a, Subscription>> {
        if !self.plan.requires(EntityKind::VirtualMachine) {
            return None;
        }
        let client = self.client.clone();
        let query = self.queries.get(EntityKind::VirtualMachine);
        let branch: Branch<'a, Subscription> = Box::new(move |subscriptions, parent_errors| {
            let machines = dependents(
                self.ctx,
                "virtual_machines",
                subscriptions,
                parent_errors,
                move |ctx, subscription: &Subscription| {
                    client.list_virtual_machines(ctx, &subscription.subscription_id, &query)
                },
                |subscription, virtual_machine| SubscriptionVirtualMachine {
                    subscription_id: subscription.subscription_id.clone(),
                    virtual_machine,
                },
            );
            self.fan_out(
                EntityKind::VirtualMachine,
                move || machines,
                [self.output(EntityKind::VirtualMachine), self.vm_role_assignments()],
            )
        });
        Some(branch)
    }

    fn vm_role_assignments(self) -> Option<Branch<'a, SubscriptionVirtualMachine>> {
        if !self.plan.requires(EntityKind::VirtualMachineRoleAssignment) {
            return None;
        }
        let client = self.client.clone();
        let query = self.queries.get(EntityKind::VirtualMachineRoleAssignment);
        let branch: Branch<'a, SubscriptionVirtualMachine> = Box::new(move |machines, parent_errors| {
            let assignments = dependents(
                self.ctx,
                "vm_role_assignments",
                machines,
                parent_errors,
                move |ctx, machine: &SubscriptionVirtualMachine| {
                    client.list_role_assignments_for_resource(ctx, &machine.virtual_machine.id, &query)
                },
                |machine, role_assignment| VirtualMachineRoleAssignment {
                    virtual_machine_id: machine.virtual_machine.id.clone(),
                    role_assignment,
                },
            );
            self.fan_out(
                EntityKind::VirtualMachineRoleAssignment,
                move || assignments,
                [
                    self.output(EntityKind::VirtualMachineRoleAssignment),
                    self.vm_contributors(),
                ],
            )
        });
        Some(branch)
    }

    fn vm_contributors(self) -> Option<Branch<'a, VirtualMachineRoleAssignment>> {
        if !self.plan.contains(EntityKind::VirtualMachineContributor) {
            return None;
        }
        let branch: Branch<'a, VirtualMachineRoleAssignment> = Box::new(move |assignments, parent_errors| {
            let contributors = filter_map_with(
                self.ctx,
                "vm_contributors",
                assignments,
                parent_errors,
                VirtualMachineContributor::from_assignment,
            );
            vec![tag(self.ctx, contributors)]
        });
        Some(branch)
    }
}
