use azflow::collect::CollectionPlan;
use azflow::core::EntityKind;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Collects Entra ID and Azure Resource Manager objects as JSON.
#[derive(Debug, Parser)]
#[command(name = "azflow", version)]
pub struct Cli {
    /// TOML configuration file.
    #[arg(long, short = 'c', global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Bearer token for Graph and Resource Manager requests.
    #[arg(long, env = "AZFLOW_JWT", global = true, hide_env_values = true)]
    pub jwt: Option<String>,

    /// Tenant being collected; overrides the config file.
    #[arg(long, short = 't', global = true)]
    pub tenant: Option<String>,

    /// Write output to FILE instead of stdout.
    #[arg(long, short = 'o', global = true, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// More logging; repeat for more detail.
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Log as JSON lines.
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Lists objects of the given target.
    List {
        /// What to collect.
        #[arg(value_enum, default_value_t = Target::All)]
        target: Target,
    },
}

/// A named set of entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Target {
    /// Every Entra ID object.
    AzAd,
    /// Every Resource Manager object.
    AzRm,
    /// Everything.
    All,
    /// Principals with Contributor on a virtual machine.
    VirtualMachineContributors,
    /// Application registrations.
    Apps,
    /// Application owners.
    AppOwners,
    /// Devices.
    Devices,
    /// Device owners.
    DeviceOwners,
    /// Groups.
    Groups,
    /// Group members.
    GroupMembers,
    /// Group owners.
    GroupOwners,
    /// Directory roles.
    Roles,
    /// Directory role assignments.
    RoleAssignments,
    /// Service principals.
    ServicePrincipals,
    /// Service principal owners.
    ServicePrincipalOwners,
    /// Tenants.
    Tenants,
    /// Users.
    Users,
    /// Subscriptions.
    Subscriptions,
    /// Virtual machines.
    VirtualMachines,
    /// Role assignments on virtual machines.
    VirtualMachineRoleAssignments,
}

impl Target {
    /// Returns the collection plan for this target.
    pub fn plan(self) -> CollectionPlan {
        let single = |kind| CollectionPlan::from_kinds([kind]);
        match self {
            Self::AzAd => CollectionPlan::azure_ad(),
            Self::AzRm => CollectionPlan::azure_rm(),
            Self::All => CollectionPlan::all(),
            Self::VirtualMachineContributors => CollectionPlan::vm_contributors(),
            Self::Apps => single(EntityKind::App),
            Self::AppOwners => single(EntityKind::AppOwner),
            Self::Devices => single(EntityKind::Device),
            Self::DeviceOwners => single(EntityKind::DeviceOwner),
            Self::Groups => single(EntityKind::Group),
            Self::GroupMembers => single(EntityKind::GroupMember),
            Self::GroupOwners => single(EntityKind::GroupOwner),
            Self::Roles => single(EntityKind::Role),
            Self::RoleAssignments => single(EntityKind::RoleAssignment),
            Self::ServicePrincipals => single(EntityKind::ServicePrincipal),
            Self::ServicePrincipalOwners => single(EntityKind::ServicePrincipalOwner),
            Self::Tenants => single(EntityKind::Tenant),
            Self::Users => single(EntityKind::User),
            Self::Subscriptions => single(EntityKind::Subscription),
            Self::VirtualMachines => single(EntityKind::VirtualMachine),
            Self::VirtualMachineRoleAssignments => single(EntityKind::VirtualMachineRoleAssignment),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_list_target() {
        let cli = Cli::try_parse_from(["azflow", "list", "virtual-machine-contributors", "-vv", "--jwt", "t"]).unwrap();
        let Command::List { target } = cli.command;
        assert_eq!(target, Target::VirtualMachineContributors);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.jwt.as_deref(), Some("t"));
    }

    #[test]
    fn test_target_names() {
        for (name, target) in [("az-ad", Target::AzAd), ("az-rm", Target::AzRm), ("users", Target::Users)] {
            let cli = Cli::try_parse_from(["azflow", "list", name]).unwrap();
            let Command::List { target: parsed } = cli.command;
            assert_eq!(parsed, target);
        }
        assert!(Cli::try_parse_from(["azflow", "list", "everything"]).is_err());
    }

    #[test]
    fn test_single_kind_plans() {
        let plan = Target::GroupMembers.plan();
        assert_eq!(plan.kinds().collect::<Vec<_>>(), vec![EntityKind::GroupMember]);
        assert_eq!(Target::AzAd.plan(), CollectionPlan::azure_ad());
    }
}
