//! Typed listing operations over Graph and Resource Manager.

use super::decode::decode;
use super::query::{QueryParams, GRAPH_PAGE_SIZE};
use super::rest::{PreparedRequest, RestClient};
#[cfg(feature = "http")]
use super::http::{HttpRestClient, TokenSource};
#[cfg(feature = "http")]
use crate::config::CollectorConfig;
use crate::context::RunContext;
use crate::errors::Result;
use crate::models::{
    Application, AzureRoleAssignment, Device, DirectoryObject, Group, Role, RoleAssignment, ServicePrincipal,
    Subscription, Tenant, User, VirtualMachine, COMPUTE_API_VERSION, GRAPH_API_VERSION,
    ROLE_ASSIGNMENTS_API_VERSION, SUBSCRIPTIONS_API_VERSION, TENANTS_API_VERSION,
};
use crate::pipeline::{paginate, ItemStream, Page, PageSource};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::Arc;

/// One listing endpoint read page by page.
///
/// The first page is requested with the caller's parameters and the
/// headers they call for. Continuation links already encode the query and
/// are followed verbatim without extra headers.
struct ListSource<T> {
    rest: Arc<dyn RestClient>,
    path: String,
    query: QueryParams,
    _item: PhantomData<fn() -> T>,
}

impl<T> ListSource<T> {
    fn new(rest: &Arc<dyn RestClient>, path: String, query: &QueryParams) -> Self {
        Self {
            rest: rest.clone(),
            path,
            query: query.clone(),
            _item: PhantomData,
        }
    }
}

#[async_trait]
impl<T> PageSource<T> for ListSource<T>
where
    T: DeserializeOwned + Send + 'static,
{
    async fn first_page(&self) -> Result<Page<T>> {
        let body = self
            .rest
            .get(&self.path, &self.query.as_map(), &self.query.headers())
            .await?;
        decode(&body)
    }

    async fn next_page(&self, cursor: &str) -> Result<Page<T>> {
        let body = self.rest.send(PreparedRequest::get(cursor)?).await?;
        decode(&body)
    }
}

/// Listing operations for every collected entity type.
///
/// Each operation returns a stream fed by its own paginated fetch stage.
#[derive(Clone)]
pub struct AzureClient {
    graph: Arc<dyn RestClient>,
    management: Arc<dyn RestClient>,
}

impl std::fmt::Debug for AzureClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureClient").finish_non_exhaustive()
    }
}

impl AzureClient {
    /// Creates a client over a Graph and a Resource Manager transport.
    #[must_use]
    pub fn new(graph: Arc<dyn RestClient>, management: Arc<dyn RestClient>) -> Self {
        Self { graph, management }
    }

    /// Creates HTTP transports for both endpoints from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if an endpoint URL is invalid or an HTTP client
    /// cannot be built.
    #[cfg(feature = "http")]
    pub fn from_config(config: &CollectorConfig, tokens: Arc<dyn TokenSource>) -> Result<Self> {
        let transport = |endpoint: &str| -> Result<Arc<dyn RestClient>> {
            let client: Arc<dyn RestClient> = Arc::new(
                HttpRestClient::new(endpoint, tokens.clone(), config.timeout(), &config.user_agent)?
                    .with_retry(config.retry.clone()),
            );
            Ok(client)
        };
        Ok(Self::new(
            transport(&config.graph_endpoint)?,
            transport(&config.management_endpoint)?,
        ))
    }

    fn graph_list<T>(&self, ctx: &RunContext, stage: &str, resource: &str, query: &QueryParams) -> ItemStream<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let mut query = query.clone();
        query.top.get_or_insert(GRAPH_PAGE_SIZE);
        let path = format!("/{GRAPH_API_VERSION}/{resource}");
        paginate(ctx, stage, ListSource::new(&self.graph, path, &query))
    }

    fn management_list<T>(
        &self,
        ctx: &RunContext,
        stage: &str,
        path: String,
        api_version: &str,
        query: &QueryParams,
    ) -> ItemStream<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let mut query = query.clone();
        if query.api_version.is_empty() {
            query.api_version = api_version.to_string();
        }
        paginate(ctx, stage, ListSource::new(&self.management, path, &query))
    }

    /// Lists users.
    pub fn list_users(&self, ctx: &RunContext, query: &QueryParams) -> ItemStream<User> {
        self.graph_list(ctx, "list_users", "users", query)
    }

    /// Lists groups.
    pub fn list_groups(&self, ctx: &RunContext, query: &QueryParams) -> ItemStream<Group> {
        self.graph_list(ctx, "list_groups", "groups", query)
    }

    /// Lists the owners of one group.
    pub fn list_group_owners(&self, ctx: &RunContext, group_id: &str, query: &QueryParams) -> ItemStream<DirectoryObject> {
        self.graph_list(ctx, "list_group_owners", &format!("groups/{group_id}/owners"), query)
    }

    /// Lists the members of one group.
    pub fn list_group_members(&self, ctx: &RunContext, group_id: &str, query: &QueryParams) -> ItemStream<DirectoryObject> {
        self.graph_list(ctx, "list_group_members", &format!("groups/{group_id}/members"), query)
    }

    /// Lists application registrations.
    pub fn list_apps(&self, ctx: &RunContext, query: &QueryParams) -> ItemStream<Application> {
        self.graph_list(ctx, "list_apps", "applications", query)
    }

    /// Lists the owners of one application registration.
    pub fn list_app_owners(&self, ctx: &RunContext, app_id: &str, query: &QueryParams) -> ItemStream<DirectoryObject> {
        self.graph_list(ctx, "list_app_owners", &format!("applications/{app_id}/owners"), query)
    }

    /// Lists devices.
    pub fn list_devices(&self, ctx: &RunContext, query: &QueryParams) -> ItemStream<Device> {
        self.graph_list(ctx, "list_devices", "devices", query)
    }

    /// Lists the registered owners of one device.
    pub fn list_device_owners(&self, ctx: &RunContext, device_id: &str, query: &QueryParams) -> ItemStream<DirectoryObject> {
        self.graph_list(ctx, "list_device_owners", &format!("devices/{device_id}/registeredOwners"), query)
    }

    /// Lists service principals.
    pub fn list_service_principals(&self, ctx: &RunContext, query: &QueryParams) -> ItemStream<ServicePrincipal> {
        self.graph_list(ctx, "list_service_principals", "servicePrincipals", query)
    }

    /// Lists the owners of one service principal.
    pub fn list_service_principal_owners(
        &self,
        ctx: &RunContext,
        service_principal_id: &str,
        query: &QueryParams,
    ) -> ItemStream<DirectoryObject> {
        self.graph_list(
            ctx,
            "list_service_principal_owners",
            &format!("servicePrincipals/{service_principal_id}/owners"),
            query,
        )
    }

    /// Lists directory role definitions.
    pub fn list_roles(&self, ctx: &RunContext, query: &QueryParams) -> ItemStream<Role> {
        self.graph_list(ctx, "list_roles", "roleManagement/directory/roleDefinitions", query)
    }

    /// Lists the assignments of one directory role.
    ///
    /// The role filter is combined with any filter already in `query`.
    pub fn list_role_assignments(&self, ctx: &RunContext, role_id: &str, query: &QueryParams) -> ItemStream<RoleAssignment> {
        let role_filter = format!("roleDefinitionId eq '{role_id}'");
        let filter = if query.filter.is_empty() {
            role_filter
        } else {
            format!("{role_filter} and ({})", query.filter)
        };
        let query = query.clone().with_filter(filter);
        self.graph_list(ctx, "list_role_assignments", "roleManagement/directory/roleAssignments", &query)
    }

    /// Lists the tenants visible to the caller.
    pub fn list_tenants(&self, ctx: &RunContext, query: &QueryParams) -> ItemStream<Tenant> {
        self.management_list(ctx, "list_tenants", "/tenants".to_string(), TENANTS_API_VERSION, query)
    }

    /// Lists the subscriptions visible to the caller.
    pub fn list_subscriptions(&self, ctx: &RunContext, query: &QueryParams) -> ItemStream<Subscription> {
        self.management_list(ctx, "list_subscriptions", "/subscriptions".to_string(), SUBSCRIPTIONS_API_VERSION, query)
    }

    /// Lists the virtual machines in one subscription.
    pub fn list_virtual_machines(
        &self,
        ctx: &RunContext,
        subscription_id: &str,
        query: &QueryParams,
    ) -> ItemStream<VirtualMachine> {
        let path = format!("/subscriptions/{subscription_id}/providers/Microsoft.Compute/virtualMachines");
        self.management_list(ctx, "list_virtual_machines", path, COMPUTE_API_VERSION, query)
    }

    /// Lists the RBAC assignments that apply to one resource.
    pub fn list_role_assignments_for_resource(
        &self,
        ctx: &RunContext,
        resource_id: &str,
        query: &QueryParams,
    ) -> ItemStream<AzureRoleAssignment> {
        let path = format!(
            "/{}/providers/Microsoft.Authorization/roleAssignments",
            resource_id.trim_start_matches('/')
        );
        self.management_list(
            ctx,
            "list_role_assignments_for_resource",
            path,
            ROLE_ASSIGNMENTS_API_VERSION,
            query,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockRestClient;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn body(value: &serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(value).unwrap()
    }

    async fn drain<T>(mut rx: ItemStream<T>) -> (Vec<T>, Vec<String>) {
        let (mut items, mut errors) = (Vec::new(), Vec::new());
        while let Some(item) = rx.recv().await {
            match item {
                Ok(v) => items.push(v),
                Err(e) => errors.push(e.to_string()),
            }
        }
        (items, errors)
    }

    fn unused() -> Arc<dyn RestClient> {
        Arc::new(MockRestClient::new())
    }

    #[tokio::test]
    async fn test_list_users_follows_next_link() {
        let mut graph = MockRestClient::new();
        graph
            .expect_get()
            .withf(|path, params, headers| {
                path == "/v1.0/users"
                    && params.get("$top").map(String::as_str) == Some("999")
                    && headers.is_empty()
            })
            .times(1)
            .returning(|_, _, _| {
                Ok(body(&json!({
                    "value": [{"id": "u1"}, {"id": "u2"}],
                    "@odata.nextLink": "https://graph.microsoft.com/v1.0/users?$skiptoken=x"
                })))
            });
        graph
            .expect_send()
            .withf(|request| request.url.query() == Some("$skiptoken=x"))
            .times(1)
            .returning(|_| Ok(body(&json!({"value": [{"id": "u3"}]}))));

        let client = AzureClient::new(Arc::new(graph), unused());
        let ctx = RunContext::new();
        let (users, errors) = drain(client.list_users(&ctx, &QueryParams::new())).await;

        let ids: Vec<_> = users.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["u1", "u2", "u3"]);
        assert!(errors.is_empty());
    }

    #[tokio::test]
    async fn test_consistency_header_only_on_advanced_first_page() {
        let mut graph = MockRestClient::new();
        graph
            .expect_get()
            .withf(|_, params, headers| {
                params.contains_key("$search")
                    && headers.get("ConsistencyLevel").map(String::as_str) == Some("eventual")
            })
            .times(1)
            .returning(|_, _, _| {
                Ok(body(&json!({"value": [{"id": "g1"}], "@odata.nextLink": "https://graph.microsoft.com/next"})))
            });
        graph
            .expect_send()
            .withf(|request| request.headers.is_empty() && request.url.path() == "/next")
            .times(1)
            .returning(|_| Ok(body(&json!({"value": []}))));

        let client = AzureClient::new(Arc::new(graph), unused());
        let ctx = RunContext::new();
        let query = QueryParams::new().with_search("\"displayName:admins\"");
        let (groups, _) = drain(client.list_groups(&ctx, &query)).await;
        assert_eq!(groups.len(), 1);
    }

    #[tokio::test]
    async fn test_role_assignments_filter_by_role() {
        let mut graph = MockRestClient::new();
        graph
            .expect_get()
            .withf(|path, params, _| {
                path == "/v1.0/roleManagement/directory/roleAssignments"
                    && params.get("$filter").map(String::as_str) == Some("roleDefinitionId eq 'r1'")
            })
            .times(1)
            .returning(|_, _, _| {
                Ok(body(&json!({"value": [{"id": "a1", "roleDefinitionId": "r1", "principalId": "p1"}]})))
            });

        let client = AzureClient::new(Arc::new(graph), unused());
        let ctx = RunContext::new();
        let (assignments, _) = drain(client.list_role_assignments(&ctx, "r1", &QueryParams::new())).await;
        assert_eq!(assignments[0].principal_id, "p1");
    }

    #[tokio::test]
    async fn test_resource_manager_listing_uses_api_version() {
        let mut management = MockRestClient::new();
        management
            .expect_get()
            .withf(|path, params, _| {
                path == "/subscriptions/s1/providers/Microsoft.Compute/virtualMachines"
                    && params.get("api-version").map(String::as_str) == Some(COMPUTE_API_VERSION)
                    && !params.contains_key("$top")
            })
            .times(1)
            .returning(|_, _, _| Ok(body(&json!({"value": [{"id": "/subscriptions/s1/vm1", "name": "vm1"}]}))));

        let client = AzureClient::new(unused(), Arc::new(management));
        let ctx = RunContext::new();
        let (vms, errors) = drain(client.list_virtual_machines(&ctx, "s1", &QueryParams::new())).await;
        assert_eq!(vms[0].name, "vm1");
        assert!(errors.is_empty());
    }

    #[tokio::test]
    async fn test_decode_failure_is_single_error() {
        let mut graph = MockRestClient::new();
        graph
            .expect_get()
            .times(1)
            .returning(|_, _, _| Ok(b"not json".to_vec()));

        let client = AzureClient::new(Arc::new(graph), unused());
        let ctx = RunContext::new();
        let (devices, errors) = drain(client.list_devices(&ctx, &QueryParams::new())).await;
        assert!(devices.is_empty());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Decode error"));
    }
}
