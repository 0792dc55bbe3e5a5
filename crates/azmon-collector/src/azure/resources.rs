//! Tag-based resource resolution
//!
//! Monitored resources are identified by a tag value rather than their full
//! resource id, which changes when a resource is moved or recreated. The
//! resolver lists the subscription's resources of each candidate type and
//! returns the id of the first one carrying the tag.

use super::FromAzureContext;
use super::context::{AzureContext, Page};
use crate::error::CollectorError;
use azmon_common::defaults::RESOURCES_API_VERSION;
use azmon_common::tags::has_tag;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, info};

#[derive(Debug, Clone, Deserialize)]
pub struct GenericResource {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub resource_type: String,
    #[serde(default)]
    pub tags: Option<HashMap<String, String>>,
}

/// First resource whose `tag_key` tag equals `tag_value`
pub fn find_tagged<'a>(
    resources: &'a [GenericResource],
    tag_key: &str,
    tag_value: &str,
) -> Option<&'a GenericResource> {
    resources.iter().find(|r| {
        r.tags
            .as_ref()
            .is_some_and(|tags| has_tag(tags, tag_key, tag_value))
    })
}

/// Append a child path to a resource id
pub fn with_sub_resource(resource_id: &str, sub_resource: Option<&str>) -> String {
    match sub_resource.map(|s| s.trim_matches('/')).filter(|s| !s.is_empty()) {
        Some(sub) => format!("{}/{sub}", resource_id.trim_end_matches('/')),
        None => resource_id.to_string(),
    }
}

/// Resolves tag values to resource ids within one subscription
#[derive(Debug, Clone)]
pub struct ResourceResolver {
    context: AzureContext,
}

impl FromAzureContext for ResourceResolver {
    fn from_context(ctx: &AzureContext) -> Self {
        Self {
            context: ctx.clone(),
        }
    }
}

impl ResourceResolver {
    /// Scan `resource_types` in order; the first tagged resource wins.
    pub async fn resolve(
        &self,
        tag_key: &str,
        tag_value: &str,
        resource_types: &[&str],
    ) -> Result<String, CollectorError> {
        for resource_type in resource_types {
            if let Some(id) = self.scan_type(resource_type, tag_key, tag_value).await? {
                info!(resource_id = %id, "Resolved resource");
                return Ok(id);
            }
        }
        Err(CollectorError::ResourceNotFound {
            tag_key: tag_key.to_string(),
            tag_value: tag_value.to_string(),
            resource_types: resource_types.join(", "),
        })
    }

    /// Walk every page of one resource type, stopping at the first match
    async fn scan_type(
        &self,
        resource_type: &str,
        tag_key: &str,
        tag_value: &str,
    ) -> anyhow::Result<Option<String>> {
        let first_url = self.context.url(&format!(
            "/subscriptions/{}/resources",
            self.context.subscription_id()
        ));
        let mut page: Page<GenericResource> = self
            .context
            .get_json(
                &first_url,
                &[
                    ("$filter", format!("resourceType eq '{resource_type}'")),
                    ("api-version", RESOURCES_API_VERSION.to_string()),
                ],
            )
            .await?;

        loop {
            debug!(resource_type, count = page.value.len(), "Scanning resources");
            if let Some(found) = find_tagged(&page.value, tag_key, tag_value) {
                return Ok(Some(found.id.clone()));
            }
            match page.next_link.take() {
                // nextLink carries its own query string
                Some(next) => page = self.context.get_json(&next, &[]).await?,
                None => return Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::azure::{AccessToken, context::build_http_client};
    use azmon_test_utils::ArmStub;
    use std::time::Duration;

    const PAGE: &str = r#"{
        "value": [
            {"id": "/subscriptions/s/resourceGroups/g/providers/Microsoft.KeyVault/vaults/kv-untagged",
             "name": "kv-untagged", "type": "Microsoft.KeyVault/vaults"},
            {"id": "/subscriptions/s/resourceGroups/g/providers/Microsoft.KeyVault/vaults/kv-other",
             "name": "kv-other", "type": "Microsoft.KeyVault/vaults", "tags": {"sys_id": "host-02"}},
            {"id": "/subscriptions/s/resourceGroups/g/providers/Microsoft.KeyVault/vaults/kv-a",
             "name": "kv-a", "type": "Microsoft.KeyVault/vaults", "tags": {"SYS_ID": "host-01"}},
            {"id": "/subscriptions/s/resourceGroups/g/providers/Microsoft.KeyVault/vaults/kv-b",
             "name": "kv-b", "type": "Microsoft.KeyVault/vaults", "tags": {"sys_id": "host-01"}}
        ],
        "nextLink": "https://management.azure.com/subscriptions/s/resources?%24skiptoken=abc"
    }"#;

    fn page() -> Page<GenericResource> {
        serde_json::from_str(PAGE).unwrap()
    }

    #[test]
    fn test_parses_page_with_next_link() {
        let page = page();
        assert_eq!(page.value.len(), 4);
        assert!(page.value[0].tags.is_none());
        assert!(page.next_link.as_deref().is_some_and(|l| l.contains("skiptoken")));
    }

    #[test]
    fn test_first_tagged_resource_wins() {
        let page = page();
        let found = find_tagged(&page.value, "sys_id", "host-01").unwrap();
        assert_eq!(found.name, "kv-a");
    }

    #[test]
    fn test_no_tagged_resource() {
        let page = page();
        assert!(find_tagged(&page.value, "sys_id", "host-99").is_none());
        assert!(find_tagged(&page.value, "owner", "host-01").is_none());
    }

    #[test]
    fn test_sub_resource_is_appended() {
        let id = "/subscriptions/s/resourceGroups/g/providers/Microsoft.Storage/storageAccounts/st";
        assert_eq!(
            with_sub_resource(id, Some("fileServices/default")),
            format!("{id}/fileServices/default")
        );
        assert_eq!(
            with_sub_resource(id, Some("/fileServices/default/")),
            format!("{id}/fileServices/default")
        );
        assert_eq!(with_sub_resource(id, None), id);
        assert_eq!(with_sub_resource(id, Some("")), id);
    }

    fn resolver(endpoint: &str) -> ResourceResolver {
        let http = build_http_client(Duration::from_secs(5)).unwrap();
        let ctx = AzureContext::new(http, AccessToken::new("t"), "sub-1").with_endpoint(endpoint);
        ResourceResolver::from_context(&ctx)
    }

    #[tokio::test]
    async fn test_resolve_follows_pages_and_types() {
        let stub = ArmStub::new()
            .respond(
                "/subscriptions/sub-1/resources",
                r#"{"value":[{"id":"/x/untagged","name":"untagged"}],
                    "nextLink":"{endpoint}/subscriptions/sub-1/resources-page-2"}"#,
            )
            .respond(
                "/subscriptions/sub-1/resources-page-2",
                r#"{"value":[{"id":"/x/tagged","name":"tagged","tags":{"Sys_Id":"host-01"}}]}"#,
            )
            .start()
            .await
            .unwrap();

        let id = resolver(stub.endpoint())
            .resolve("sys_id", "host-01", &["Microsoft.Cache/Redis"])
            .await
            .unwrap();
        assert_eq!(id, "/x/tagged");

        let requests = stub.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].contains("resourceType+eq+%27Microsoft.Cache%2FRedis%27"));
        assert!(requests[0].contains("api-version=2021-04-01"));
        assert_eq!(requests[1], "/subscriptions/sub-1/resources-page-2");
    }

    #[tokio::test]
    async fn test_resolve_reports_missing_resource() {
        let stub = ArmStub::new()
            .respond("/subscriptions/sub-1/resources", r#"{"value":[]}"#)
            .start()
            .await
            .unwrap();

        let err = resolver(stub.endpoint())
            .resolve(
                "sys_id",
                "host-01",
                &["Microsoft.Cache/Redis", "Microsoft.Cache/RedisEnterprise"],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CollectorError::ResourceNotFound { .. }));
        // One listing per candidate type
        assert_eq!(stub.requests().len(), 2);
    }
}
