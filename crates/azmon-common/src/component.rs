//! Collector components and their failure codes
//!
//! Every collector reports an unrecoverable failure by printing a fixed
//! negative integer. Codes are part of the contract with the monitoring agent
//! templates and must never be renumbered.

use clap::ValueEnum;
use std::fmt;

/// A resource-type collector or a shared subsystem with its own failure code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum Component {
    Mariadb,
    Mysql,
    Wvd,
    SqlManagedInstances,
    SiteToSiteVpn,
    ApplicationGateway,
    StorageAccount,
    ExpressRoute,
    ContainerInstance,
    SqlDatabase,
    Cdn,
    Aks,
    Vmss,
    Traffic,
    NatGateway,
    LoadBalancer,
    ManagedDisks,
    FileShare,
    VirtualNetwork,
    Dns,
    Firewall,
    CacheRedis,
    PostgresqlDatabase,
    ServicePlan,
    Webapp,
    DedicatedSqlPool,
    CosmosDb,
    Frontdoors,
    ContainerRegistry,
    KeyVault,
    AutomationAccount,
    Bastion,
    LogicApp,
    VirtualNetworkGateway,
    /// Credential acquisition (not selectable as a collector)
    #[value(skip)]
    AzureClient,
    /// Dimensional discovery engine (not selectable as a collector)
    #[value(skip)]
    Discovery,
}

impl Component {
    /// Code printed on stdout when this component fails
    pub fn code(self) -> i32 {
        match self {
            Component::Mariadb => -1,
            Component::Mysql => -2,
            Component::Wvd => -3,
            Component::SqlManagedInstances => -4,
            Component::SiteToSiteVpn => -5,
            Component::ApplicationGateway => -6,
            Component::StorageAccount => -7,
            Component::ExpressRoute => -8,
            Component::ContainerInstance => -9,
            Component::SqlDatabase => -10,
            Component::Cdn => -11,
            Component::Aks => -12,
            Component::Vmss => -13,
            Component::Traffic => -14,
            Component::NatGateway => -15,
            Component::LoadBalancer => -16,
            Component::ManagedDisks => -17,
            Component::FileShare => -18,
            Component::VirtualNetwork => -19,
            Component::Dns => -20,
            Component::Firewall => -21,
            Component::CacheRedis => -22,
            Component::PostgresqlDatabase => -23,
            Component::ServicePlan => -24,
            Component::Webapp => -25,
            Component::DedicatedSqlPool => -26,
            Component::CosmosDb => -27,
            Component::Frontdoors => -28,
            Component::ContainerRegistry => -29,
            Component::KeyVault => -30,
            Component::AutomationAccount => -31,
            Component::Bastion => -32,
            Component::LogicApp => -33,
            Component::VirtualNetworkGateway => -34,
            Component::AzureClient => -101,
            Component::Discovery => -102,
        }
    }

    /// Provider resource types scanned when resolving a tagged resource.
    ///
    /// Empty for the shared subsystems.
    pub fn resource_types(self) -> &'static [&'static str] {
        match self {
            Component::Mariadb => &["Microsoft.DBforMariaDB/servers"],
            Component::Mysql => &[
                "Microsoft.DBforMySQL/servers",
                "Microsoft.DBforMySQL/flexibleServers",
            ],
            Component::Wvd => &["Microsoft.DesktopVirtualization/hostPools"],
            Component::SqlManagedInstances => &["Microsoft.Sql/managedInstances"],
            Component::SiteToSiteVpn => &["Microsoft.Network/connections"],
            Component::ApplicationGateway => &["Microsoft.Network/applicationGateways"],
            Component::StorageAccount | Component::FileShare => {
                &["Microsoft.Storage/storageAccounts"]
            }
            Component::ExpressRoute => &["Microsoft.Network/expressRouteCircuits"],
            Component::ContainerInstance => &["Microsoft.ContainerInstance/containerGroups"],
            Component::SqlDatabase | Component::DedicatedSqlPool => {
                &["Microsoft.Sql/servers/databases"]
            }
            Component::Cdn => &["Microsoft.Cdn/profiles"],
            Component::Aks => &["Microsoft.ContainerService/managedClusters"],
            Component::Vmss => &["Microsoft.Compute/virtualMachineScaleSets"],
            Component::Traffic => &["Microsoft.Network/trafficManagerProfiles"],
            Component::NatGateway => &["Microsoft.Network/natGateways"],
            Component::LoadBalancer => &["Microsoft.Network/loadBalancers"],
            Component::ManagedDisks => &["Microsoft.Compute/disks"],
            Component::VirtualNetwork => &["Microsoft.Network/virtualNetworks"],
            Component::Dns => &["Microsoft.Network/dnszones"],
            Component::Firewall => &["Microsoft.Network/azureFirewalls"],
            Component::CacheRedis => &["Microsoft.Cache/Redis", "Microsoft.Cache/RedisEnterprise"],
            Component::PostgresqlDatabase => &[
                "Microsoft.DBforPostgreSQL/servers",
                "Microsoft.DBforPostgreSQL/flexibleServers",
            ],
            Component::ServicePlan => &["Microsoft.Web/serverFarms"],
            Component::Webapp | Component::LogicApp => &["Microsoft.Web/sites"],
            Component::CosmosDb => &["Microsoft.DocumentDB/databaseAccounts"],
            Component::Frontdoors => &["Microsoft.Network/frontdoors"],
            Component::ContainerRegistry => &["Microsoft.ContainerRegistry/registries"],
            Component::KeyVault => &["Microsoft.KeyVault/vaults"],
            Component::AutomationAccount => &["Microsoft.Automation/automationAccounts"],
            Component::Bastion => &["Microsoft.Network/bastionHosts"],
            Component::VirtualNetworkGateway => &["Microsoft.Network/virtualNetworkGateways"],
            Component::AzureClient | Component::Discovery => &[],
        }
    }

    /// Whether samples default to the window starting at the previous midnight
    /// instead of the provider's interval-implied window.
    pub fn samples_since_previous_day(self) -> bool {
        matches!(
            self,
            Component::Bastion
                | Component::CacheRedis
                | Component::DedicatedSqlPool
                | Component::Dns
                | Component::Frontdoors
                | Component::KeyVault
                | Component::LogicApp
                | Component::VirtualNetworkGateway
                | Component::Webapp
        )
    }

    /// Provider metric name for a name given on the command line.
    ///
    /// Scale-set item keys cannot carry spaces, so their metric names are
    /// passed with `_` in place of ` ` (`Percentage_CPU`). Other collectors'
    /// metric names legitimately contain underscores (`cpu_percent`) and are
    /// used as given.
    pub fn metric_name(self, requested: &str) -> String {
        match self {
            Component::Vmss => requested.replace('_', " "),
            _ => requested.to_string(),
        }
    }

    /// Kebab-case name, as accepted on the command line
    pub fn name(self) -> &'static str {
        match self {
            Component::Mariadb => "mariadb",
            Component::Mysql => "mysql",
            Component::Wvd => "wvd",
            Component::SqlManagedInstances => "sql-managed-instances",
            Component::SiteToSiteVpn => "site-to-site-vpn",
            Component::ApplicationGateway => "application-gateway",
            Component::StorageAccount => "storage-account",
            Component::ExpressRoute => "express-route",
            Component::ContainerInstance => "container-instance",
            Component::SqlDatabase => "sql-database",
            Component::Cdn => "cdn",
            Component::Aks => "aks",
            Component::Vmss => "vmss",
            Component::Traffic => "traffic",
            Component::NatGateway => "nat-gateway",
            Component::LoadBalancer => "load-balancer",
            Component::ManagedDisks => "managed-disks",
            Component::FileShare => "file-share",
            Component::VirtualNetwork => "virtual-network",
            Component::Dns => "dns",
            Component::Firewall => "firewall",
            Component::CacheRedis => "cache-redis",
            Component::PostgresqlDatabase => "postgresql-database",
            Component::ServicePlan => "service-plan",
            Component::Webapp => "webapp",
            Component::DedicatedSqlPool => "dedicated-sql-pool",
            Component::CosmosDb => "cosmos-db",
            Component::Frontdoors => "frontdoors",
            Component::ContainerRegistry => "container-registry",
            Component::KeyVault => "key-vault",
            Component::AutomationAccount => "automation-account",
            Component::Bastion => "bastion",
            Component::LogicApp => "logic-app",
            Component::VirtualNetworkGateway => "virtual-network-gateway",
            Component::AzureClient => "azure-client",
            Component::Discovery => "discovery",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_codes_are_unique() {
        let all = Component::value_variants()
            .iter()
            .copied()
            .chain([Component::AzureClient, Component::Discovery]);
        let mut seen = HashSet::new();
        for component in all {
            assert!(
                seen.insert(component.code()),
                "duplicate code for {component}"
            );
        }
        assert_eq!(seen.len(), 36);
    }

    #[test]
    fn test_fixed_codes() {
        assert_eq!(Component::Mariadb.code(), -1);
        assert_eq!(Component::CosmosDb.code(), -27);
        assert_eq!(Component::VirtualNetworkGateway.code(), -34);
        assert_eq!(Component::AzureClient.code(), -101);
        assert_eq!(Component::Discovery.code(), -102);
    }

    #[test]
    fn test_names() {
        assert_eq!(Component::CosmosDb.name(), "cosmos-db");
        assert_eq!(Component::SqlManagedInstances.name(), "sql-managed-instances");
        assert_eq!(Component::SiteToSiteVpn.name(), "site-to-site-vpn");
        assert_eq!(Component::Discovery.to_string(), "discovery");
        assert_eq!(
            Component::from_str("cache-redis", false).unwrap(),
            Component::CacheRedis
        );
    }

    #[test]
    fn test_subsystems_are_not_selectable() {
        assert!(!Component::value_variants().contains(&Component::Discovery));
        assert!(!Component::value_variants().contains(&Component::AzureClient));
        assert!(Component::Discovery.resource_types().is_empty());
    }

    #[test]
    fn test_names_match_command_line_values() {
        for component in Component::value_variants() {
            let value = component.to_possible_value().unwrap();
            assert_eq!(value.get_name(), component.name());
        }
    }

    #[test]
    fn test_every_collector_has_resource_types() {
        for component in Component::value_variants() {
            assert!(
                !component.resource_types().is_empty(),
                "{component} has no resource type"
            );
        }
    }

    #[test]
    fn test_scale_set_metric_names_use_spaces() {
        assert_eq!(Component::Vmss.metric_name("Percentage_CPU"), "Percentage CPU");
        assert_eq!(
            Component::Vmss.metric_name("Disk_Read_Bytes"),
            "Disk Read Bytes"
        );
        assert_eq!(Component::SqlDatabase.metric_name("cpu_percent"), "cpu_percent");
        assert_eq!(
            Component::Aks.metric_name("node_cpu_usage_percentage"),
            "node_cpu_usage_percentage"
        );
    }

    #[test]
    fn test_previous_day_window_components() {
        assert!(Component::Bastion.samples_since_previous_day());
        assert!(Component::Webapp.samples_since_previous_day());
        assert!(!Component::CosmosDb.samples_since_previous_day());
        assert!(!Component::StorageAccount.samples_since_previous_day());
    }
}
