//! azmon: Azure Monitor collectors for Zabbix external checks
//!
//! Prints one metric sample or one low-level discovery document on stdout.
//! Failures are printed as a fixed negative code; details go to stderr.
//! Rejected arguments are failures too, once the collector they name is
//! known; otherwise clap reports them and exits with its usage status.

use azmon_collector::azure::{
    CredentialProvider, FromAzureContext, InventoryClient, MonitorClient,
};
use azmon_collector::config::{
    CollectorConfig, DiscoverConfig, SampleConfig, Target, component_from_args, parse_filter_pair,
};
use azmon_collector::{CollectorError, Inventory, InventoryKind, Report, collect};
use azmon_common::defaults::{
    CONF_DIR_ENV, DEFAULT_CONF_DIR, DEFAULT_TAG_KEY, DEFAULT_TIMEOUT_SECS,
};
use azmon_common::{Aggregation, Component, Interval, Timespan};
use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "azmon")]
#[command(about = "Azure Monitor metric sampling and discovery for Zabbix")]
#[command(version)]
struct Args {
    /// Directory holding azure_<client>.toml profiles
    #[arg(long, global = true, env = CONF_DIR_ENV, default_value = DEFAULT_CONF_DIR)]
    conf_dir: PathBuf,

    /// HTTP timeout in seconds
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Tag key identifying monitored resources
    #[arg(long, global = true, default_value = DEFAULT_TAG_KEY)]
    tag_key: String,

    #[command(subcommand)]
    command: Command,
}

/// Arguments selecting the monitored resource
#[derive(clap::Args, Debug)]
struct TargetArgs {
    /// Collector (resource type) to run as
    #[arg(long, value_enum)]
    component: Component,

    /// Tag value of the monitored resource
    #[arg(long)]
    sys_id: String,

    /// Client profile name (text before the first '.' is used)
    #[arg(long)]
    client_name: String,

    /// Full resource id, skipping tag resolution
    #[arg(long)]
    resource_id: Option<String>,

    /// Child path appended to the resource id (e.g. fileServices/default)
    #[arg(long)]
    sub_resource: Option<String>,
}

impl From<TargetArgs> for Target {
    fn from(args: TargetArgs) -> Self {
        Self {
            component: args.component,
            sys_id: args.sys_id,
            client_name: args.client_name,
            resource_id: args.resource_id,
            sub_resource: args.sub_resource,
        }
    }
}

/// Arguments for the sample command (extracted to reduce enum size)
#[derive(clap::Args, Debug)]
struct SampleArgs {
    #[command(flatten)]
    target: TargetArgs,

    /// Metric to sample
    #[arg(long)]
    metric_name: String,

    /// Aggregation to read from the latest data point
    #[arg(long, value_enum, ignore_case = true)]
    statistic: Aggregation,

    /// Time grain
    #[arg(long, value_enum, default_value_t = Interval::default())]
    interval: Interval,

    /// Explicit window as start/end (e.g. 2024-01-01T00:00:00Z/2024-01-02T00:00:00Z)
    #[arg(long)]
    timespan: Option<Timespan>,

    /// Dimension filter as Name=Value (repeatable)
    #[arg(long = "filter", value_parser = parse_filter_pair)]
    filters: Vec<(String, String)>,
}

#[derive(clap::Args, Debug)]
struct DiscoverArgs {
    #[command(flatten)]
    target: TargetArgs,

    /// Dimensions to enumerate, '+'-separated (e.g. ApiName+StatusCode)
    #[arg(long, default_value = "")]
    dimensions: String,

    /// Metric to probe (default: first metric supporting all dimensions)
    #[arg(long)]
    metric_name: Option<String>,
}

#[derive(clap::Args, Debug)]
struct InventoryArgs {
    #[command(flatten)]
    target: TargetArgs,

    /// Level to list: cluster or instance for vmss, cluster or node for aks
    #[arg(long, value_enum, ignore_case = true)]
    kind: Option<InventoryKind>,
}

#[derive(clap::Args, Debug)]
struct SessionHostArgs {
    /// Tag value of the host pool
    #[arg(long)]
    sys_id: String,

    /// Client profile name (text before the first '.' is used)
    #[arg(long)]
    client_name: String,

    /// Full host pool id, skipping tag resolution
    #[arg(long)]
    resource_id: Option<String>,

    /// Monitoring host alias; its second '.'-separated label names the session host
    #[arg(long)]
    zbx_hostname: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the latest value of a metric, rounded to an integer
    Sample(Box<SampleArgs>),

    /// Print every combination of dimension values as a discovery document
    Discover(DiscoverArgs),

    /// Print the file systems, instances or nodes of a resource as a discovery document
    Inventory(InventoryArgs),

    /// Print 1 if a virtual desktop session host is available, else 0
    SessionHost(SessionHostArgs),
}

impl Command {
    fn component(&self) -> Component {
        match self {
            Command::Sample(args) => args.target.component,
            Command::Discover(args) => args.target.component,
            Command::Inventory(args) => args.target.component,
            Command::SessionHost(_) => Component::Wvd,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // stdout carries the protocol output, so logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let argv: Vec<OsString> = std::env::args_os().collect();
    let args = match Args::try_parse_from(&argv) {
        Ok(args) => args,
        Err(e) => match argument_failure(&argv, &e) {
            Some(report) => {
                println!("{report}");
                return;
            }
            None => e.exit(),
        },
    };

    let component = args.command.component();
    let report = Report::from_outcome(component, run(args).await);
    println!("{report}");
}

/// Failure code for rejected arguments naming a known collector.
///
/// Help and version requests are left to clap.
fn argument_failure(argv: &[OsString], err: &clap::Error) -> Option<Report> {
    if !err.use_stderr() {
        return None;
    }
    let component = component_from_args(argv)?;
    let code = component.code();
    error!(component = %component, code, kind = ?err.kind(), "Invalid arguments: {err}");
    Some(Report::Failure(code))
}

async fn run(args: Args) -> Result<Report, CollectorError> {
    let config = CollectorConfig {
        conf_dir: args.conf_dir,
        timeout: Duration::from_secs(args.timeout),
        tag_key: args.tag_key,
    };

    let (target, action) = match args.command {
        Command::Sample(sample) => {
            let SampleArgs {
                target,
                metric_name,
                statistic,
                interval,
                timespan,
                filters,
            } = *sample;
            let config = SampleConfig {
                metric: metric_name,
                aggregation: statistic,
                interval,
                timespan,
                filters,
            };
            (Target::from(target), Action::Sample(config))
        }
        Command::Discover(discover) => (
            Target::from(discover.target),
            Action::Discover(DiscoverConfig {
                metric: discover.metric_name,
                dimensions: discover.dimensions,
            }),
        ),
        Command::Inventory(inventory) => {
            let selected = Inventory::select(inventory.target.component, inventory.kind)?;
            (Target::from(inventory.target), Action::Inventory(selected))
        }
        Command::SessionHost(host) => (
            Target {
                component: Component::Wvd,
                sys_id: host.sys_id,
                client_name: host.client_name,
                resource_id: host.resource_id,
                sub_resource: None,
            },
            Action::SessionHost(host.zbx_hostname),
        ),
    };

    info!(component = %target.component, sys_id = %target.sys_id, "Starting collector");
    let azure = CredentialProvider::new(&config)
        .authenticate(&target.client_name)
        .await?;
    let resource_id = collect::resolve_target(&azure, &config, &target).await?;

    match action {
        Action::Sample(sample) => {
            collect::sample(
                &MonitorClient::from_context(&azure),
                &resource_id,
                target.component,
                &sample,
                chrono::Utc::now(),
            )
            .await
        }
        Action::Discover(discover) => {
            collect::discover(&MonitorClient::from_context(&azure), &resource_id, &discover).await
        }
        Action::Inventory(inventory) => {
            collect::inventory(&InventoryClient::from_context(&azure), &resource_id, inventory)
                .await
        }
        Action::SessionHost(zbx_hostname) => {
            collect::session_host(
                &InventoryClient::from_context(&azure),
                &resource_id,
                &zbx_hostname,
            )
            .await
        }
    }
}

enum Action {
    Sample(SampleConfig),
    Discover(DiscoverConfig),
    Inventory(Inventory),
    SessionHost(String),
}
