use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use authop_config::sources::API_SERVER_RESOURCE;
use authop_config::{ApiServer, InMemoryLister, ObservedConfig, TracingRecorder};
use authop_deployment::{NoIdentityProviders, OperatorLogLevel, ProxyStatus, SynthesisInput};
use authop_operator::config::loader::load_settings_with_default_path;
use authop_operator::{ReconcilePass, observability};
use clap::Parser;
use k8s_openapi::api::apps::v1::Deployment;
use serde_json::json;

#[derive(Debug, Parser)]
#[command(name = "authop-render")]
#[command(about = "Run one observe-and-synthesize pass for the OAuth server and print the result")]
#[command(version)]
struct Cli {
    /// Operator settings file (defaults to authop.toml when present)
    #[arg(short, long, env = "AUTHOP_CONFIG")]
    config: Option<PathBuf>,

    /// Deployment template (JSON)
    #[arg(short, long)]
    template: PathBuf,

    /// Persisted operator observed config (JSON); empty when omitted
    #[arg(long)]
    observed_config: Option<PathBuf>,

    /// Cluster APIServer configuration (JSON); treated as missing when omitted
    #[arg(long)]
    api_server: Option<PathBuf>,

    /// Resource version that rolls the pods when it changes (repeatable)
    #[arg(long = "tracked-version")]
    tracked_versions: Vec<String>,

    /// The bootstrap user still exists
    #[arg(long)]
    bootstrap_user_exists: bool,

    /// Operator log level: Normal, Debug, Trace or TraceAll
    #[arg(long, default_value = "Normal")]
    log_level: OperatorLogLevel,

    #[arg(long, default_value = "")]
    no_proxy: String,

    #[arg(long, default_value = "")]
    http_proxy: String,

    #[arg(long, default_value = "")]
    https_proxy: String,
}

fn main() {
    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = load_settings_with_default_path(cli.config.as_deref())
        .context("loading operator settings")?;
    observability::init_tracing(&settings.logging);
    observability::apply_operator_log_level(cli.log_level);

    let template: Deployment = read_json(&cli.template).context("reading deployment template")?;
    let observed_config = match &cli.observed_config {
        Some(path) => ObservedConfig::from_raw(&read(path)?)
            .with_context(|| format!("decoding {}", path.display()))?,
        None => ObservedConfig::new(),
    };

    let mut api_servers = InMemoryLister::new(API_SERVER_RESOURCE);
    if let Some(path) = &cli.api_server {
        let api_server: ApiServer = read_json(path).context("reading APIServer configuration")?;
        let name = if api_server.metadata.name.is_empty() {
            settings.observer.resource_name.clone()
        } else {
            api_server.metadata.name.clone()
        };
        api_servers.insert(name, api_server);
    }

    let pass = ReconcilePass::from_settings(
        &settings,
        api_servers,
        NoIdentityProviders,
        Arc::new(TracingRecorder::new("authop-render")),
    );
    let input = SynthesisInput::new(observed_config)
        .with_tracked_versions(cli.tracked_versions)
        .with_bootstrap_user(cli.bootstrap_user_exists)
        .with_operator_log_level(cli.log_level)
        .with_proxy(ProxyStatus {
            no_proxy: cli.no_proxy,
            http_proxy: cli.http_proxy,
            https_proxy: cli.https_proxy,
        });
    let outcome = pass.run(template, input)?;

    let rendered = json!({
        "observedConfig": outcome.observed_config,
        "observedChanged": outcome.observed_changed,
        "deployment": outcome.deployment,
    });
    println!("{}", serde_json::to_string_pretty(&rendered)?);
    Ok(())
}

fn read(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("reading {}", path.display()))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    serde_json::from_slice(&read(path)?).with_context(|| format!("decoding {}", path.display()))
}
