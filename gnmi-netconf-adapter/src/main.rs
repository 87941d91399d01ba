//! gNMI server facade for a NETCONF device.
//!
//! Opens a NETCONF session to the configured device and serves the gNMI
//! Capabilities, Get and Set RPCs against it.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use gnmi_netconf_adapter::{config, model, server, Adapter, AdapterConfig, Model};

/// CLI arguments for the adapter.
#[derive(Parser, Debug)]
#[command(about = "gNMI server facade for a NETCONF device")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long, default_value = "adapter.json5")]
    config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let mut cfg = AdapterConfig::load_from_file(&args.config)?;
    if let Some(level) = args.log_level {
        cfg.logging.level = level;
    }
    config::init_tracing(&cfg.logging)?;

    // The schema tree is a construction-time input: the built-in model, or a
    // tree loaded from the configured JSON file.
    let schema = match &cfg.schema_file {
        Some(path) => model::load_schema(std::path::Path::new(path))?,
        None => model::junos_schema(),
    };
    let model = Arc::new(Model::new(model::junos_model_data(), schema));

    info!("connecting to NETCONF device at {}", cfg.device.address);
    let session = adapter_netconf::connect(
        &cfg.device.address,
        &cfg.device.username,
        &cfg.device.password,
    )
    .await?;

    let adapter = Adapter::new(model, Arc::new(session));

    // Run until the server exits
    server::serve(adapter, &cfg.server).await
}
