use anyhow::Context;
use clap::Parser;
use custom_inventory::gather::GATHERER_NAME;
use custom_inventory::{registered_core_plugins, Config, InventoryPlugin, Policy, PluginRegistry};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Gather custom inventory fragments and print them as JSON.
#[derive(Parser, Debug)]
#[command(name = "custom-inventory", version, about)]
struct Args {
    /// Folder containing custom inventory *.json files
    #[arg(short, long)]
    location: Option<String>,

    /// Inventory policy document to read gatherer configuration from
    #[arg(short, long)]
    policy: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut policy = match &args.policy {
        Some(path) => Policy::load(path)
            .with_context(|| format!("loading policy {}", path.display()))?,
        None => Policy::default(),
    };
    if let Some(location) = args.location {
        policy
            .inventory_policy
            .insert(GATHERER_NAME.to_string(), Config::with_location(location));
    }

    let inventory = Arc::new(InventoryPlugin::with_custom_gatherer(policy));
    let registry = registered_core_plugins(|| PluginRegistry::new().register(inventory.clone()));
    info!(plugins = ?registry.names(), "Core plugins registered");

    let items = inventory.collect().await?;
    let json = if args.pretty {
        serde_json::to_string_pretty(&items)?
    } else {
        serde_json::to_string(&items)?
    };
    println!("{}", json);
    Ok(())
}
