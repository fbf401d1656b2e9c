//! Budget Planner: campaign budget sizing and phased allocation.
//!
//! `serve` runs the REST API; `calculate` prints a single plan as JSON.

use campaign_api::ApiServer;
use campaign_core::config::AppConfig;
use campaign_core::CampaignParameters;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "budget-planner")]
#[command(about = "Campaign budget sizing and phased daily allocation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the REST API server
    Serve {
        /// Node identifier (overrides config)
        #[arg(long, env = "CAMPAIGN_PLANNER__NODE_ID")]
        node_id: Option<String>,

        /// HTTP port (overrides config)
        #[arg(long, env = "CAMPAIGN_PLANNER__API__HTTP_PORT")]
        http_port: Option<u16>,

        /// Prometheus exporter port (overrides config)
        #[arg(long, env = "CAMPAIGN_PLANNER__METRICS__PORT")]
        metrics_port: Option<u16>,
    },

    /// Compute one plan and print it as JSON
    Calculate {
        /// First campaign day (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,

        /// Last campaign day, inclusive (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,

        /// Revenue target
        #[arg(long)]
        revenue: Decimal,

        /// Average order value
        #[arg(long)]
        aov: Decimal,

        /// Conversion rate in percent, e.g. 2.5
        #[arg(long)]
        conversion_rate: Decimal,

        /// Cost per click
        #[arg(long)]
        cpc: Decimal,

        /// Print aggregate sizing only (works for any campaign length)
        #[arg(long, default_value_t = false)]
        estimate: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "budget_planner=info,campaign_planner=info,campaign_api=info,tower_http=info"
                    .into()
            }),
        )
        .json()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            node_id,
            http_port,
            metrics_port,
        } => serve(node_id, http_port, metrics_port).await,
        Commands::Calculate {
            start,
            end,
            revenue,
            aov,
            conversion_rate,
            cpc,
            estimate,
        } => {
            let params = CampaignParameters {
                start_date: start,
                end_date: end,
                target_revenue: revenue,
                target_aov: aov,
                target_conversion_rate_pct: conversion_rate,
                cost_per_click: cpc,
            };
            let output = if estimate {
                serde_json::to_string_pretty(&campaign_planner::estimate(params)?)?
            } else {
                serde_json::to_string_pretty(&campaign_planner::plan(params)?)?
            };
            println!("{output}");
            Ok(())
        }
    }
}

async fn serve(
    node_id: Option<String>,
    http_port: Option<u16>,
    metrics_port: Option<u16>,
) -> anyhow::Result<()> {
    info!("Budget planner starting up");

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    if let Some(node_id) = node_id {
        config.node_id = node_id;
    }
    if let Some(port) = http_port {
        config.api.http_port = port;
    }
    if let Some(port) = metrics_port {
        config.metrics.port = port;
    }

    info!(
        node_id = %config.node_id,
        http_port = config.api.http_port,
        metrics_port = config.metrics.port,
        "Configuration loaded"
    );

    let api_server = ApiServer::new(config);

    if let Err(e) = api_server.start_metrics() {
        error!(error = %e, "Failed to start metrics exporter");
    }

    info!("Budget planner is ready to serve traffic");

    // Blocks until shutdown
    api_server.start_http().await?;

    Ok(())
}
