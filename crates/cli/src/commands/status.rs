//! Server health command

use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use reqwest::StatusCode;
use predict_lib::{ComponentStatus, HealthResponse};
use tabled::{settings::Style, Table, Tabled};

use crate::client::ApiClient;
use crate::output::{color_status, print_info, print_json, OutputFormat};

#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "Component")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Message")]
    message: String,
    #[tabled(rename = "Last Check")]
    last_check: String,
}

fn status_name(status: ComponentStatus) -> &'static str {
    match status {
        ComponentStatus::Healthy => "healthy",
        ComponentStatus::Degraded => "degraded",
        ComponentStatus::Unhealthy => "unhealthy",
    }
}

fn format_timestamp(seconds: i64) -> String {
    DateTime::<Utc>::from_timestamp(seconds, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| seconds.to_string())
}

/// Show server health
pub async fn show_health(client: &ApiClient, format: OutputFormat) -> Result<()> {
    // an unhealthy server still reports its components, with a 503
    let health: HealthResponse = client
        .get_accepting("healthz", Some(StatusCode::SERVICE_UNAVAILABLE))
        .await?;

    match format {
        OutputFormat::Json => print_json(&health)?,
        OutputFormat::Table => {
            println!(
                "{} {}",
                "Server:".bold(),
                color_status(status_name(health.status))
            );

            if health.components.is_empty() {
                print_info("No engines registered");
                return Ok(());
            }

            let rows: Vec<ComponentRow> = health
                .components
                .iter()
                .map(|(name, component)| ComponentRow {
                    name: name.clone(),
                    status: color_status(status_name(component.status)),
                    message: component.message.clone().unwrap_or_default(),
                    last_check: format_timestamp(component.last_check_timestamp),
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
        }
    }

    if health.status == ComponentStatus::Unhealthy {
        anyhow::bail!("server is unhealthy");
    }
    Ok(())
}
