//! Health check command - probes `/health` of a running PhoneBook server.

use std::time::Duration;

use serde_json::Value;

use crate::cli::HealthArgs;
use crate::output::{OutputFormat, print_json};

/// Run the health check command, exiting with status 1 when unhealthy.
pub async fn run(args: &HealthArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let url = health_url(&args.url);
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(args.timeout))
        .build()?;

    match probe(&client, &url).await {
        Ok(body) => {
            match format {
                OutputFormat::Human => {
                    let backend = body["backend"].as_str().unwrap_or("unknown");
                    println!("healthy ({backend})");
                }
                OutputFormat::Json => print_json(&body)?,
            }
            Ok(())
        }
        Err(reason) => {
            eprintln!("unhealthy: {reason}");
            std::process::exit(1);
        }
    }
}

/// The health endpoint under a base URL; a URL already ending in `/health` is kept.
fn health_url(base: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.ends_with("/health") {
        base.to_string()
    } else {
        format!("{base}/health")
    }
}

async fn probe(client: &reqwest::Client, url: &str) -> Result<Value, String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| format!("failed to connect to {url}: {e}"))?;

    if !response.status().is_success() {
        return Err(format!("server returned HTTP status {}", response.status()));
    }

    let body: Value = response
        .json()
        .await
        .map_err(|e| format!("unreadable response from {url}: {e}"))?;
    match body["status"].as_str() {
        Some("healthy") => Ok(body),
        other => Err(format!(
            "server returned status {}",
            other.unwrap_or("<missing>")
        )),
    }
}
