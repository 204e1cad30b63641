//! Clima CLI
//!
//! Command-line client for a running Clima server.

#![allow(clippy::print_stdout)]

use anyhow::bail;
use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_URL: &str = "http://localhost:8000";

/// Clima CLI
#[derive(Parser)]
#[command(name = "clima-cli")]
#[command(author, version, about = "Historical climate outlook client", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show server liveness and readiness
    Status {
        /// Server URL
        #[arg(short, long, env = "CLIMA_URL", default_value = DEFAULT_URL)]
        url: String,
    },

    /// Request the outlook for a coordinate and date-time
    ///
    /// Example: clima-cli predict --lat -23.5 --long -46.6 --date 2025-01-15T14:00:00
    Predict {
        /// Latitude in degrees (-90 to 90)
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// Longitude in degrees (-180 to 180)
        #[arg(long, allow_negative_numbers = true)]
        long: f64,

        /// ISO-8601 date-time
        #[arg(long)]
        date: String,

        /// Server URL
        #[arg(short, long, env = "CLIMA_URL", default_value = DEFAULT_URL)]
        url: String,
    },
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Join a base URL and an absolute path without doubling the slash
fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}{path}", base_url.trim_end_matches('/'))
}

/// Prediction request body
fn prediction_body(lat: f64, long: f64, date: &str) -> Value {
    json!({ "lat": lat, "long": long, "date": date })
}

/// Send a request and decode the JSON body, keeping error bodies readable
async fn fetch_json(request: reqwest::RequestBuilder) -> anyhow::Result<(bool, Value)> {
    let response = request.send().await?;
    let ok = response.status().is_success();
    debug!(status = %response.status(), "Response received");
    let body = response.json::<Value>().await?;
    Ok((ok, body))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(log_filter_from_verbosity(
            cli.verbose,
        )))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let client = reqwest::Client::new();

    match cli.command {
        Commands::Status { url } => {
            let (_, health) = fetch_json(client.get(endpoint_url(&url, "/health"))).await?;
            let (ready, readiness) = fetch_json(client.get(endpoint_url(&url, "/ready"))).await?;

            println!("Health:");
            println!("{}", serde_json::to_string_pretty(&health)?);
            println!("Readiness:");
            println!("{}", serde_json::to_string_pretty(&readiness)?);

            if !ready {
                bail!("server is not ready");
            }
        },

        Commands::Predict {
            lat,
            long,
            date,
            url,
        } => {
            let request = client
                .post(endpoint_url(&url, "/api/prediction"))
                .json(&prediction_body(lat, long, &date));
            let (ok, body) = fetch_json(request).await?;

            println!("{}", serde_json::to_string_pretty(&body)?);

            if !ok {
                let code = body.get("code").and_then(Value::as_str).unwrap_or("unknown");
                bail!("prediction failed ({code})");
            }
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn log_filter_verbosity() {
        assert_eq!(log_filter_from_verbosity(0), "warn");
        assert_eq!(log_filter_from_verbosity(1), "info");
        assert_eq!(log_filter_from_verbosity(2), "debug");
        assert_eq!(log_filter_from_verbosity(7), "trace");
    }

    #[test]
    fn endpoint_url_strips_trailing_slash() {
        assert_eq!(
            endpoint_url("http://localhost:8000/", "/api/prediction"),
            "http://localhost:8000/api/prediction"
        );
        assert_eq!(
            endpoint_url("http://api:8080", "/ready"),
            "http://api:8080/ready"
        );
    }

    #[test]
    fn predict_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "clima-cli",
            "predict",
            "--lat",
            "-23.5",
            "--long",
            "-46.6",
            "--date",
            "2025-01-15T14:00:00",
        ])
        .unwrap();

        match cli.command {
            Commands::Predict { lat, long, date, .. } => {
                assert!((lat - -23.5).abs() < f64::EPSILON);
                assert!((long - -46.6).abs() < f64::EPSILON);
                assert_eq!(date, "2025-01-15T14:00:00");
            },
            Commands::Status { .. } => panic!("expected predict"),
        }
    }

    #[test]
    fn prediction_body_uses_api_field_names() {
        let body = prediction_body(-23.5, -46.6, "2025-01-15T14:00:00");
        assert_eq!(body["lat"], -23.5);
        assert_eq!(body["long"], -46.6);
        assert_eq!(body["date"], "2025-01-15T14:00:00");
    }
}
