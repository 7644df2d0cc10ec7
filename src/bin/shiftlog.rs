//! shiftlog CLI: send one request through the orchestrator and print the
//! normalized result.

use clap::{Parser, Subcommand};
use serde_json::json;
use shiftlog_client::config::Config;
use shiftlog_client::model::{Method, Outcome, RequestDescriptor};
use shiftlog_client::orchestrator::{Orchestrator, OrchestratorConfig};
use shiftlog_client::telemetry::{TelemetryConfig, init_telemetry};
use shiftlog_client::transport::HttpTransport;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "shiftlog", about = "Talk to the shiftlog workforce API")]
struct Cli {
    /// TOML file with an [orchestrator] table overriding timing settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Send X-Sandbox-Mode: true
    #[arg(long, global = true)]
    sandbox: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Send an arbitrary request
    Request {
        /// GET, POST, PUT or DELETE
        method: Method,
        /// Path relative to the API base URL
        path: String,
        /// Query parameter as name=value (repeatable)
        #[arg(long = "query", short = 'q', value_parser = parse_pair)]
        query: Vec<(String, String)>,
        /// JSON request body
        #[arg(long)]
        body: Option<String>,
    },
    /// GET /ping
    Ping,
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env()?;

    let _guard = init_telemetry(TelemetryConfig {
        endpoint: config.otel_endpoint.clone(),
        service_name: "shiftlog".to_string(),
        log_level: config.log_level.clone(),
    })?;

    let timing = match &cli.config {
        Some(path) => OrchestratorConfig::load(path)?,
        None => config.orchestrator,
    };
    let transport = HttpTransport::new(&config.api_base_url)?;
    let orchestrator = Orchestrator::new(transport, timing);
    let session = config.session().sandbox(cli.sandbox || config.sandbox_mode);

    let descriptor = match cli.command {
        Command::Request {
            method,
            path,
            query,
            body,
        } => {
            let mut descriptor = RequestDescriptor::new(method, path);
            for (name, value) in query {
                descriptor = descriptor.query(name, value);
            }
            if let Some(raw) = body {
                descriptor = descriptor.body(serde_json::from_str(&raw)?);
            }
            descriptor
        }
        Command::Ping => RequestDescriptor::get("/ping"),
    };

    match orchestrator.request(&descriptor, &session).await {
        Outcome::Ok(payload) => {
            println!("{}", serde_json::to_string_pretty(&payload)?);
            Ok(())
        }
        Outcome::Suppressed => {
            println!("{}", json!({"status": "suppressed"}));
            Ok(())
        }
        Outcome::Failed(envelope) => {
            eprintln!("{}", serde_json::to_string_pretty(&envelope)?);
            anyhow::bail!("{} ({})", envelope.message, envelope.kind)
        }
    }
}
