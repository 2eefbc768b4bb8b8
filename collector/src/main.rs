use std::io::{IsTerminal, Read};
use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use collector::{
    clock::SystemClock,
    handler::{
        preflight, Collector, InvocationContext, InvocationEvent, InvocationResponse, Outcome,
    },
    snapshot::SnapshotWriter,
    station_api::JcDecauxClient,
    types::{ConfigError, Environment, RunConfig},
};
use snapshot_storage::S3SnapshotStore;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = match Environment::load() {
        Ok(environment) => environment,
        Err(e) => {
            init_tracing(true, "info");
            error!(kind = e.kind(), "Configuration error: {e}");
            return report(&InvocationResponse::from(&Outcome::ConfigError(e)));
        }
    };

    // Use JSON format for staging/production, regular format for development
    init_tracing(environment.json_logs(), &environment.log_filter());
    info!("Starting station collector in {:?} environment", environment);

    let config = RunConfig::from_env();
    if let Err(response) = preflight(&config) {
        return report(&response);
    }

    let collector = match build_collector(environment).await {
        Ok(collector) => collector,
        Err(e) => match e.downcast::<ConfigError>() {
            Ok(config_error) => {
                error!(kind = config_error.kind(), "Configuration error: {config_error}");
                return report(&InvocationResponse::from(&Outcome::ConfigError(
                    config_error,
                )));
            }
            Err(e) => return Err(e),
        },
    };

    let event = read_event();
    let context = std::env::var("INVOCATION_ID")
        .map_or_else(|_| InvocationContext::generate(), InvocationContext::new);

    let response = collector.handle(&config, &event, &context).await;

    report(&response)
}

fn init_tracing(json: bool, filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        fmt().json().with_env_filter(filter).init();
    } else {
        fmt().with_env_filter(filter).init();
    }
}

async fn build_collector(environment: Environment) -> anyhow::Result<Collector> {
    let station_api = Arc::new(JcDecauxClient::new(
        environment.station_api_url(),
        environment.station_api_timeout()?,
    )?);

    let s3_client = Arc::new(S3Client::from_conf(environment.s3_client_config().await?));
    let writer = SnapshotWriter::new(
        Arc::new(S3SnapshotStore::new(s3_client)),
        Arc::new(SystemClock),
        environment.storage_timeout()?,
    );

    Ok(Collector::new(station_api, writer))
}

/// Reads the optional scheduler event from stdin
fn read_event() -> InvocationEvent {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return InvocationEvent::default();
    }

    let mut raw = String::new();
    if let Err(e) = stdin.read_to_string(&mut raw) {
        warn!("Failed to read invocation event: {e}");
        return InvocationEvent::default();
    }
    if raw.trim().is_empty() {
        return InvocationEvent::default();
    }

    serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!("Ignoring malformed invocation event: {e}");
        InvocationEvent::default()
    })
}

fn report(response: &InvocationResponse) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(response)?);

    if response.is_success() {
        Ok(())
    } else {
        anyhow::bail!(
            "invocation failed with status {}: {}",
            response.status_code,
            response.body.message
        )
    }
}
