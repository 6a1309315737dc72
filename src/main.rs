mod config;
mod error;
mod logging;
mod metrics;
mod migrations;
mod model;
mod schema;
mod store;
#[cfg(test)]
mod validator;

use anyhow::Context;
use mongodb::options::ClientOptions;
use mongodb::Client;
use tracing::{error, info};

use crate::config::Settings;
use crate::migrations::{all_migrations, runner::{run_migrations, RunReport}};
use crate::store::MongoStore;

async fn run(settings: &Settings) -> anyhow::Result<RunReport> {
    let mut client_options = ClientOptions::parse(&settings.mongo_uri)
        .await
        .context("Failed to parse MongoDB URI")?;
    client_options.server_selection_timeout = Some(settings.server_selection_timeout);
    client_options.connect_timeout = Some(settings.connect_timeout);
    client_options.app_name = Some("dollar-bill-migrate".to_string());
    let client = Client::with_options(client_options).context("Failed to create MongoDB client")?;

    let store = MongoStore::new(client.database(&settings.database));
    store.ping().await.context("MongoDB is not reachable")?;
    info!(database = %settings.database, "Connected to MongoDB");

    let migrations = all_migrations(settings.seed_sample_group);
    let report = run_migrations(&store, &migrations)
        .await
        .context("Migration run aborted; completed steps stay applied, re-run to resume")?;
    Ok(report)
}

#[tokio::main]
async fn main() {
    logging::set_panic_hook();
    logging::init_logging_with_fallback();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            std::process::exit(2);
        }
    };

    match run(&settings).await {
        Ok(report) => {
            let skipped = report.skipped().count();
            info!(
                run_id = %report.run_id,
                steps = report.steps.len(),
                skipped,
                report = %serde_json::to_string(&report).unwrap_or_default(),
                "MongoDB setup complete"
            );
        }
        Err(e) => {
            error!(error = %format!("{:#}", e), "MongoDB setup failed");
            std::process::exit(1);
        }
    }
}
