use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn, Instrument};
use uuid::Uuid;

use crate::error::Result;
use crate::metrics::Timer;
use crate::migrations::{Migration, StepOutcome};
use crate::store::Store;

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub version: i64,
    pub name: &'static str,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub steps: Vec<StepReport>,
}

impl RunReport {
    pub fn skipped(&self) -> impl Iterator<Item = &StepReport> {
        self.steps
            .iter()
            .filter(|s| matches!(s.outcome, StepOutcome::Skipped { .. }))
    }
}

/// Applies every migration in order. Stops at the first error and returns it;
/// steps that already ran stay applied.
pub async fn run_migrations(
    store: &dyn Store,
    migrations: &[Box<dyn Migration + Send + Sync>],
) -> Result<RunReport> {
    let run_id = Uuid::new_v4().to_string();
    let span = tracing::info_span!("migration_run", run_id = %run_id);
    let started_at = Utc::now();
    let mut steps = Vec::with_capacity(migrations.len());
    async {
        for migration in migrations {
            let (version, name) = (migration.version(), migration.name());
            info!(version, name, "Applying migration");
            let timer = Timer::new(format!("migration::{}", name));
            let result = migration.up(store).await;
            timer.log_elapsed(None);
            match result {
                Ok(outcome) => {
                    match &outcome {
                        StepOutcome::Applied { detail } => info!(version, name, %detail, "Migration applied"),
                        StepOutcome::Skipped { reason } => warn!(version, name, %reason, "Migration skipped"),
                    }
                    steps.push(StepReport { version, name, outcome });
                }
                Err(err) => {
                    error!(version, name, error = %err, "Migration failed, halting run");
                    return Err(err);
                }
            }
        }
        Ok(())
    }
    .instrument(span)
    .await?;
    Ok(RunReport {
        run_id,
        started_at,
        finished_at: Utc::now(),
        steps,
    })
}
