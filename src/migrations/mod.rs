// Migration trait and registry for the dollar_bill database
use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;
use crate::store::Store;

pub mod ops;
pub mod runner;
pub mod scripts;

/// What a step did. Both variants count as success.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    Applied { detail: String },
    Skipped { reason: String },
}

impl StepOutcome {
    pub fn applied(detail: impl Into<String>) -> Self {
        StepOutcome::Applied { detail: detail.into() }
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        StepOutcome::Skipped { reason: reason.into() }
    }
}

/// A single idempotent step. There is no `down`: steps are safe to re-run,
/// and re-running is how a failed run is recovered.
#[async_trait]
pub trait Migration {
    fn version(&self) -> i64;
    fn name(&self) -> &'static str;
    async fn up(&self, store: &dyn Store) -> Result<StepOutcome>;
}

// Registry of all migrations, in execution order
pub fn all_migrations(seed_sample_group: bool) -> Vec<Box<dyn Migration + Send + Sync>> {
    let mut migrations: Vec<Box<dyn Migration + Send + Sync>> = vec![
        Box::new(scripts::m001_users::Users),
        Box::new(scripts::m002_expenses::Expenses),
        Box::new(scripts::m003_groups::Groups),
        Box::new(scripts::m004_backfill_expense_split::BackfillExpenseSplit),
    ];
    if seed_sample_group {
        migrations.push(Box::new(scripts::m005_seed_roommates::SeedRoommates));
    }
    migrations
}
