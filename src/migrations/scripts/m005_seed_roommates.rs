// Optional sample group, only once both sample users exist
use async_trait::async_trait;

use crate::error::Result;
use crate::migrations::{ops, Migration, StepOutcome};
use crate::model::SeedOutcome;
use crate::schema;
use crate::store::Store;

pub struct SeedRoommates;

#[async_trait]
impl Migration for SeedRoommates {
    fn version(&self) -> i64 {
        5
    }

    fn name(&self) -> &'static str {
        "seed_roommates"
    }

    async fn up(&self, store: &dyn Store) -> Result<StepOutcome> {
        Ok(match ops::seed_if_absent(store, &schema::roommates_seed()).await? {
            SeedOutcome::Inserted => StepOutcome::applied(format!("group '{}' created", schema::SAMPLE_GROUP)),
            SeedOutcome::AlreadyPresent => {
                StepOutcome::applied(format!("group '{}' already present", schema::SAMPLE_GROUP))
            }
            SeedOutcome::Skipped { missing } => StepOutcome::skipped(format!(
                "{} not found, sample group not created",
                missing.join(", ")
            )),
        })
    }
}
