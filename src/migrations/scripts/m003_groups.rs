use async_trait::async_trait;

use crate::error::Result;
use crate::migrations::{ops, Migration, StepOutcome};
use crate::schema;
use crate::store::Store;

pub struct Groups;

#[async_trait]
impl Migration for Groups {
    fn version(&self) -> i64 {
        3
    }

    fn name(&self) -> &'static str {
        "groups"
    }

    async fn up(&self, store: &dyn Store) -> Result<StepOutcome> {
        ops::apply_collection(store, &schema::groups()).await
    }
}
