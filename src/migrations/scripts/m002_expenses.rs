use async_trait::async_trait;

use crate::error::Result;
use crate::migrations::{ops, Migration, StepOutcome};
use crate::schema;
use crate::store::Store;

pub struct Expenses;

#[async_trait]
impl Migration for Expenses {
    fn version(&self) -> i64 {
        2
    }

    fn name(&self) -> &'static str {
        "expenses"
    }

    async fn up(&self, store: &dyn Store) -> Result<StepOutcome> {
        ops::apply_collection(store, &schema::expenses()).await
    }
}
