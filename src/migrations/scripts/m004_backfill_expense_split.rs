// Expenses predating group splitting get group_id/payer_id = null
use async_trait::async_trait;

use crate::error::Result;
use crate::migrations::{ops, Migration, StepOutcome};
use crate::schema;
use crate::store::Store;

pub struct BackfillExpenseSplit;

#[async_trait]
impl Migration for BackfillExpenseSplit {
    fn version(&self) -> i64 {
        4
    }

    fn name(&self) -> &'static str {
        "backfill_expense_split"
    }

    async fn up(&self, store: &dyn Store) -> Result<StepOutcome> {
        let spec = schema::expense_split_backfill();
        let modified = ops::backfill(store, &spec).await?;
        Ok(StepOutcome::applied(format!(
            "{} {} document(s) given default fields",
            modified, spec.collection
        )))
    }
}
