use async_trait::async_trait;

use crate::error::Result;
use crate::migrations::{ops, Migration, StepOutcome};
use crate::schema;
use crate::store::Store;

pub struct Users;

#[async_trait]
impl Migration for Users {
    fn version(&self) -> i64 {
        1
    }

    fn name(&self) -> &'static str {
        "users"
    }

    async fn up(&self, store: &dyn Store) -> Result<StepOutcome> {
        ops::apply_collection(store, &schema::users()).await
    }
}
