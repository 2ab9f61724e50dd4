//! Create the posts table

use anyhow::Result;

use crate::store::DynamoDbPostStore;

/// Create the table if it is missing
pub async fn run(store: &DynamoDbPostStore) -> Result<()> {
    if store.ensure_table().await? {
        println!("Created table {}", store.table_name());
    } else {
        println!("Table {} already exists", store.table_name());
    }
    Ok(())
}
