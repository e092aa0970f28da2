//! Collection command handlers.
//!
//! Dropping or emptying a collection takes the same single-flight guard as a
//! repair run.

use docadmin_core::Filter;
use docadmin_engine::RepairGuard;

use crate::bridge::{validate_collection, Context};
use crate::convert::convert_result;
use crate::types::CollectionInfo;
use crate::{Output, Result};

/// Handle ListCollections command.
pub fn list_collections(ctx: &Context, database: Option<String>) -> Result<Output> {
    let database = ctx.database(database.as_deref())?;

    let mut infos = Vec::new();
    for name in ctx.store.collection_names(database) {
        let col = ctx.store.collection(database, &name);
        let count = convert_result(col.count(&Filter::All))?;
        let size = convert_result(col.data_size())?;
        infos.push(CollectionInfo { name, count, size });
    }
    Ok(Output::Collections(infos))
}

/// Handle DropCollection command.
///
/// Dropping a collection that does not exist reports `dropped: 0`.
pub fn drop_collection(
    ctx: &Context,
    database: Option<String>,
    collection: String,
) -> Result<Output> {
    let database = ctx.database(database.as_deref())?;
    validate_collection(&collection)?;
    if !ctx.store.collection_names(database).contains(&collection) {
        return Ok(Output::Dropped { dropped: 0 });
    }

    let col = ctx.store.collection(database, &collection);
    let _guard = convert_result(RepairGuard::acquire(col.namespace()))?;
    let dropped = ctx.store.drop_collection(database, &collection);
    tracing::info!(
        target: "docadmin::executor",
        collection = %col.namespace(),
        "Collection dropped"
    );
    Ok(Output::Dropped {
        dropped: u64::from(dropped),
    })
}

/// Handle EmptyCollection command.
pub fn empty_collection(
    ctx: &Context,
    database: Option<String>,
    collection: String,
) -> Result<Output> {
    let col = ctx.collection(database.as_deref(), &collection)?;
    let _guard = convert_result(RepairGuard::acquire(col.namespace()))?;
    let result = convert_result(col.delete_many(&Filter::All))?;
    tracing::info!(
        target: "docadmin::executor",
        collection = %col.namespace(),
        deleted = result.deleted,
        "Collection emptied"
    );
    Ok(Output::Deleted {
        deleted: result.deleted,
    })
}
