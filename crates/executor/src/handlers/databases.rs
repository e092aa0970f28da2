//! Database command handlers.

use docadmin_core::{doc, DateTime, Filter};
use docadmin_engine::RepairGuard;

use crate::bridge::Context;
use crate::convert::convert_result;
use crate::types::DatabaseInfo;
use crate::{Output, Result};

/// Collection written to make a new database exist
pub const ADMIN_METADATA_COLLECTION: &str = "_admin_metadata";

/// Handle ListDatabases command.
pub fn list_databases(ctx: &Context) -> Result<Output> {
    let mut infos = Vec::new();
    for name in ctx.store.database_names() {
        let mut collections = 0;
        let mut documents = 0;
        let mut size = 0;
        for collection in ctx.store.collection_names(&name) {
            let col = ctx.store.collection(&name, &collection);
            collections += 1;
            documents += convert_result(col.count(&Filter::All))?;
            size += convert_result(col.data_size())?;
        }
        infos.push(DatabaseInfo {
            name,
            collections,
            size,
            empty: documents == 0,
        });
    }
    Ok(Output::Databases(infos))
}

/// Handle CreateDatabase command.
///
/// The store has no explicit create; a database exists once it holds a
/// collection, so a metadata document is written.
pub fn create_database(ctx: &Context, database: String) -> Result<Output> {
    let col = ctx.collection(Some(database.as_str()), ADMIN_METADATA_COLLECTION)?;
    convert_result(col.insert_one(doc! { "created_at" => DateTime::now() }))?;
    tracing::info!(target: "docadmin::executor", database = %database, "Database created");
    Ok(Output::Created { database })
}

/// Handle DropDatabase command.
///
/// Fails with `RepairInProgress` while any of its collections is being
/// repaired.
pub fn drop_database(ctx: &Context, database: String) -> Result<Output> {
    let name = ctx.database(Some(database.as_str()))?;

    let mut guards = Vec::new();
    for collection in ctx.store.collection_names(name) {
        let col = ctx.store.collection(name, &collection);
        guards.push(convert_result(RepairGuard::acquire(col.namespace()))?);
    }
    let dropped = ctx.store.drop_database(name);
    drop(guards);

    tracing::info!(
        target: "docadmin::executor",
        database = %name,
        dropped,
        "Database dropped"
    );
    Ok(Output::Dropped { dropped })
}
