//! Repair command handler.

use docadmin_engine::repair_collection as run_repair;

use crate::bridge::Context;
use crate::convert::convert_result;
use crate::{Output, Result};

/// Handle RepairCollection command.
///
/// Per-document failures are part of the outcome. Only a concurrent run on
/// the same collection or an unreadable journal fails the command.
pub fn repair_collection(
    ctx: &Context,
    database: Option<String>,
    collection: String,
) -> Result<Output> {
    let col = ctx.collection(database.as_deref(), &collection)?;
    let outcome = convert_result(run_repair(col.as_ref(), ctx.journal.as_ref()))?;
    Ok(Output::Repaired(outcome))
}
