//! Document command handlers.
//!
//! Identifiers go through `resolve_id_query` so a document is found whether
//! its `_id` was stored typed or as a string. Bodies go through
//! `normalize_document` so hex strings and `$oid`/`$date` wrappers are stored
//! as typed values.

use docadmin_core::{ejson, normalize_document, resolve_id_query, Filter, ID_FIELD};
use serde_json::Value as JsonValue;

use crate::bridge::{document_from_json, id_from_json, Context};
use crate::convert::convert_result;
use crate::types::DocumentPage;
use crate::{Error, Output, Result};

fn not_found(id: &JsonValue) -> Error {
    Error::DocumentNotFound { id: id.to_string() }
}

/// Handle ListDocuments command.
///
/// Pages are 1-based; page 0 is treated as page 1.
pub fn list_documents(
    ctx: &Context,
    database: Option<String>,
    collection: String,
    page: Option<u64>,
) -> Result<Output> {
    let col = ctx.collection(database.as_deref(), &collection)?;
    let page = page.unwrap_or(1).max(1);
    let limit = ctx.page_size;
    let skip = usize::try_from(page - 1)
        .ok()
        .and_then(|p| p.checked_mul(limit))
        .unwrap_or(usize::MAX);

    let total = convert_result(col.count(&Filter::All))?;
    let docs = convert_result(col.find_page(&Filter::All, skip, limit))?;

    Ok(Output::DocumentPage(DocumentPage {
        data: docs.iter().map(|doc| ctx.render(doc)).collect(),
        total,
        page,
        limit: limit as u64,
    }))
}

/// Handle FindDocument command.
pub fn find_document(
    ctx: &Context,
    database: Option<String>,
    collection: String,
    id: JsonValue,
) -> Result<Output> {
    let col = ctx.collection(database.as_deref(), &collection)?;
    let filter = resolve_id_query(&id_from_json(&id)?);

    match convert_result(col.find_one(&filter))? {
        Some(doc) => Ok(Output::Document(ctx.render(&doc))),
        None => Err(not_found(&id)),
    }
}

/// Handle InsertDocument command.
///
/// A missing `_id` is generated by the store.
pub fn insert_document(
    ctx: &Context,
    database: Option<String>,
    collection: String,
    data: JsonValue,
) -> Result<Output> {
    let col = ctx.collection(database.as_deref(), &collection)?;
    let doc = normalize_document(&document_from_json(&data)?);

    let id = convert_result(col.insert_one(doc))?;
    tracing::debug!(
        target: "docadmin::executor",
        collection = %col.namespace(),
        id = %ejson::to_string(&id, ejson::Mode::Relaxed),
        "Document inserted"
    );
    Ok(Output::Inserted {
        id: ctx.render_value(&id),
    })
}

/// Handle UpdateDocument command.
///
/// `_id` in the body is dropped; the identifier cannot be changed by an
/// update.
pub fn update_document(
    ctx: &Context,
    database: Option<String>,
    collection: String,
    id: JsonValue,
    data: JsonValue,
) -> Result<Output> {
    let col = ctx.collection(database.as_deref(), &collection)?;
    let raw_id = id_from_json(&id)?;

    let mut fields = document_from_json(&data)?;
    fields.remove(ID_FIELD);
    if fields.is_empty() {
        return Err(Error::InvalidInput {
            reason: "update sets no fields".to_string(),
        });
    }
    let fields = normalize_document(&fields);

    let filter = resolve_id_query(&raw_id);
    let result = convert_result(col.update_one(&filter, &fields))?;
    if result.matched == 0 {
        return Err(not_found(&id));
    }
    Ok(Output::Updated {
        matched: result.matched,
        modified: result.modified,
    })
}

/// Handle DeleteDocument command.
pub fn delete_document(
    ctx: &Context,
    database: Option<String>,
    collection: String,
    id: JsonValue,
) -> Result<Output> {
    let col = ctx.collection(database.as_deref(), &collection)?;
    let filter = resolve_id_query(&id_from_json(&id)?);

    let result = convert_result(col.delete_one(&filter))?;
    if result.deleted == 0 {
        return Err(not_found(&id));
    }
    Ok(Output::Deleted {
        deleted: result.deleted,
    })
}
