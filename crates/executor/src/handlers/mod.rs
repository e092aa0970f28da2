//! Command handlers organized by concern.
//!
//! | Module | Commands |
//! |--------|----------|
//! | `documents` | ListDocuments, FindDocument, InsertDocument, UpdateDocument, DeleteDocument |
//! | `repair` | RepairCollection |
//! | `collections` | ListCollections, DropCollection, EmptyCollection |
//! | `databases` | ListDatabases, CreateDatabase, DropDatabase |

pub mod collections;
pub mod databases;
pub mod documents;
pub mod repair;
