//! Destination store: WordPress-style two-table representation of a
//! listing (entity row in `{prefix}posts`, attribute rows in
//! `{prefix}postmeta`).

pub mod content;
pub mod mysql;

pub use content::{attribute_rows, entity_row, AttributeRow, EntityRow, ENTITY_TYPE};
pub use mysql::MySqlDestination;
