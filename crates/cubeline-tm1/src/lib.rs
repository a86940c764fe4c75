//! Cubeline TM1 - target adapter for the TM1 REST API
//!
//! This crate turns dimension models into TM1 dimensions, cubes and
//! caption attributes, writes cell data, and decodes the transaction log
//! change feed.

pub mod cells;
pub mod changes;
pub mod payload;
pub mod publish;

// Re-exports
pub use cells::{CellUpdate, CellValue, ElementRef};
pub use changes::{TransactionLogEntry, decode_entries, entries_query, format_entry};
pub use publish::{Publisher, Target, product_version};
