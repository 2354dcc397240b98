//! Storage layer for MINTnet.
//!
//! This module provides a sled-based storage engine. Every entity lives next
//! to its visibility record, and writes that touch several trees (creation,
//! cascading deletes, invite acceptance) run as one multi-tree transaction.

mod config;
mod engine;
mod record;

pub mod key;

pub use config::StorageConfig;
pub use engine::{parent_of, DeleteResult, StorageEngine};
pub use key::current_timestamp;
pub use record::Record;
