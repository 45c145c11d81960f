//! Domain entities and business logic
//!
//! This module contains the core domain types for notevault:
//! - Newtypes for device uris, dated backup folders and device folders
//! - The file record entity and its identity rules
//! - The persisted snapshot record
//! - Domain-specific error types

pub mod errors;
pub mod file_record;
pub mod newtypes;
pub mod snapshot;

// Re-export commonly used types
pub use errors::{BadDateError, DomainError};
pub use file_record::{parse_modified, sentinel_date, FileRecord, MODIFIED_FORMAT};
pub use newtypes::*;
pub use snapshot::SnapshotRecord;
