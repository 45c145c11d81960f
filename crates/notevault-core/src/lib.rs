//! notevault Core - Domain logic and business rules
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `FileRecord`, `SnapshotRecord`, `FileUri`, `DatedFolder`
//! - **Port definitions** - Traits for adapters: `IRemoteDevice`, `ILocalStorage`, `IBackupReporter`
//! - **Configuration** - The JSON config file model, validation and builder
//!
//! # Architecture
//!
//! The domain module contains pure business logic with no I/O.
//! Ports define trait interfaces that adapter crates implement; the
//! sync engine only ever talks to the device and the disk through them.

pub mod config;
pub mod domain;
pub mod ports;
