//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. Ports are interfaces that the sync engine
//! depends on, but whose implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IRemoteDevice`] - Fetch from and upload to the device's HTTP listing
//! - [`ILocalStorage`] - Durable reads and writes under the save directory
//! - [`IBackupReporter`] - Progress and outcome reporting

pub mod local_storage;
pub mod remote_device;
pub mod reporter;

pub use local_storage::ILocalStorage;
pub use remote_device::{DeviceError, FetchResponse, IRemoteDevice};
pub use reporter::{IBackupReporter, NullReporter};
