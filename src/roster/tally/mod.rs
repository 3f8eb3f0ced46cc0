pub mod aggregate;
pub mod config;
pub mod error;
pub mod io;
pub mod model;
pub mod persistence;
pub mod store;
pub mod sync;

pub use error::{Result, SyncError};
