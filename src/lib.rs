//! Core library for the roster-tally command line application.
//!
//! The library keeps an in-memory table of uniquely identified records,
//! reconciles spreadsheet imports against it, mirrors every change into a
//! SQLite database, and derives a per-region summary after each mutation.
//! Record storage lives in [`roster::tally::store`], the durable side in
//! [`roster::tally::persistence`], the summary in [`roster::tally::aggregate`],
//! and the orchestration tying them together in [`roster::tally::sync`].

pub mod roster;

pub use roster::tally::{
    Result, SyncError, aggregate, config, error, io, model, persistence, store, sync,
};
