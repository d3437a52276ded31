//! SQLite backend for the IPN engine.
//!
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
