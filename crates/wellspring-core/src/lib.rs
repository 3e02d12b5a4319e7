//! Core types and trait definitions for the Wellspring wellness tracker.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! storage backend is abstracted behind [`store::WellnessStore`]; the streak
//! and alert rules live here as plain functions over that trait.

pub mod alert;
pub mod category;
pub mod entry;
pub mod error;
pub mod store;
pub mod streak;
pub mod tracker;

pub use error::{Error, Result};
