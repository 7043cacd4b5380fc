//! Common library for the wavecast backend
//!
//! This crate provides shared infrastructure used by the API service:
//! database connectivity, connection pooling, and the shared database
//! error type.

pub mod database;
pub mod error;
