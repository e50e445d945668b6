//! Domain logic shared across the opencall backend.
//!
//! This crate is free of I/O: it holds the shared id/timestamp types, the
//! domain error enum, the activity validation rules, and the permission
//! primitives used by the authorization gate.

pub mod activity;
pub mod error;
pub mod permissions;
pub mod types;
