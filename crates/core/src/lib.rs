//! Domain types for the business directory image gallery.
//!
//! Holds the asset model with its ordering and principal invariants, the
//! upload batch validator, the shared error type, and environment
//! configuration helpers.

pub mod config;
pub mod error;
pub mod gallery;
pub mod types;
pub mod upload;
