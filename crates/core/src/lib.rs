//! User Directory Core - Shared domain types.
//!
//! This crate provides the types used by the user directory web frontend:
//! - Type-safe identifiers for users and companies
//! - The user and company records delivered by the GraphQL API
//! - The transient view-local state: the creation draft and the edit session
//! - Best-effort age parsing for form input
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. The GraphQL server owns the data; these types describe the cached
//! copy the view holds and the drafts it submits.
//!
//! # Modules
//!
//! - [`types`] - IDs, records, drafts and age parsing

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
