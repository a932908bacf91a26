//! Types stored outside the domain crate.

pub mod session;
