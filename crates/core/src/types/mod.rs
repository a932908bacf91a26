//! Core types for the user directory.
//!
//! This module provides type-safe wrappers for the directory's domain concepts.

pub mod age;
pub mod draft;
pub mod id;
pub mod user;

pub use age::{ParsedAge, parse_age};
pub use draft::{CreationDraft, EditSession, NewUser, UserUpdate, ValidationError};
pub use id::*;
pub use user::{Company, CompanyRef, NO_COMPANY_LABEL, User};
