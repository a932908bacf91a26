//! Session-related types.

/// Session keys.
pub mod keys {
    /// Key for the serialised directory `ViewState`.
    pub const DIRECTORY_VIEW: &str = "directory_view";
}
