//! Client for the upstream user/company GraphQL API.
//!
//! # Architecture
//!
//! - Uses `graphql-client` crate for type-safe operations generated from
//!   `graphql/schema.graphql` and `graphql/queries/*.graphql`
//! - The API is the source of truth - no local persistence, every read goes
//!   to the server
//! - [`DirectoryClient`] implements [`crate::view::DirectoryApi`], the seam
//!   the view is written against
//!
//! # Example
//!
//! ```rust,ignore
//! use user_directory_web::graphql::DirectoryClient;
//!
//! let client = DirectoryClient::new(&config.graphql)?;
//!
//! let users = client.list_users().await?;
//! let deleted = client.delete_user(&users[0].id).await?; // None if already gone
//! ```

mod client;
mod conversions;
pub mod queries;

pub use client::DirectoryClient;

use thiserror::Error;

/// Errors that can occur when talking to the GraphQL API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Response status code.
        status: u16,
        /// First part of the response body.
        body: String,
    },

    /// GraphQL operation returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The response carried neither data nor errors.
    #[error("No data in response")]
    MissingData,

    /// A mutation resolved to `null` for the given record.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

/// A GraphQL error returned by the API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the operation document.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

impl GraphQLError {
    /// An error with only a message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: vec![],
            path: vec![],
        }
    }
}

/// Location in an operation document where an error occurred.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let mut parts = Vec::new();

            if !e.message.is_empty() {
                parts.push(e.message.clone());
            }

            if !e.path.is_empty() {
                let path_str = e
                    .path
                    .iter()
                    .map(|p| match p {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(".");
                parts.push(format!("path: {path_str}"));
            }

            if let Some(loc) = e.locations.first() {
                parts.push(format!("at line {}:{}", loc.line, loc.column));
            }

            if parts.is_empty() {
                format!("[error {}]: (no details)", i + 1)
            } else {
                parts.join(" ")
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::NotFound("user 42".to_string());
        assert_eq!(err.to_string(), "Not found: user 42");

        let err = ApiError::Status {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500: boom");
    }

    #[test]
    fn test_graphql_error_formatting() {
        let err = ApiError::GraphQL(vec![
            GraphQLError::message("Cannot query field \"nope\""),
            GraphQLError::message("Invalid ID"),
        ]);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: Cannot query field \"nope\"; Invalid ID"
        );
    }

    #[test]
    fn test_graphql_error_with_path_and_location() {
        let err = ApiError::GraphQL(vec![GraphQLError {
            message: String::new(),
            locations: vec![GraphQLErrorLocation { line: 2, column: 3 }],
            path: vec![
                serde_json::Value::String("users".to_string()),
                serde_json::Value::Number(0.into()),
            ],
        }]);
        assert_eq!(err.to_string(), "GraphQL errors: path: users.0 at line 2:3");
    }

    #[test]
    fn test_graphql_error_no_details() {
        let err = ApiError::GraphQL(vec![GraphQLError::message("")]);
        assert_eq!(err.to_string(), "GraphQL errors: [error 1]: (no details)");

        let err = ApiError::GraphQL(vec![]);
        assert_eq!(err.to_string(), "GraphQL errors: (no error details provided)");
    }
}
