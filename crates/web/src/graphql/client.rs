//! GraphQL API client implementation.
//!
//! Uses `graphql_client` for type-safe operations with `reqwest` 0.13 for HTTP.
//! Nothing is cached here: the view decides when to refetch.

use std::sync::Arc;

use graphql_client::{GraphQLQuery, QueryBody, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;
use user_directory_core::{Company, CompanyId, NewUser, ParsedAge, User, UserId, UserUpdate};

use crate::config::GraphQLConfig;
use crate::view::DirectoryApi;

use super::conversions::{convert_company, convert_created_user, convert_user};
use super::queries::{
    DeleteUser, ListCompanies, ListUsers, Ping, UpdateUser, create_user,
    delete_user, list_companies, list_users, ping, update_user,
};
use super::{ApiError, GraphQLError, GraphQLErrorLocation};

/// Maximum number of body characters kept in logs and error messages.
const BODY_SNIPPET_CHARS: usize = 500;

fn snippet(body: &str) -> String {
    body.chars().take(BODY_SNIPPET_CHARS).collect()
}

// =============================================================================
// DirectoryClient
// =============================================================================

/// Client for the user/company GraphQL API.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct DirectoryClient {
    inner: Arc<DirectoryClientInner>,
}

struct DirectoryClientInner {
    client: reqwest::Client,
    endpoint: Url,
}

impl std::fmt::Debug for DirectoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryClient")
            .field("endpoint", &self.inner.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl DirectoryClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: &GraphQLConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("user-directory/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(DirectoryClientInner {
                client,
                endpoint: config.endpoint.clone(),
            }),
        })
    }

    /// Execute a GraphQL operation with its generated variables.
    async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, ApiError> {
        self.send(Q::build_query(variables)).await
    }

    /// Post a request body and decode the response data.
    async fn send<V: Serialize, R: DeserializeOwned>(
        &self,
        request_body: QueryBody<V>,
    ) -> Result<R, ApiError> {
        let operation = request_body.operation_name;

        let response = self
            .inner
            .client
            .post(self.inner.endpoint.clone())
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        // Read as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                operation,
                status = %status,
                body = %snippet(&response_text),
                "GraphQL API returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: response_text.chars().take(200).collect(),
            });
        }

        let response: Response<R> = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    operation,
                    error = %e,
                    body = %snippet(&response_text),
                    "Failed to parse GraphQL response"
                );
                return Err(ApiError::Parse(e));
            }
        };

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            debug!(operation, errors = ?errors, "GraphQL errors in response");

            return Err(ApiError::GraphQL(
                errors
                    .into_iter()
                    .map(|e| GraphQLError {
                        message: e.message,
                        locations: e.locations.map_or_else(Vec::new, |locs| {
                            locs.into_iter()
                                .map(|l| GraphQLErrorLocation {
                                    line: i64::from(l.line),
                                    column: i64::from(l.column),
                                })
                                .collect()
                        }),
                        path: e.path.map_or_else(Vec::new, |p| {
                            p.into_iter()
                                .map(|fragment| match fragment {
                                    graphql_client::PathFragment::Key(s) => {
                                        serde_json::Value::String(s)
                                    }
                                    graphql_client::PathFragment::Index(i) => {
                                        serde_json::Value::Number(i.into())
                                    }
                                })
                                .collect()
                        }),
                    })
                    .collect(),
            ));
        }

        response.data.ok_or_else(|| {
            tracing::error!(
                operation,
                body = %snippet(&response_text),
                "GraphQL response has no data and no errors"
            );
            ApiError::MissingData
        })
    }

    /// Check that the API answers a trivial query.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API reports errors.
    #[instrument(skip(self))]
    pub async fn ping(&self) -> Result<(), ApiError> {
        self.execute::<Ping>(ping::Variables).await?;
        Ok(())
    }
}

// =============================================================================
// DirectoryApi
// =============================================================================

/// `CreateUser` variables with a nullable `age`.
///
/// The generated variables type carries `$age: Int!` as a plain `i64`, which
/// leaves no way to send `NotANumber`. It goes out as `null` and the API
/// rejects it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateUserVariables<'a> {
    first_name: &'a str,
    age: Option<i64>,
    company_id: Option<&'a str>,
}

impl DirectoryApi for DirectoryClient {
    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let data = self.execute::<ListUsers>(list_users::Variables).await?;
        Ok(data.users.into_iter().map(convert_user).collect())
    }

    #[instrument(skip(self))]
    async fn list_companies(&self) -> Result<Vec<Company>, ApiError> {
        let data = self
            .execute::<ListCompanies>(list_companies::Variables)
            .await?;
        Ok(data.companies.into_iter().map(convert_company).collect())
    }

    #[instrument(skip(self, input), fields(first_name = %input.first_name))]
    async fn create_user(&self, input: &NewUser) -> Result<User, ApiError> {
        if input.age == ParsedAge::NotANumber {
            debug!("Forwarding non-numeric age as null");
        }

        let request_body = QueryBody {
            variables: CreateUserVariables {
                first_name: &input.first_name,
                age: input.age.value(),
                company_id: input.company_id.as_ref().map(CompanyId::as_str),
            },
            query: create_user::QUERY,
            operation_name: create_user::OPERATION_NAME,
        };

        let data: create_user::ResponseData = self.send(request_body).await?;

        data.create_user
            .map(convert_created_user)
            .ok_or(ApiError::MissingData)
    }

    #[instrument(skip(self, input), fields(user_id = %input.id))]
    async fn update_user(&self, input: &UserUpdate) -> Result<UserId, ApiError> {
        let variables = update_user::Variables {
            id: input.id.as_str().to_owned(),
            first_name: Some(input.first_name.clone()),
            // `age` is nullable here; NaN goes out as null like any other value.
            age: input.age.value(),
        };

        let data = self.execute::<UpdateUser>(variables).await?;

        data.update_user
            .map(|u| UserId::new(u.id))
            .ok_or_else(|| ApiError::NotFound(format!("User {}", input.id)))
    }

    #[instrument(skip(self), fields(user_id = %id))]
    async fn delete_user(&self, id: &UserId) -> Result<Option<UserId>, ApiError> {
        let variables = delete_user::Variables {
            id: id.as_str().to_owned(),
        };

        let data = self.execute::<DeleteUser>(variables).await?;

        Ok(data.delete_user.map(|u| UserId::new(u.id)))
    }
}
