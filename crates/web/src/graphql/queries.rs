//! GraphQL operation definitions for the user/company API.
//!
//! Uses `graphql_client` to generate type-safe Rust code from the operation
//! documents under `graphql/queries/`.

use graphql_client::GraphQLQuery;

// =============================================================================
// User operations
// =============================================================================

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/schema.graphql",
    query_path = "graphql/queries/users.graphql",
    response_derives = "Debug, Clone"
)]
pub struct ListUsers;

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/schema.graphql",
    query_path = "graphql/queries/users.graphql",
    response_derives = "Debug, Clone",
    variables_derives = "Debug, Clone"
)]
pub struct CreateUser;

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/schema.graphql",
    query_path = "graphql/queries/users.graphql",
    response_derives = "Debug, Clone",
    variables_derives = "Debug, Clone"
)]
pub struct UpdateUser;

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/schema.graphql",
    query_path = "graphql/queries/users.graphql",
    response_derives = "Debug, Clone",
    variables_derives = "Debug, Clone"
)]
pub struct DeleteUser;

// =============================================================================
// Company operations
// =============================================================================

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/schema.graphql",
    query_path = "graphql/queries/companies.graphql",
    response_derives = "Debug, Clone"
)]
pub struct ListCompanies;

// =============================================================================
// Health
// =============================================================================

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/schema.graphql",
    query_path = "graphql/queries/health.graphql",
    response_derives = "Debug"
)]
pub struct Ping;
