//! Integration tests for the user directory.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p user-directory-integration-tests
//! ```
//!
//! Everything runs in-process: [`FakeGraphQL`] serves the user/company API
//! on an ephemeral port and [`TestApp`] runs the directory server against it.
//! No external services are needed.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;
use user_directory_web::config::{AppConfig, GraphQLConfig, LogFormat};
use user_directory_web::routes;
use user_directory_web::state::AppState;

// =============================================================================
// Fake GraphQL API
// =============================================================================

/// A user as stored by the fake API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUser {
    pub id: String,
    pub first_name: String,
    pub age: i64,
    pub company_id: Option<String>,
}

/// A recorded GraphQL request.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub operation: String,
    pub variables: Value,
}

#[derive(Debug, Default)]
struct FakeData {
    users: Vec<StoredUser>,
    companies: Vec<(String, String)>,
    next_id: u64,
    requests: Vec<RecordedRequest>,
    /// Operations answered with HTTP 500.
    failing: HashSet<String>,
}

#[derive(Debug, Deserialize)]
struct GraphQLRequest {
    #[serde(rename = "operationName")]
    operation_name: String,
    #[serde(default)]
    variables: Value,
}

/// In-process stand-in for the user/company GraphQL API.
#[derive(Debug, Clone)]
pub struct FakeGraphQL {
    data: Arc<Mutex<FakeData>>,
    addr: SocketAddr,
}

impl FakeGraphQL {
    /// Start the fake API seeded with the given users and companies.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start(users: Vec<StoredUser>, companies: Vec<(&str, &str)>) -> Self {
        let data = Arc::new(Mutex::new(FakeData {
            users,
            companies: companies
                .into_iter()
                .map(|(id, name)| (id.to_string(), name.to_string()))
                .collect(),
            next_id: 1000,
            ..FakeData::default()
        }));

        let app = Router::new()
            .route("/graphql", post(handle))
            .with_state(Arc::clone(&data));
        let addr = serve(app).await;

        Self { data, addr }
    }

    /// GraphQL endpoint URL.
    ///
    /// # Panics
    ///
    /// Panics if the bound address does not form a valid URL.
    #[must_use]
    pub fn endpoint(&self) -> Url {
        Url::parse(&format!("http://{}/graphql", self.addr)).expect("valid fake endpoint")
    }

    /// Answer `operation` with HTTP 500 from now on.
    pub fn fail(&self, operation: &str) {
        self.lock().failing.insert(operation.to_string());
    }

    /// Current users.
    #[must_use]
    pub fn users(&self) -> Vec<StoredUser> {
        self.lock().users.clone()
    }

    /// Requests received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Requests for a single operation.
    #[must_use]
    pub fn requests_for(&self, operation: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.operation == operation)
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, FakeData> {
        self.data.lock().expect("fake data lock poisoned")
    }
}

fn user_json(data: &FakeData, user: &StoredUser) -> Value {
    let company = user.company_id.as_ref().and_then(|id| {
        data.companies
            .iter()
            .find(|(cid, _)| cid == id)
            .map(|(cid, name)| json!({ "id": cid, "name": name }))
    });
    json!({
        "id": user.id,
        "firstName": user.first_name,
        "age": user.age,
        "company": company,
    })
}

async fn handle(
    State(data): State<Arc<Mutex<FakeData>>>,
    Json(request): Json<GraphQLRequest>,
) -> (StatusCode, Json<Value>) {
    let mut data = data.lock().expect("fake data lock poisoned");
    data.requests.push(RecordedRequest {
        operation: request.operation_name.clone(),
        variables: request.variables.clone(),
    });

    if data.failing.contains(&request.operation_name) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "upstream exploded" })),
        );
    }

    let vars = &request.variables;
    let body = match request.operation_name.as_str() {
        "ListUsers" => {
            let users: Vec<Value> = data.users.iter().map(|u| user_json(&data, u)).collect();
            json!({ "data": { "users": users } })
        }
        "ListCompanies" => {
            let companies: Vec<Value> = data
                .companies
                .iter()
                .map(|(id, name)| json!({ "id": id, "name": name }))
                .collect();
            json!({ "data": { "companies": companies } })
        }
        "CreateUser" => {
            let Some(age) = vars["age"].as_i64() else {
                let errors = json!([{
                    "message": "Variable \"$age\" of non-null type \"Int!\" must not be null."
                }]);
                return (StatusCode::OK, Json(json!({ "data": null, "errors": errors })));
            };
            data.next_id += 1;
            let user = StoredUser {
                id: data.next_id.to_string(),
                first_name: vars["firstName"].as_str().unwrap_or_default().to_string(),
                age,
                company_id: vars["companyId"].as_str().map(str::to_string),
            };
            let created = user_json(&data, &user);
            data.users.push(user);
            json!({ "data": { "createUser": created } })
        }
        "UpdateUser" => {
            let id = vars["id"].as_str().unwrap_or_default();
            let updated = data.users.iter_mut().find(|u| u.id == id).map(|user| {
                if let Some(first_name) = vars["firstName"].as_str() {
                    user.first_name = first_name.to_string();
                }
                if let Some(age) = vars["age"].as_i64() {
                    user.age = age;
                }
                json!({ "id": user.id, "firstName": user.first_name, "age": user.age })
            });
            json!({ "data": { "updateUser": updated } })
        }
        "DeleteUser" => {
            let id = vars["id"].as_str().unwrap_or_default();
            let index = data.users.iter().position(|u| u.id == id);
            let deleted = index.map(|i| json!({ "id": data.users.remove(i).id }));
            json!({ "data": { "deleteUser": deleted } })
        }
        "Ping" => {
            let ids: Vec<Value> = data.companies.iter().map(|(id, _)| json!({ "id": id })).collect();
            json!({ "data": { "companies": ids } })
        }
        other => json!({ "errors": [{ "message": format!("Unknown operation {other}") }] }),
    };

    (StatusCode::OK, Json(body))
}

// =============================================================================
// Directory server
// =============================================================================

/// A running directory server wired to a [`FakeGraphQL`].
#[derive(Debug)]
pub struct TestApp {
    pub addr: SocketAddr,
    pub api: FakeGraphQL,
}

impl TestApp {
    /// Start a directory server against `api`.
    ///
    /// # Panics
    ///
    /// Panics if the application state cannot be built.
    pub async fn start(api: FakeGraphQL) -> Self {
        let config = AppConfig {
            host: "127.0.0.1".parse().expect("valid host"),
            port: 0,
            base_url: "http://127.0.0.1".to_string(),
            graphql: GraphQLConfig {
                endpoint: api.endpoint(),
                timeout: Duration::from_secs(5),
            },
            log_format: LogFormat::Text,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };
        let state = AppState::new(config).expect("application state");
        let addr = serve(routes::app(state)).await;

        Self { addr, api }
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }
}

/// A browser-like client: keeps cookies, optionally sends `HX-Request`.
///
/// # Panics
///
/// Panics if the HTTP client cannot be built.
#[must_use]
pub fn browser(htmx: bool) -> reqwest::Client {
    let mut headers = reqwest::header::HeaderMap::new();
    if htmx {
        headers.insert(
            "HX-Request",
            reqwest::header::HeaderValue::from_static("true"),
        );
    }
    reqwest::Client::builder()
        .cookie_store(true)
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// Convenience constructor for seeded users.
#[must_use]
pub fn stored_user(id: &str, first_name: &str, age: i64, company_id: Option<&str>) -> StoredUser {
    StoredUser {
        id: id.to_string(),
        first_name: first_name.to_string(),
        age,
        company_id: company_id.map(str::to_string),
    }
}

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to address");
    let addr = listener.local_addr().expect("local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server error");
    });
    addr
}
