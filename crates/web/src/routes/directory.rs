//! Directory route handlers.
//!
//! Each request loads the [`ViewState`] from the session, runs one view
//! operation against the GraphQL client, stores the state back and renders
//! it. HTMX requests get the `#directory` fragment, plain requests the full
//! page.
//!
//! Failed operations still render `200`: the notice in the view carries the
//! failure.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;
use user_directory_core::{CreationDraft, NO_COMPANY_LABEL, UserId};

use crate::error::{Result, add_breadcrumb};
use crate::graphql::DirectoryClient;
use crate::middleware::HxRequest;
use crate::models::session::keys;
use crate::state::AppState;
use crate::view::{ActionError, Notice, RowMode, UserDirectoryView, ViewState};

// =============================================================================
// View Types
// =============================================================================

/// Directory display data for templates.
#[derive(Debug, Clone)]
pub struct DirectoryView {
    pub rows: Vec<UserRowView>,
    pub companies: Vec<CompanyOptionView>,
    pub creation: CreationDraft,
    /// Whether the "No Company" option of the creation form is selected.
    pub no_company_selected: bool,
    pub no_company_label: &'static str,
    pub notice: Option<NoticeView>,
}

/// One table row.
#[derive(Debug, Clone)]
pub struct UserRowView {
    /// URL-encoded ID for use in paths.
    pub path_id: String,
    pub first_name: String,
    pub age: i64,
    pub company: String,
    /// Draft values when this row is in edit mode.
    pub editing: Option<EditFieldsView>,
}

/// Draft values of the row being edited.
#[derive(Debug, Clone)]
pub struct EditFieldsView {
    pub first_name: String,
    pub age: String,
}

/// One `<option>` of the company select.
#[derive(Debug, Clone)]
pub struct CompanyOptionView {
    pub id: String,
    pub name: String,
    pub selected: bool,
}

/// Notice display data.
#[derive(Debug, Clone)]
pub struct NoticeView {
    pub kind: &'static str,
    pub message: String,
}

impl From<&Notice> for NoticeView {
    fn from(notice: &Notice) -> Self {
        Self {
            kind: notice.kind(),
            message: notice.message().to_string(),
        }
    }
}

impl From<&ViewState> for DirectoryView {
    fn from(state: &ViewState) -> Self {
        let rows = state
            .users
            .iter()
            .map(|user| UserRowView {
                path_id: urlencoding::encode(user.id.as_str()).into_owned(),
                first_name: user.first_name.clone(),
                age: user.age,
                company: user.company_label().to_string(),
                editing: match state.row_mode(&user.id) {
                    RowMode::Editing => state.edit.as_ref().map(|session| EditFieldsView {
                        first_name: session.first_name.clone(),
                        age: session.age.clone(),
                    }),
                    RowMode::Viewing => None,
                },
            })
            .collect();

        let companies = state
            .companies
            .iter()
            .map(|company| CompanyOptionView {
                id: company.id.as_str().to_string(),
                name: company.name.clone(),
                selected: company.id.as_str() == state.creation.company_id,
            })
            .collect();

        Self {
            rows,
            companies,
            creation: state.creation.clone(),
            no_company_selected: state.creation.company_id.is_empty(),
            no_company_label: NO_COMPANY_LABEL,
            notice: state.notice.as_ref().map(NoticeView::from),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Page shell; HTMX replaces the placeholder with `/directory`.
#[derive(Template, WebTemplate)]
#[template(path = "directory/shell.html")]
pub struct ShellTemplate;

/// Full directory page.
#[derive(Template, WebTemplate)]
#[template(path = "directory/index.html")]
pub struct DirectoryPageTemplate {
    pub directory: DirectoryView,
}

/// Directory fragment (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/directory.html")]
pub struct DirectoryFragmentTemplate {
    pub directory: DirectoryView,
}

/// Full page shown when the initial load fails.
#[derive(Template, WebTemplate)]
#[template(path = "directory/error.html")]
pub struct LoadErrorPageTemplate {
    pub message: String,
}

/// Load error fragment (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/load_error.html")]
pub struct LoadErrorFragmentTemplate {
    pub message: String,
}

// =============================================================================
// Forms
// =============================================================================

/// "Create User" form data.
#[derive(Debug, Deserialize)]
pub struct CreateUserForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub age: String,
    /// Empty for "No Company".
    #[serde(default)]
    pub company_id: String,
}

impl From<CreateUserForm> for CreationDraft {
    fn from(form: CreateUserForm) -> Self {
        Self {
            first_name: form.first_name,
            age: form.age,
            company_id: form.company_id,
        }
    }
}

/// Edit row form data.
#[derive(Debug, Deserialize)]
pub struct EditUserForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub age: String,
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Get the view state from the session.
async fn load_view_state(session: &Session) -> Result<Option<ViewState>> {
    Ok(session.get::<ViewState>(keys::DIRECTORY_VIEW).await?)
}

/// Store the view state in the session.
async fn save_view_state(session: &Session, state: &ViewState) -> Result<()> {
    session.insert(keys::DIRECTORY_VIEW, state).await?;
    Ok(())
}

// =============================================================================
// Rendering
// =============================================================================

fn render(state: &ViewState, partial: bool) -> Response {
    let directory = DirectoryView::from(state);
    if partial {
        DirectoryFragmentTemplate { directory }.into_response()
    } else {
        DirectoryPageTemplate { directory }.into_response()
    }
}

/// Send the browser back to `/` to start a fresh view.
fn restart(partial: bool) -> Response {
    tracing::debug!("No view state in session, restarting");
    if partial {
        AppendHeaders([("HX-Redirect", "/")]).into_response()
    } else {
        Redirect::to("/").into_response()
    }
}

/// One operation on a stored view.
#[derive(Debug)]
enum Action {
    Create(CreationDraft),
    Edit(UserId),
    Save {
        user_id: UserId,
        first_name: String,
        age: String,
    },
    Cancel,
    Delete(UserId),
}

impl Action {
    async fn apply(
        self,
        view: &mut UserDirectoryView<DirectoryClient>,
    ) -> std::result::Result<(), ActionError> {
        match self {
            Self::Create(draft) => view.create_user(draft).await,
            Self::Edit(user_id) => view.enter_edit_mode(&user_id),
            Self::Save {
                user_id,
                first_name,
                age,
            } => view.save_edit(user_id, first_name, age).await,
            Self::Cancel => {
                view.cancel_edit();
                Ok(())
            }
            Self::Delete(user_id) => view.delete_user(&user_id).await,
        }
    }
}

/// Apply `action` to the stored view, store the result and render it.
///
/// Action failures are already reflected in the view's notice; they are
/// only logged here.
async fn run(
    state: &AppState,
    session: &Session,
    partial: bool,
    action: Action,
) -> Result<Response> {
    let Some(view_state) = load_view_state(session).await? else {
        return Ok(restart(partial));
    };

    let mut view = UserDirectoryView::new(state.client().clone(), view_state);
    if let Err(e) = action.apply(&mut view).await {
        tracing::warn!(error = %e, "Directory action did not complete");
    }

    let view_state = view.into_state();
    save_view_state(session, &view_state).await?;
    Ok(render(&view_state, partial))
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the page shell.
pub async fn shell() -> impl IntoResponse {
    ShellTemplate
}

/// Start a fresh view: reset the session state and load both lists.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    HxRequest(partial): HxRequest,
) -> Result<Response> {
    let mut view = UserDirectoryView::empty(state.client().clone());

    if let Err(e) = view.load_initial().await {
        let event_id = sentry::capture_error(&e);
        tracing::error!(
            error = %e,
            sentry_event_id = %event_id,
            "Initial directory load failed"
        );
        session.remove::<ViewState>(keys::DIRECTORY_VIEW).await?;

        let message = e.to_string();
        return Ok(if partial {
            LoadErrorFragmentTemplate { message }.into_response()
        } else {
            (StatusCode::BAD_GATEWAY, LoadErrorPageTemplate { message }).into_response()
        });
    }

    let view_state = view.into_state();
    save_view_state(&session, &view_state).await?;
    Ok(render(&view_state, partial))
}

/// Create a user from the "Create User" form.
#[instrument(skip(state, session, form))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    HxRequest(partial): HxRequest,
    Form(form): Form<CreateUserForm>,
) -> Result<Response> {
    add_breadcrumb("directory", "Create user", None);
    run(&state, &session, partial, Action::Create(form.into())).await
}

/// Put a row into edit mode.
#[instrument(skip(state, session))]
pub async fn edit(
    State(state): State<AppState>,
    session: Session,
    HxRequest(partial): HxRequest,
    Path(id): Path<String>,
) -> Result<Response> {
    add_breadcrumb("directory", "Edit user", Some(&[("user_id", id.as_str())]));
    run(&state, &session, partial, Action::Edit(UserId::new(id))).await
}

/// Save the row being edited.
#[instrument(skip(state, session, form))]
pub async fn save(
    State(state): State<AppState>,
    session: Session,
    HxRequest(partial): HxRequest,
    Path(id): Path<String>,
    Form(form): Form<EditUserForm>,
) -> Result<Response> {
    add_breadcrumb("directory", "Save user", Some(&[("user_id", id.as_str())]));
    let action = Action::Save {
        user_id: UserId::new(id),
        first_name: form.first_name,
        age: form.age,
    };
    run(&state, &session, partial, action).await
}

/// Leave edit mode without saving.
#[instrument(skip(state, session))]
pub async fn cancel(
    State(state): State<AppState>,
    session: Session,
    HxRequest(partial): HxRequest,
) -> Result<Response> {
    run(&state, &session, partial, Action::Cancel).await
}

/// Delete a user.
#[instrument(skip(state, session))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    HxRequest(partial): HxRequest,
    Path(id): Path<String>,
) -> Result<Response> {
    add_breadcrumb("directory", "Delete user", Some(&[("user_id", id.as_str())]));
    run(&state, &session, partial, Action::Delete(UserId::new(id))).await
}
