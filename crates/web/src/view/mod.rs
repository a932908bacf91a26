//! The user directory view.
//!
//! [`UserDirectoryView`] owns the cached user and company lists, the creation
//! draft, the single edit session and the current notice. Every write goes to
//! the API first and is followed by a full refetch of the user list; nothing
//! is merged optimistically.
//!
//! # State machine (per row)
//!
//! ```text
//! Viewing --enter_edit_mode--> Editing --save_edit (ok) / cancel_edit--> Viewing
//! ```
//!
//! Only one row can be `Editing` because the edit session is a single
//! `Option` on the view; rows only read it.

mod state;

pub use state::{Notice, RowMode, ViewState};

use std::future::Future;

use thiserror::Error;
use tracing::instrument;
use user_directory_core::{
    Company, CreationDraft, EditSession, NewUser, User, UserId, UserUpdate, ValidationError,
};

use crate::graphql::ApiError;

/// The operations the view needs from the GraphQL API.
pub trait DirectoryApi: Send + Sync {
    /// `ListUsers`: every user with its embedded company.
    fn list_users(&self) -> impl Future<Output = Result<Vec<User>, ApiError>> + Send;

    /// `ListCompanies`: every company.
    fn list_companies(&self) -> impl Future<Output = Result<Vec<Company>, ApiError>> + Send;

    /// `CreateUser`: returns the created record.
    fn create_user(&self, input: &NewUser)
    -> impl Future<Output = Result<User, ApiError>> + Send;

    /// `UpdateUser`: returns the ID of the updated record.
    fn update_user(
        &self,
        input: &UserUpdate,
    ) -> impl Future<Output = Result<UserId, ApiError>> + Send;

    /// `DeleteUser`: returns the ID of the deleted record, or `None` when the
    /// API resolved the mutation to `null`.
    fn delete_user(
        &self,
        id: &UserId,
    ) -> impl Future<Output = Result<Option<UserId>, ApiError>> + Send;
}

/// Why a user action did not complete.
///
/// The view has already put a matching [`Notice`] into its state when one of
/// these is returned.
#[derive(Debug, Error)]
pub enum ActionError {
    /// Local presence check failed; no request was made.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The targeted user is not in the cached list.
    #[error("Unknown user: {0}")]
    UnknownUser(UserId),

    /// The mutation failed; drafts and edit session are untouched.
    #[error("Mutation failed: {0}")]
    Mutation(#[source] ApiError),

    /// The mutation succeeded but the follow-up user list read failed.
    #[error("Refetch failed: {0}")]
    Refetch(#[source] ApiError),
}

/// The directory view: cached reads plus transient local state.
#[derive(Debug)]
pub struct UserDirectoryView<A> {
    api: A,
    state: ViewState,
}

impl<A: DirectoryApi> UserDirectoryView<A> {
    /// Resume a view from previously stored state.
    pub const fn new(api: A, state: ViewState) -> Self {
        Self { api, state }
    }

    /// A view with nothing loaded yet.
    pub fn empty(api: A) -> Self {
        Self::new(api, ViewState::default())
    }

    /// Current state.
    pub const fn state(&self) -> &ViewState {
        &self.state
    }

    /// Consume the view, keeping its state for the next request.
    pub fn into_state(self) -> ViewState {
        self.state
    }

    /// Load both lists concurrently.
    ///
    /// Both caches are replaced only when both reads succeed. The first
    /// error to arrive is returned; the other read's outcome is dropped.
    ///
    /// # Errors
    ///
    /// Returns the first `ApiError` from either read.
    #[instrument(skip(self))]
    pub async fn load_initial(&mut self) -> Result<(), ApiError> {
        self.state.notice = None;

        let (users, companies) =
            tokio::try_join!(self.api.list_users(), self.api.list_companies())?;

        tracing::debug!(
            users = users.len(),
            companies = companies.len(),
            "Directory loaded"
        );
        self.state.users = users;
        self.state.companies = companies;
        Ok(())
    }

    /// Submit the creation form.
    ///
    /// The draft becomes the view's creation draft first, so a rejected or
    /// failed submission keeps what the user typed.
    ///
    /// # Errors
    ///
    /// - [`ActionError::Invalid`] if the name or age is empty (no request)
    /// - [`ActionError::Mutation`] if `CreateUser` fails
    /// - [`ActionError::Refetch`] if the follow-up read fails
    #[instrument(skip(self, draft))]
    pub async fn create_user(&mut self, draft: CreationDraft) -> Result<(), ActionError> {
        self.state.notice = None;
        self.state.creation = draft;

        let input = match self.state.creation.to_new_user() {
            Ok(input) => input,
            Err(e) => {
                self.state.notice = Some(Notice::Blocking(e.to_string()));
                return Err(e.into());
            }
        };

        match self.api.create_user(&input).await {
            Ok(created) => tracing::info!(user_id = %created.id, "User created"),
            Err(e) => return Err(self.mutation_failed("Create user", e)),
        }

        self.state.creation = CreationDraft::default();
        self.refetch_users().await
    }

    /// Start editing `user_id`, silently discarding any other edit session.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::UnknownUser`] if the user is not in the cached
    /// list; the current edit session is left alone.
    pub fn enter_edit_mode(&mut self, user_id: &UserId) -> Result<(), ActionError> {
        self.state.notice = None;

        let Some(user) = self.state.user(user_id) else {
            self.state.notice = Some(Notice::Error(format!("User {user_id} no longer exists")));
            return Err(ActionError::UnknownUser(user_id.clone()));
        };

        let session = EditSession::for_user(user);

        if let Some(previous) = &self.state.edit
            && !previous.targets(user_id)
        {
            tracing::debug!(discarded = %previous.user_id, "Discarding unsaved edit session");
        }

        self.state.edit = Some(session);
        Ok(())
    }

    /// Save the edit of `user_id` with the given draft values.
    ///
    /// Both fields are always submitted, changed or not.
    ///
    /// # Errors
    ///
    /// - [`ActionError::Mutation`] if `UpdateUser` fails (edit session kept)
    /// - [`ActionError::Refetch`] if the follow-up read fails
    #[instrument(skip(self, user_id, first_name, age), fields(user_id = %user_id))]
    pub async fn save_edit(
        &mut self,
        user_id: UserId,
        first_name: String,
        age: String,
    ) -> Result<(), ActionError> {
        self.state.notice = None;

        let session = EditSession {
            user_id,
            first_name,
            age,
        };
        let update = session.to_update();
        self.state.edit = Some(session);

        if let Err(e) = self.api.update_user(&update).await {
            return Err(self.mutation_failed("Update user", e));
        }

        tracing::info!(user_id = %update.id, "User updated");
        self.state.edit = None;
        self.refetch_users().await
    }

    /// Drop the edit session without contacting the server.
    pub fn cancel_edit(&mut self) {
        self.state.notice = None;
        self.state.edit = None;
    }

    /// Delete `user_id`. No confirmation is asked for.
    ///
    /// A `null` payload (the user was already gone) still refetches, so a row
    /// removed elsewhere disappears.
    ///
    /// # Errors
    ///
    /// - [`ActionError::Mutation`] if `DeleteUser` fails
    /// - [`ActionError::Refetch`] if the follow-up read fails
    #[instrument(skip(self, user_id), fields(user_id = %user_id))]
    pub async fn delete_user(&mut self, user_id: &UserId) -> Result<(), ActionError> {
        self.state.notice = None;

        match self.api.delete_user(user_id).await {
            Ok(Some(_)) => tracing::info!(user_id = %user_id, "User deleted"),
            Ok(None) => tracing::debug!(user_id = %user_id, "Delete resolved to null"),
            Err(e) => return Err(self.mutation_failed("Delete user", e)),
        }

        self.refetch_users().await
    }

    /// Replace the cached user list with a fresh read.
    async fn refetch_users(&mut self) -> Result<(), ActionError> {
        match self.api.list_users().await {
            Ok(users) => {
                self.state.users = users;
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "User list refetch failed");
                self.state.notice = Some(Notice::Error(format!("Could not reload users: {e}")));
                Err(ActionError::Refetch(e))
            }
        }
    }

    fn mutation_failed(&mut self, action: &str, error: ApiError) -> ActionError {
        tracing::error!(error = %error, "{action} failed");
        self.state.notice = Some(Notice::Error(format!("{action} failed: {error}")));
        ActionError::Mutation(error)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use user_directory_core::{CompanyId, CompanyRef, ParsedAge};

    use super::*;
    use crate::graphql::GraphQLError;

    /// In-memory stand-in for the GraphQL API.
    #[derive(Default)]
    struct FakeApi {
        inner: Mutex<FakeInner>,
    }

    #[derive(Default)]
    struct FakeInner {
        users: Vec<User>,
        companies: Vec<Company>,
        next_id: u32,
        /// Operation names, in call order.
        calls: Vec<&'static str>,
        created: Vec<NewUser>,
        updated: Vec<UserUpdate>,
        /// Operation names that fail.
        failing: HashSet<&'static str>,
    }

    impl FakeApi {
        fn with_users(users: Vec<User>) -> Self {
            let api = Self::default();
            {
                let mut inner = api.inner.lock().unwrap();
                inner.next_id = 100;
                inner.users = users;
                inner.companies = vec![Company {
                    id: CompanyId::new("c1"),
                    name: "Acme".to_string(),
                }];
            }
            api
        }

        fn fail(&self, operation: &'static str) {
            self.inner.lock().unwrap().failing.insert(operation);
        }

        fn calls(&self) -> Vec<&'static str> {
            self.inner.lock().unwrap().calls.clone()
        }

        /// Record a call and return an error if the operation is set to fail.
        fn enter(&self, operation: &'static str) -> Result<(), ApiError> {
            let mut inner = self.inner.lock().unwrap();
            inner.calls.push(operation);
            if inner.failing.contains(operation) {
                return Err(ApiError::GraphQL(vec![GraphQLError::message(format!(
                    "{operation} exploded"
                ))]));
            }
            Ok(())
        }
    }

    impl DirectoryApi for &FakeApi {
        async fn list_users(&self) -> Result<Vec<User>, ApiError> {
            self.enter("ListUsers")?;
            Ok(self.inner.lock().unwrap().users.clone())
        }

        async fn list_companies(&self) -> Result<Vec<Company>, ApiError> {
            self.enter("ListCompanies")?;
            Ok(self.inner.lock().unwrap().companies.clone())
        }

        async fn create_user(&self, input: &NewUser) -> Result<User, ApiError> {
            self.enter("CreateUser")?;
            let mut inner = self.inner.lock().unwrap();
            inner.next_id += 1;
            let company = input.company_id.as_ref().and_then(|id| {
                inner.companies.iter().find(|c| &c.id == id).map(|c| CompanyRef {
                    id: c.id.clone(),
                    name: c.name.clone(),
                })
            });
            let user = User {
                id: UserId::new(inner.next_id.to_string()),
                first_name: input.first_name.clone(),
                age: input.age.value().unwrap_or_default(),
                company,
            };
            inner.created.push(input.clone());
            inner.users.push(user.clone());
            Ok(user)
        }

        async fn update_user(&self, input: &UserUpdate) -> Result<UserId, ApiError> {
            self.enter("UpdateUser")?;
            let mut inner = self.inner.lock().unwrap();
            inner.updated.push(input.clone());
            let user = inner
                .users
                .iter_mut()
                .find(|u| u.id == input.id)
                .ok_or_else(|| ApiError::NotFound(format!("User {}", input.id)))?;
            user.first_name.clone_from(&input.first_name);
            if let Some(age) = input.age.value() {
                user.age = age;
            }
            Ok(input.id.clone())
        }

        async fn delete_user(&self, id: &UserId) -> Result<Option<UserId>, ApiError> {
            self.enter("DeleteUser")?;
            let mut inner = self.inner.lock().unwrap();
            let before = inner.users.len();
            inner.users.retain(|u| &u.id != id);
            Ok((inner.users.len() < before).then(|| id.clone()))
        }
    }

    fn ann() -> User {
        User {
            id: UserId::new("1"),
            first_name: "Ann".to_string(),
            age: 30,
            company: None,
        }
    }

    fn cy() -> User {
        User {
            id: UserId::new("2"),
            first_name: "Cy".to_string(),
            age: 52,
            company: Some(CompanyRef {
                id: CompanyId::new("c1"),
                name: "Acme".to_string(),
            }),
        }
    }

    fn draft(first_name: &str, age: &str, company_id: &str) -> CreationDraft {
        CreationDraft {
            first_name: first_name.to_string(),
            age: age.to_string(),
            company_id: company_id.to_string(),
        }
    }

    async fn loaded(api: &FakeApi) -> UserDirectoryView<&FakeApi> {
        let mut view = UserDirectoryView::empty(api);
        view.load_initial().await.unwrap();
        view
    }

    #[tokio::test]
    async fn test_load_initial_fills_both_caches() {
        let api = FakeApi::with_users(vec![ann(), cy()]);
        let view = loaded(&api).await;

        assert_eq!(view.state().users.len(), 2);
        assert_eq!(view.state().companies.len(), 1);
        let mut calls = api.calls();
        calls.sort_unstable();
        assert_eq!(calls, vec!["ListCompanies", "ListUsers"]);
    }

    #[tokio::test]
    async fn test_load_initial_failure_leaves_caches_empty() {
        let api = FakeApi::with_users(vec![ann()]);
        api.fail("ListCompanies");

        let mut view = UserDirectoryView::empty(&api);
        let err = view.load_initial().await.unwrap_err();

        assert!(err.to_string().contains("ListCompanies exploded"));
        assert!(view.state().users.is_empty());
        assert!(view.state().companies.is_empty());
    }

    #[tokio::test]
    async fn test_create_user_sends_null_company_and_refetches() {
        let api = FakeApi::with_users(vec![ann()]);
        let mut view = loaded(&api).await;

        view.create_user(draft("Bo", "25", "")).await.unwrap();

        let created = api.inner.lock().unwrap().created.clone();
        assert_eq!(
            created,
            vec![NewUser {
                first_name: "Bo".to_string(),
                age: ParsedAge::Number(25),
                company_id: None,
            }]
        );
        assert_eq!(view.state().users.len(), 2);
        assert!(view.state().creation.is_empty());
        assert_eq!(view.state().notice, None);
        assert_eq!(api.calls().last(), Some(&"ListUsers"));
    }

    #[tokio::test]
    async fn test_create_user_with_company() {
        let api = FakeApi::with_users(vec![]);
        let mut view = loaded(&api).await;

        view.create_user(draft("Bo", "25", "c1")).await.unwrap();

        assert_eq!(view.state().users[0].company_label(), "Acme");
    }

    #[tokio::test]
    async fn test_create_user_missing_fields_makes_no_request() {
        let api = FakeApi::with_users(vec![ann()]);
        let mut view = loaded(&api).await;
        let calls_before = api.calls().len();

        for (name, age) in [("", "25"), ("Bo", ""), ("", "")] {
            let err = view.create_user(draft(name, age, "")).await.unwrap_err();
            assert!(matches!(err, ActionError::Invalid(_)));
            assert_eq!(
                view.state().notice,
                Some(Notice::Blocking("Name and Age are required".to_string()))
            );
        }

        assert_eq!(api.calls().len(), calls_before);
        // The typed draft is kept.
        assert_eq!(view.state().creation.first_name, "");
        assert_eq!(view.state().users.len(), 1);
    }

    #[tokio::test]
    async fn test_create_user_failure_keeps_draft() {
        let api = FakeApi::with_users(vec![ann()]);
        let mut view = loaded(&api).await;
        api.fail("CreateUser");

        let err = view.create_user(draft("Bo", "25", "c1")).await.unwrap_err();

        assert!(matches!(err, ActionError::Mutation(_)));
        assert_eq!(view.state().creation, draft("Bo", "25", "c1"));
        assert!(matches!(view.state().notice, Some(Notice::Error(_))));
        // No refetch after a failed mutation.
        assert_eq!(api.calls().last(), Some(&"CreateUser"));
    }

    #[tokio::test]
    async fn test_refetch_failure_still_clears_draft() {
        let api = FakeApi::with_users(vec![ann()]);
        let mut view = loaded(&api).await;
        api.fail("ListUsers");

        let err = view.create_user(draft("Bo", "25", "")).await.unwrap_err();

        assert!(matches!(err, ActionError::Refetch(_)));
        assert!(view.state().creation.is_empty());
        // Stale list kept.
        assert_eq!(view.state().users.len(), 1);
        assert!(matches!(view.state().notice, Some(Notice::Error(_))));
    }

    #[tokio::test]
    async fn test_single_edit_session() {
        let api = FakeApi::with_users(vec![ann(), cy()]);
        let mut view = loaded(&api).await;
        let (a, b) = (UserId::new("1"), UserId::new("2"));

        view.enter_edit_mode(&a).unwrap();
        assert_eq!(view.state().row_mode(&a), RowMode::Editing);
        assert_eq!(view.state().edit.as_ref().unwrap().first_name, "Ann");
        assert_eq!(view.state().edit.as_ref().unwrap().age, "30");

        view.enter_edit_mode(&b).unwrap();
        assert_eq!(view.state().row_mode(&a), RowMode::Viewing);
        assert_eq!(view.state().row_mode(&b), RowMode::Editing);

        // Switching never submits the discarded draft.
        assert!(!api.calls().contains(&"UpdateUser"));
    }

    #[tokio::test]
    async fn test_enter_edit_mode_unknown_user() {
        let api = FakeApi::with_users(vec![ann()]);
        let mut view = loaded(&api).await;
        view.enter_edit_mode(&UserId::new("1")).unwrap();

        let err = view.enter_edit_mode(&UserId::new("nope")).unwrap_err();

        assert!(matches!(err, ActionError::UnknownUser(_)));
        assert_eq!(view.state().row_mode(&UserId::new("1")), RowMode::Editing);
    }

    #[tokio::test]
    async fn test_save_edit_submits_both_fields_and_refetches() {
        let api = FakeApi::with_users(vec![ann(), cy()]);
        let mut view = loaded(&api).await;
        view.enter_edit_mode(&UserId::new("1")).unwrap();

        view.save_edit(UserId::new("1"), "Anne".to_string(), "31".to_string())
            .await
            .unwrap();

        assert_eq!(view.state().edit, None);
        let row = view.state().user(&UserId::new("1")).unwrap();
        assert_eq!(row.first_name, "Anne");
        assert_eq!(row.age, 31);
        assert_eq!(api.calls().last(), Some(&"ListUsers"));
    }

    #[tokio::test]
    async fn test_save_edit_unchanged_values_still_submitted() {
        let api = FakeApi::with_users(vec![ann()]);
        let mut view = loaded(&api).await;
        view.enter_edit_mode(&UserId::new("1")).unwrap();

        view.save_edit(UserId::new("1"), "Ann".to_string(), "30".to_string())
            .await
            .unwrap();

        let updated = api.inner.lock().unwrap().updated.clone();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].first_name, "Ann");
        assert_eq!(updated[0].age, ParsedAge::Number(30));
    }

    #[tokio::test]
    async fn test_save_edit_failure_keeps_session() {
        let api = FakeApi::with_users(vec![ann()]);
        let mut view = loaded(&api).await;
        api.fail("UpdateUser");

        let err = view
            .save_edit(UserId::new("1"), "Anne".to_string(), "31".to_string())
            .await
            .unwrap_err();

        assert!(matches!(err, ActionError::Mutation(_)));
        let session = view.state().edit.clone().unwrap();
        assert_eq!(session.first_name, "Anne");
        assert_eq!(session.age, "31");
        assert_eq!(view.state().user(&UserId::new("1")).unwrap().first_name, "Ann");
    }

    #[tokio::test]
    async fn test_cancel_edit_makes_no_request() {
        let api = FakeApi::with_users(vec![ann()]);
        let mut view = loaded(&api).await;
        view.enter_edit_mode(&UserId::new("1")).unwrap();
        let calls_before = api.calls().len();

        view.cancel_edit();

        assert_eq!(view.state().edit, None);
        assert_eq!(api.calls().len(), calls_before);
    }

    #[tokio::test]
    async fn test_delete_user_removes_exactly_one() {
        let api = FakeApi::with_users(vec![ann(), cy()]);
        let mut view = loaded(&api).await;
        view.create_user(draft("Bo", "25", "")).await.unwrap();
        let before = view.state().users.clone();

        view.delete_user(&UserId::new("1")).await.unwrap();

        let after = &view.state().users;
        assert_eq!(after.len(), before.len() - 1);
        assert!(view.state().user(&UserId::new("1")).is_none());
        for user in after {
            assert!(before.contains(user));
        }
    }

    #[tokio::test]
    async fn test_create_then_delete_example() {
        let api = FakeApi::with_users(vec![ann()]);
        let mut view = loaded(&api).await;

        view.create_user(draft("Bo", "25", "")).await.unwrap();
        assert_eq!(view.state().users.len(), 2);

        view.delete_user(&UserId::new("1")).await.unwrap();
        let names: Vec<_> = view
            .state()
            .users
            .iter()
            .map(|u| u.first_name.as_str())
            .collect();
        assert_eq!(names, vec!["Bo"]);
    }

    #[tokio::test]
    async fn test_delete_failure_surfaces_notice() {
        let api = FakeApi::with_users(vec![ann()]);
        let mut view = loaded(&api).await;
        api.fail("DeleteUser");

        let err = view.delete_user(&UserId::new("1")).await.unwrap_err();

        assert!(matches!(err, ActionError::Mutation(ApiError::GraphQL(_))));
        assert_eq!(
            view.state().notice.as_ref().map(Notice::message),
            Some("Delete user failed: GraphQL errors: DeleteUser exploded")
        );
        assert_eq!(view.state().users.len(), 1);
        assert_eq!(api.calls().last(), Some(&"DeleteUser"));
    }

    #[tokio::test]
    async fn test_delete_of_vanished_user_still_refetches() {
        let api = FakeApi::with_users(vec![ann(), cy()]);
        let mut view = loaded(&api).await;
        // Removed behind the view's back.
        api.inner.lock().unwrap().users.retain(|u| u.id != UserId::new("1"));

        view.delete_user(&UserId::new("1")).await.unwrap();

        assert_eq!(view.state().notice, None);
        assert!(view.state().user(&UserId::new("1")).is_none());
        assert_eq!(api.calls().last(), Some(&"ListUsers"));
    }
}
