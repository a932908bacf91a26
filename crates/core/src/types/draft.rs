//! Transient view-local state: the creation draft and the edit session.
//!
//! Both hold raw form text. They are turned into API inputs ([`NewUser`],
//! [`UserUpdate`]) only at submission time.

use serde::{Deserialize, Serialize};

use super::age::{ParsedAge, parse_age};
use super::id::{CompanyId, UserId};
use super::user::User;

/// Errors raised by local presence checks before any request is made.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// First name or age was left empty on the creation form.
    #[error("Name and Age are required")]
    MissingNameOrAge,
}

/// Staged input of the "Create User" form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreationDraft {
    pub first_name: String,
    /// Age as typed; parsed on submission.
    pub age: String,
    /// Selected company ID; empty means "No Company".
    pub company_id: String,
}

impl CreationDraft {
    /// Check presence of the required fields and build the API input.
    ///
    /// Only emptiness is checked. The age is parsed best-effort and the
    /// company selection becomes an explicit `None` when empty.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingNameOrAge`] if the first name or the
    /// age text is empty.
    pub fn to_new_user(&self) -> Result<NewUser, ValidationError> {
        if self.first_name.is_empty() || self.age.is_empty() {
            return Err(ValidationError::MissingNameOrAge);
        }

        Ok(NewUser {
            first_name: self.first_name.clone(),
            age: parse_age(&self.age),
            company_id: (!self.company_id.is_empty())
                .then(|| CompanyId::new(self.company_id.clone())),
        })
    }

    /// Whether every field is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.first_name.is_empty() && self.age.is_empty() && self.company_id.is_empty()
    }
}

/// Input for the `CreateUser` mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub first_name: String,
    pub age: ParsedAge,
    /// `None` is sent as an explicit `null`.
    pub company_id: Option<CompanyId>,
}

/// The single in-progress row edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditSession {
    pub user_id: UserId,
    pub first_name: String,
    pub age: String,
}

impl EditSession {
    /// Start an edit session seeded with the user's current values.
    #[must_use]
    pub fn for_user(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            first_name: user.first_name.clone(),
            age: user.age.to_string(),
        }
    }

    /// Whether this session targets the given user.
    #[must_use]
    pub fn targets(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    /// Build the `UpdateUser` input. Both fields are always submitted.
    #[must_use]
    pub fn to_update(&self) -> UserUpdate {
        UserUpdate {
            id: self.user_id.clone(),
            first_name: self.first_name.clone(),
            age: parse_age(&self.age),
        }
    }
}

/// Input for the `UpdateUser` mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserUpdate {
    pub id: UserId,
    pub first_name: String,
    pub age: ParsedAge,
}
