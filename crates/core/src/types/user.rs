//! User and company records as delivered by the GraphQL API.

use serde::{Deserialize, Serialize};

use super::id::{CompanyId, UserId};

/// Label shown for users without a company.
pub const NO_COMPANY_LABEL: &str = "No Company";

/// A company embedded in a user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRef {
    pub id: CompanyId,
    pub name: String,
}

/// A user as last read from the server.
///
/// The view never mutates these; every refetch replaces the whole list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned, immutable identifier.
    pub id: UserId,
    pub first_name: String,
    pub age: i64,
    /// Many-to-one reference, resolved server-side.
    pub company: Option<CompanyRef>,
}

impl User {
    /// Company name for display, or [`NO_COMPANY_LABEL`].
    #[must_use]
    pub fn company_label(&self) -> &str {
        self.company
            .as_ref()
            .map(|c| c.name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or(NO_COMPANY_LABEL)
    }
}

/// A company, read-only from the directory's perspective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(company: Option<CompanyRef>) -> User {
        User {
            id: UserId::new("1"),
            first_name: "Ann".to_string(),
            age: 30,
            company,
        }
    }

    #[test]
    fn test_company_label_with_company() {
        let u = user(Some(CompanyRef {
            id: CompanyId::new("c1"),
            name: "Acme".to_string(),
        }));
        assert_eq!(u.company_label(), "Acme");
    }

    #[test]
    fn test_company_label_without_company() {
        assert_eq!(user(None).company_label(), "No Company");
    }

    #[test]
    fn test_company_label_empty_name_falls_back() {
        let u = user(Some(CompanyRef {
            id: CompanyId::new("c1"),
            name: String::new(),
        }));
        assert_eq!(u.company_label(), NO_COMPANY_LABEL);
    }
}
