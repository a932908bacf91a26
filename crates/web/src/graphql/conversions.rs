//! Conversions from generated response types into core domain types.

use user_directory_core::{Company, CompanyId, CompanyRef, User, UserId};

use super::queries::{create_user, list_companies, list_users};

// =============================================================================
// ListUsers / CreateUser
// =============================================================================

pub fn convert_user(user: list_users::ListUsersUsers) -> User {
    User {
        id: UserId::new(user.id),
        first_name: user.first_name,
        age: user.age,
        company: user.company.map(|c| CompanyRef {
            id: CompanyId::new(c.id),
            name: c.name,
        }),
    }
}

pub fn convert_created_user(user: create_user::CreateUserCreateUser) -> User {
    User {
        id: UserId::new(user.id),
        first_name: user.first_name,
        age: user.age,
        company: user.company.map(|c| CompanyRef {
            id: CompanyId::new(c.id),
            name: c.name,
        }),
    }
}

// =============================================================================
// ListCompanies
// =============================================================================

pub fn convert_company(company: list_companies::ListCompaniesCompanies) -> Company {
    Company {
        id: CompanyId::new(company.id),
        name: company.name,
    }
}
