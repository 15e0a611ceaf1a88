use serde::Serialize;

use crate::models::User;
use crate::types::Role;

pub const USERS_PER_PAGE: usize = 5;

/// Search, role filter and page for the admin user list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserQuery {
    pub search: String,
    pub role: Option<Role>,
    /// 1-based; clamped into range when applied
    pub page: usize,
}

impl Default for UserQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            role: None,
            page: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserPage<'a> {
    pub users: Vec<&'a User>,
    pub page: usize,
    pub total_pages: usize,
    pub total: usize,
}

impl UserQuery {
    /// Case-insensitive substring match on name or email plus the role filter
    pub fn matches(&self, user: &User) -> bool {
        let needle = self.search.trim().to_lowercase();
        let matches_search = needle.is_empty()
            || user.name.to_lowercase().contains(&needle)
            || user.email.to_lowercase().contains(&needle);

        matches_search && self.role.map_or(true, |r| user.role == r)
    }

    pub fn apply<'a>(&self, users: &'a [User]) -> UserPage<'a> {
        let matched: Vec<&User> = users.iter().filter(|u| self.matches(u)).collect();
        let total = matched.len();
        let total_pages = total.div_ceil(USERS_PER_PAGE);
        let page = self.page.clamp(1, total_pages.max(1));

        let users = matched
            .into_iter()
            .skip((page - 1) * USERS_PER_PAGE)
            .take(USERS_PER_PAGE)
            .collect();

        UserPage {
            users,
            page,
            total_pages,
            total,
        }
    }
}

/// Users a task may be assigned to from the dashboard: everyone but admins
pub fn assignable_users(users: &[User]) -> Vec<&User> {
    users.iter().filter(|u| !u.role.is_admin()).collect()
}
