//! Client-side list and form logic used by the task and user views.

pub mod error;
pub mod task_filter;
pub mod task_form;
pub mod user_query;

pub use error::FormError;
pub use task_filter::TaskFilter;
pub use task_form::{Document, NewTask, MAX_DOCUMENTS};
pub use user_query::{assignable_users, UserPage, UserQuery, USERS_PER_PAGE};
