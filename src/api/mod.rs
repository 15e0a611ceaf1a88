//! Authenticated request pipeline and the typed endpoint services built on it.

pub mod auth;
pub mod descriptor;
pub mod pipeline;
pub mod tasks;
pub mod transport;
pub mod users;

pub use auth::AuthService;
pub use descriptor::{resource_path, FormPart, RequestBody, RequestDescriptor};
pub use pipeline::Pipeline;
pub use tasks::TaskService;
pub use transport::{ApiResponse, HttpTransport, Transport};
pub use users::UserService;
