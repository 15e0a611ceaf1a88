pub mod task;
pub mod user;

pub use task::{Task, TaskPage, TaskUpdate, UserRef, UserSummary};
pub use user::{LoginRequest, LoginResponse, NewUser, RegisterRequest, User, UserUpdate};
