pub mod auth;
pub mod nav;
pub mod task;
pub mod user;
