pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod guard;
pub mod models;
pub mod router;
pub mod session;
pub mod shell;
pub mod types;

#[cfg(test)]
pub mod testing;

pub use app::App;
pub use error::ApiError;
