pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod gate;
pub mod models;
pub mod resolver;
pub mod session;
pub mod state;

pub use config::Config;
pub use error::{AppError, Result};
pub use state::AppState;
