pub mod api;
pub mod auth;
pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use api::TokenRecord;
pub use cache::TokenCache;
pub use commands::{TokenService, TokenSource};
pub use config::{ExplicitArgs, RequestDescriptor};
pub use error::{TokenError, ValidationError};
