pub mod get_token;

pub use get_token::{AwsTokenSource, TokenService, TokenSource, get_token_command};
