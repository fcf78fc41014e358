pub mod app;

pub use app::{Cli, filter_eks_get_token_args};
