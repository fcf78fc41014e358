//! AWS-facing pieces: the exec credential model, the STS token generator
//! and the EKS cluster check

pub mod constants;
pub mod eks;
pub mod models;
pub mod sts;

pub use eks::verify_cluster_exists;
pub use models::{TokenRecord, TokenStatus};
pub use sts::{StsEndpoint, TokenGenerator, decode_token, encode_token};
