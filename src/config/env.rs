//! Read-only access to environment variables

use std::collections::HashMap;

pub const AWS_REGION: &str = "AWS_REGION";
pub const AWS_DEFAULT_REGION: &str = "AWS_DEFAULT_REGION";
pub const AWS_PROFILE: &str = "AWS_PROFILE";
pub const AWS_STS_REGIONAL_ENDPOINT: &str = "AWS_STS_REGIONAL_ENDPOINT";
pub const CLIENT_CERT_FILE: &str = "CLIENT_CERT_FILE";
pub const CLIENT_KEY_FILE: &str = "CLIENT_KEY_FILE";

/// Source of environment-provided fallbacks
pub trait Environment {
    /// Value of `key`, or `None` when unset or empty
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|value| !value.is_empty())
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).filter(|value| !value.is_empty()).cloned()
    }
}
