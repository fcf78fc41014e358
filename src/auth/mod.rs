pub mod certificates;
pub mod credentials;

pub use certificates::attach_client_credentials;
pub use credentials::{load_sdk_config, resolve_credentials};
