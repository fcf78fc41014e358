use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_config::sts::AssumeRoleProvider;
use aws_credential_types::Credentials;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use log::{debug, info};

use crate::config::RequestDescriptor;
use crate::error::{Result, TokenError};

const ROLE_SESSION_NAME: &str = "aws-eks-get-token";

/// Load the SDK configuration for `request`: region and profile applied,
/// and the credentials provider wrapped in a role assumption when a role
/// ARN was given
pub async fn load_sdk_config(request: &RequestDescriptor) -> SdkConfig {
    let mut loader =
        aws_config::defaults(BehaviorVersion::latest()).region(Region::new(request.region.clone()));
    if let Some(profile) = &request.profile {
        debug!("Using AWS profile {}", profile);
        loader = loader.profile_name(profile);
    }
    let sdk_config = loader.load().await;

    match &request.role_arn {
        Some(role_arn) => {
            info!("Assuming role {}", role_arn);
            let provider = AssumeRoleProvider::builder(role_arn)
                .session_name(ROLE_SESSION_NAME)
                .configure(&sdk_config)
                .build()
                .await;
            sdk_config
                .into_builder()
                .credentials_provider(SharedCredentialsProvider::new(provider))
                .build()
        }
        None => sdk_config,
    }
}

/// Resolve the signing credentials from the configured provider chain
pub async fn resolve_credentials(sdk_config: &SdkConfig) -> Result<Credentials> {
    let provider = sdk_config
        .credentials_provider()
        .ok_or_else(|| TokenError::signing("no AWS credentials provider is configured"))?;

    provider
        .provide_credentials()
        .await
        .map_err(|e| TokenError::signing_with("failed to load AWS credentials", e))
}
