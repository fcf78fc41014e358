use aws_config::SdkConfig;
use aws_sdk_eks::error::DisplayErrorContext;
use log::debug;

use crate::error::{Result, TokenError};

/// Fail fast on a cluster that does not exist or is not reachable with the
/// current credentials
pub async fn verify_cluster_exists(sdk_config: &SdkConfig, cluster_name: &str) -> Result<()> {
    let client = aws_sdk_eks::Client::new(sdk_config);

    let output = client
        .describe_cluster()
        .name(cluster_name)
        .send()
        .await
        .map_err(|e| TokenError::ClusterLookup {
            cluster: cluster_name.to_string(),
            message: DisplayErrorContext(&e).to_string(),
        })?;

    if let Some(status) = output.cluster().and_then(|cluster| cluster.status()) {
        debug!("Cluster {} is {}", cluster_name, status.as_str());
    }
    Ok(())
}
