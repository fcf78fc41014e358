use clap::Parser;

use crate::api::constants::DEFAULT_TTL_SECS;
use crate::config::ExplicitArgs;

#[derive(Parser, Debug)]
#[command(name = "aws-eks-get-token")]
#[command(about = "Generate and cache EKS authentication tokens")]
#[command(
    long_about = "A CLI tool to generate authentication tokens for Amazon EKS clusters with caching support.\nThis tool caches tokens to improve performance and reduce API calls. It also supports client certificate injection."
)]
pub struct Cli {
    /// EKS cluster name
    #[arg(long)]
    pub cluster_name: Option<String>,
    /// EKS cluster ID (ARN or ID)
    #[arg(long)]
    pub cluster_id: Option<String>,
    /// AWS region (optional if AWS_REGION or AWS_DEFAULT_REGION is set)
    #[arg(long)]
    pub region: Option<String>,
    /// Use a specific profile from your credential file (optional if AWS_PROFILE is set)
    #[arg(long)]
    pub profile: Option<String>,
    /// Assume a role ARN when getting the token
    #[arg(long)]
    pub role_arn: Option<String>,
    /// Ignore cached token
    #[arg(long)]
    pub ignore_cache: bool,
    /// Path to client certificate file (optional if CLIENT_CERT_FILE is set)
    #[arg(long)]
    pub client_cert_file: Option<String>,
    /// Path to client key file (optional if CLIENT_KEY_FILE is set)
    #[arg(long)]
    pub client_key_file: Option<String>,
    /// Token TTL in seconds
    #[arg(long, default_value_t = DEFAULT_TTL_SECS)]
    pub ttl: u64,
    /// Output format (json or omit for default)
    #[arg(long)]
    pub output: Option<String>,
    /// Use regional STS endpoints (regional or legacy, optional if AWS_STS_REGIONAL_ENDPOINT is set)
    #[arg(long)]
    pub sts_regional_endpoints: Option<String>,
    /// Override default cache directory (~/.kube/cache/tokens)
    #[arg(long)]
    pub cache_dir: Option<String>,
}

impl From<Cli> for ExplicitArgs {
    fn from(cli: Cli) -> Self {
        ExplicitArgs {
            cluster_name: cli.cluster_name,
            cluster_id: cli.cluster_id,
            region: cli.region,
            profile: cli.profile,
            role_arn: cli.role_arn,
            ignore_cache: cli.ignore_cache,
            cache_dir: cli.cache_dir,
            ttl: Some(cli.ttl),
            output: cli.output,
            sts_regional_endpoints: cli.sts_regional_endpoints,
            client_cert_file: cli.client_cert_file,
            client_key_file: cli.client_key_file,
        }
    }
}

/// Drop `eks` and `get-token` so the binary can stand in for
/// `aws eks get-token` in a kubeconfig exec entry. An `eks` right after a
/// literal `--` is kept.
pub fn filter_eks_get_token_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut filtered = Vec::new();
    let mut previous: Option<String> = None;

    for arg in args {
        let after_separator = previous.as_deref() == Some("--");
        let skip = (arg == "eks" && !after_separator) || arg == "get-token";
        if !skip {
            filtered.push(arg.clone());
        }
        previous = Some(arg);
    }

    filtered
}
