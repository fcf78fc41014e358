//! Constants for the EKS token format and the STS identity request

/// `kind` of the emitted Kubernetes exec credential
pub const EXEC_CREDENTIAL_KIND: &str = "ExecCredential";

/// `apiVersion` of the emitted Kubernetes exec credential
pub const EXEC_CREDENTIAL_API_VERSION: &str = "client.authentication.k8s.io/v1beta1";

/// Prefix the EKS authenticator expects in front of the encoded URL
pub const TOKEN_PREFIX: &str = "k8s-aws-v1.";

/// Default token lifetime in seconds
pub const DEFAULT_TTL_SECS: u64 = 900;

/// How long the presigned URL itself stays replayable.
/// Independent of the token TTL.
pub const PRESIGN_EXPIRES_SECS: u64 = 60;

/// Signing name of the STS service
pub const STS_SERVICE: &str = "sts";

/// Region the global STS endpoint is signed for
pub const STS_GLOBAL_REGION: &str = "us-east-1";

pub const STS_GLOBAL_HOST: &str = "sts.amazonaws.com";

/// Query string of the GetCallerIdentity request
pub const GET_CALLER_IDENTITY_QUERY: &str = "Action=GetCallerIdentity&Version=2011-06-15";

/// Regions served by the global STS endpoint under the `legacy` scope
pub const LEGACY_GLOBAL_REGIONS: &[&str] = &[
    "ap-northeast-1",
    "ap-south-1",
    "ap-southeast-1",
    "ap-southeast-2",
    "aws-global",
    "ca-central-1",
    "eu-central-1",
    "eu-north-1",
    "eu-west-1",
    "eu-west-2",
    "eu-west-3",
    "sa-east-1",
    "us-east-1",
    "us-east-2",
    "us-west-1",
    "us-west-2",
];

/// Request headers
pub mod headers {
    /// Binds the presigned request to one cluster; part of the signature
    pub const CLUSTER_ID: &str = "x-k8s-aws-id";
}

/// Build the GetCallerIdentity URL for an STS host
pub fn caller_identity_url(host: &str) -> String {
    format!("https://{}/?{}", host, GET_CALLER_IDENTITY_QUERY)
}

/// DNS suffix of the partition a region belongs to
pub fn dns_suffix(region: &str) -> &'static str {
    if region.starts_with("cn-") {
        "amazonaws.com.cn"
    } else {
        "amazonaws.com"
    }
}
