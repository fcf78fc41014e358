use std::fmt;

/// The cluster a token is requested for, in the form the user presented it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterIdentifier {
    /// `--cluster-name my-cluster`
    Name(String),
    /// `--cluster-id arn:aws:eks:us-west-2:123456789012:cluster/my-cluster`
    Arn { arn: String, name: String },
    /// `--cluster-id` with an opaque ID (EKS local clusters)
    Id(String),
}

impl ClusterIdentifier {
    pub fn from_name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Classify a `--cluster-id` value. ARNs have their short name extracted
    /// from the last path segment.
    pub fn from_id(id: impl Into<String>) -> Self {
        let id = id.into();
        if id.starts_with("arn:") {
            let name = id.rsplit('/').next().unwrap_or_default().to_string();
            if !name.is_empty() && name != id {
                return Self::Arn { arn: id, name };
            }
        }
        Self::Id(id)
    }

    /// Short name used as the cache key
    pub fn short_name(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Arn { name, .. } => name,
            Self::Id(id) => id,
        }
    }

    /// Value for the signed `x-k8s-aws-id` header
    pub fn header_value(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Arn { name, .. } => name,
            Self::Id(id) => id,
        }
    }

    /// Name accepted by DescribeCluster, if the identifier carries one
    pub fn describe_name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            Self::Arn { name, .. } => Some(name),
            Self::Id(_) => None,
        }
    }
}

impl fmt::Display for ClusterIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "{}", name),
            Self::Arn { arn, .. } => write!(f, "{}", arn),
            Self::Id(id) => write!(f, "{}", id),
        }
    }
}
