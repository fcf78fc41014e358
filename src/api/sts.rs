//! EKS token generation from a presigned STS GetCallerIdentity request
//!
//! The token is the presigned URL, base64url-encoded without padding and
//! prefixed with `k8s-aws-v1.`. The cluster header is part of the signature,
//! so a token minted for one cluster fails verification on another.

use aws_credential_types::Credentials;
use aws_sigv4::http_request::{
    SignableBody, SignableRequest, SignatureLocation, SigningParams, SigningSettings, sign,
};
use aws_sigv4::sign::v4;
use aws_smithy_runtime_api::client::identity::Identity;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use log::debug;
use std::time::{Duration as StdDuration, SystemTime};

use super::constants::{
    LEGACY_GLOBAL_REGIONS, PRESIGN_EXPIRES_SECS, STS_GLOBAL_HOST, STS_GLOBAL_REGION, STS_SERVICE,
    TOKEN_PREFIX, caller_identity_url, dns_suffix, headers,
};
use crate::config::StsEndpointScope;
use crate::error::{Result, TokenError};

/// STS host and the region requests to it are signed for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StsEndpoint {
    pub host: String,
    pub signing_region: String,
}

impl StsEndpoint {
    pub fn resolve(region: &str, scope: StsEndpointScope) -> Self {
        match scope {
            StsEndpointScope::Legacy if LEGACY_GLOBAL_REGIONS.contains(&region) => Self {
                host: STS_GLOBAL_HOST.to_string(),
                signing_region: STS_GLOBAL_REGION.to_string(),
            },
            _ => Self {
                host: format!("sts.{}.{}", region, dns_suffix(region)),
                signing_region: region.to_string(),
            },
        }
    }

    pub fn caller_identity_url(&self) -> String {
        caller_identity_url(&self.host)
    }
}

/// Presigns GetCallerIdentity requests bound to a cluster
#[derive(Debug, Clone)]
pub struct TokenGenerator {
    credentials: Credentials,
    endpoint: StsEndpoint,
}

impl TokenGenerator {
    pub fn new(credentials: Credentials, endpoint: StsEndpoint) -> Self {
        Self {
            credentials,
            endpoint,
        }
    }

    /// Token for `cluster_header` and the instant it should be considered
    /// expired, `now + ttl`. The presign window is fixed and unrelated to
    /// the TTL.
    pub fn generate(
        &self,
        cluster_header: &str,
        ttl_secs: u64,
        now: DateTime<Utc>,
    ) -> Result<(String, DateTime<Utc>)> {
        let url = self.presign(cluster_header, SystemTime::from(now))?;
        let token = encode_token(&url);

        let ttl = i64::try_from(ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or_else(|| TokenError::signing(format!("ttl of {}s is out of range", ttl_secs)))?;
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| TokenError::signing(format!("ttl of {}s is out of range", ttl_secs)))?;

        debug!(
            "Generated token for {} via {} expiring at {}",
            cluster_header, self.endpoint.host, expires_at
        );
        Ok((token, expires_at))
    }

    /// Fully qualified presigned GetCallerIdentity URL
    pub fn presign(&self, cluster_header: &str, time: SystemTime) -> Result<String> {
        let url = self.endpoint.caller_identity_url();

        let mut settings = SigningSettings::default();
        settings.signature_location = SignatureLocation::QueryParams;
        settings.expires_in = Some(StdDuration::from_secs(PRESIGN_EXPIRES_SECS));

        let identity: Identity = self.credentials.clone().into();
        let params: SigningParams<'_> = v4::SigningParams::builder()
            .identity(&identity)
            .region(&self.endpoint.signing_region)
            .name(STS_SERVICE)
            .time(time)
            .settings(settings)
            .build()
            .map_err(|e| TokenError::signing_with("invalid signing parameters", e))?
            .into();

        let signable = SignableRequest::new(
            "GET",
            &url,
            std::iter::once((headers::CLUSTER_ID, cluster_header)),
            SignableBody::Bytes(&[]),
        )
        .map_err(|e| TokenError::signing_with("failed to build identity request", e))?;

        let (instructions, _signature) = sign(signable, &params)
            .map_err(|e| TokenError::signing_with("failed to presign GetCallerIdentity", e))?
            .into_parts();

        let mut request = http::Request::builder()
            .method("GET")
            .uri(&url)
            .header(headers::CLUSTER_ID, cluster_header)
            .body(())
            .map_err(|e| TokenError::signing_with("failed to build identity request", e))?;
        instructions.apply_to_request_http1x(&mut request);

        Ok(request.uri().to_string())
    }
}

/// `k8s-aws-v1.` + unpadded base64url of the presigned URL
pub fn encode_token(presigned_url: &str) -> String {
    format!("{}{}", TOKEN_PREFIX, URL_SAFE_NO_PAD.encode(presigned_url))
}

/// Inverse of [`encode_token`]
pub fn decode_token(token: &str) -> Option<String> {
    let encoded = token.strip_prefix(TOKEN_PREFIX)?;
    let bytes = URL_SAFE_NO_PAD.decode(encoded).ok()?;
    String::from_utf8(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn generator(scope: StsEndpointScope, region: &str) -> TokenGenerator {
        let credentials = Credentials::new(
            "AKIDEXAMPLE",
            "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
            None,
            None,
            "test",
        );
        TokenGenerator::new(credentials, StsEndpoint::resolve(region, scope))
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_regional_endpoint() {
        let endpoint = StsEndpoint::resolve("us-west-2", StsEndpointScope::Regional);
        assert_eq!(endpoint.host, "sts.us-west-2.amazonaws.com");
        assert_eq!(endpoint.signing_region, "us-west-2");
        assert_eq!(
            endpoint.caller_identity_url(),
            "https://sts.us-west-2.amazonaws.com/?Action=GetCallerIdentity&Version=2011-06-15"
        );
    }

    #[test]
    fn test_legacy_endpoint_uses_global_host_for_legacy_regions() {
        let endpoint = StsEndpoint::resolve("eu-west-1", StsEndpointScope::Legacy);
        assert_eq!(endpoint.host, "sts.amazonaws.com");
        assert_eq!(endpoint.signing_region, "us-east-1");

        let newer = StsEndpoint::resolve("ap-east-1", StsEndpointScope::Legacy);
        assert_eq!(newer.host, "sts.ap-east-1.amazonaws.com");
        assert_eq!(newer.signing_region, "ap-east-1");
    }

    #[test]
    fn test_china_regions_use_cn_suffix() {
        let endpoint = StsEndpoint::resolve("cn-north-1", StsEndpointScope::Regional);
        assert_eq!(endpoint.host, "sts.cn-north-1.amazonaws.com.cn");
    }

    #[test]
    fn test_token_encoding_has_prefix_and_no_padding() {
        // 1 byte of input would normally need "==" padding
        let token = encode_token("h");
        assert_eq!(token, "k8s-aws-v1.aA");
        assert!(!token.contains('='));
        assert_eq!(decode_token(&token).as_deref(), Some("h"));
        assert_eq!(decode_token("not-a-token"), None);
    }

    #[test]
    fn test_presigned_url_binds_cluster_header() {
        let generator = generator(StsEndpointScope::Regional, "us-west-2");
        let url = generator
            .presign("my-cluster", SystemTime::from(fixed_now()))
            .unwrap();

        assert!(url.starts_with("https://sts.us-west-2.amazonaws.com/?"));
        assert!(url.contains("Action=GetCallerIdentity"));
        assert!(url.contains("Version=2011-06-15"));
        assert!(url.contains("X-Amz-Algorithm=AWS4-HMAC-SHA256"));
        assert!(url.contains("X-Amz-Expires=60"));
        assert!(url.contains("X-Amz-Date=20240501T120000Z"));
        assert!(url.contains("X-Amz-SignedHeaders=host%3Bx-k8s-aws-id"));
        assert!(url.contains("X-Amz-Signature="));
        assert!(url.contains("AKIDEXAMPLE%2F20240501%2Fus-west-2%2Fsts%2Faws4_request"));
    }

    #[test]
    fn test_signature_depends_on_cluster() {
        let generator = generator(StsEndpointScope::Regional, "us-west-2");
        let time = SystemTime::from(fixed_now());

        let a = generator.presign("cluster-a", time).unwrap();
        let b = generator.presign("cluster-b", time).unwrap();
        let a_again = generator.presign("cluster-a", time).unwrap();

        assert_ne!(a, b);
        assert_eq!(a, a_again);
    }

    #[test]
    fn test_generate_expiration_follows_ttl_not_presign_window() {
        let generator = generator(StsEndpointScope::Regional, "us-west-2");

        let (token, expires_at) = generator.generate("my-cluster", 900, fixed_now()).unwrap();

        assert!(token.starts_with("k8s-aws-v1."));
        assert_eq!(expires_at, fixed_now() + Duration::seconds(900));

        let url = decode_token(&token).unwrap();
        assert!(url.contains("X-Amz-Expires=60"));
    }

    #[test]
    fn test_session_token_is_included() {
        let credentials = Credentials::new("AKID", "SECRET", Some("SESSION".to_string()), None, "test");
        let generator = TokenGenerator::new(
            credentials,
            StsEndpoint::resolve("us-east-1", StsEndpointScope::Regional),
        );

        let url = generator
            .presign("c", SystemTime::from(fixed_now()))
            .unwrap();
        assert!(url.contains("X-Amz-Security-Token=SESSION"));
    }

    #[test]
    fn test_out_of_range_ttl_is_a_signing_error() {
        let generator = generator(StsEndpointScope::Regional, "us-west-2");
        let err = generator.generate("c", u64::MAX, fixed_now()).unwrap_err();
        assert!(matches!(err, TokenError::Signing { .. }));
    }
}
