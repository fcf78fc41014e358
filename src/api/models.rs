use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::constants::{EXEC_CREDENTIAL_API_VERSION, EXEC_CREDENTIAL_KIND};

/// Kubernetes `ExecCredential` as emitted on stdout and stored in the cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    pub kind: String,
    pub api_version: String,
    pub status: TokenStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenStatus {
    /// RFC3339 instant. Kept as text so a malformed cache entry can still be
    /// loaded and then judged invalid instead of failing to parse.
    pub expiration_timestamp: String,
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_certificate_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_key_data: Option<String>,
}

impl TokenRecord {
    pub fn new(token: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            kind: EXEC_CREDENTIAL_KIND.to_string(),
            api_version: EXEC_CREDENTIAL_API_VERSION.to_string(),
            status: TokenStatus {
                expiration_timestamp: expires_at.to_rfc3339_opts(SecondsFormat::Secs, true),
                token,
                client_certificate_data: None,
                client_key_data: None,
            },
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.status.expiration_timestamp)
            .ok()
            .map(|ts| ts.with_timezone(&Utc))
    }

    /// True iff the expiration instant is strictly after `now`.
    ///
    /// Wall-clock time is used on purpose: the remote verifier compares
    /// against its own clock, not this process's monotonic one.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at() {
            Some(expires_at) => expires_at > now,
            None => false,
        }
    }

    /// Copy of this record with certificate and key data removed.
    pub fn without_client_credentials(&self) -> Self {
        let mut stripped = self.clone();
        stripped.status.client_certificate_data = None;
        stripped.status.client_key_data = None;
        stripped
    }

    /// Compact JSON, the exact form written to both stdout and the cache.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_new_record_uses_exec_credential_schema() {
        let record = TokenRecord::new("k8s-aws-v1.abc".to_string(), fixed_now());

        assert_eq!(record.kind, "ExecCredential");
        assert_eq!(record.api_version, "client.authentication.k8s.io/v1beta1");
        assert_eq!(record.status.expiration_timestamp, "2024-05-01T12:00:00Z");
    }

    #[test]
    fn test_validity_against_fixed_clock() {
        let now = fixed_now();

        let past = TokenRecord::new("t".to_string(), now - Duration::seconds(1));
        let exact = TokenRecord::new("t".to_string(), now);
        let future = TokenRecord::new("t".to_string(), now + Duration::seconds(1));

        assert!(!past.is_valid(now));
        assert!(!exact.is_valid(now));
        assert!(future.is_valid(now));
    }

    #[test]
    fn test_unparseable_expiration_is_invalid() {
        let mut record = TokenRecord::new("t".to_string(), fixed_now() + Duration::hours(1));
        record.status.expiration_timestamp = "tomorrow-ish".to_string();

        assert!(record.expires_at().is_none());
        assert!(!record.is_valid(fixed_now()));
    }

    #[test]
    fn test_offset_timestamps_are_compared_as_instants() {
        let mut record = TokenRecord::new("t".to_string(), fixed_now());
        // 13:30 at +02:00 is 11:30 UTC
        record.status.expiration_timestamp = "2024-05-01T13:30:00+02:00".to_string();

        assert!(!record.is_valid(fixed_now()));
    }

    #[test]
    fn test_json_omits_absent_client_credentials() {
        let record = TokenRecord::new("k8s-aws-v1.abc".to_string(), fixed_now());
        let json = record.to_json().unwrap();

        assert_eq!(
            json,
            r#"{"kind":"ExecCredential","apiVersion":"client.authentication.k8s.io/v1beta1","status":{"expirationTimestamp":"2024-05-01T12:00:00Z","token":"k8s-aws-v1.abc"}}"#
        );
    }

    #[test]
    fn test_json_round_trip_with_and_without_client_credentials() {
        let plain = TokenRecord::new("k8s-aws-v1.abc".to_string(), fixed_now());
        let mut with_certs = plain.clone();
        with_certs.status.client_certificate_data = Some("CERT".to_string());
        with_certs.status.client_key_data = Some("KEY".to_string());

        for record in [plain, with_certs] {
            let parsed: TokenRecord = serde_json::from_str(&record.to_json().unwrap()).unwrap();
            assert_eq!(parsed, record);
        }
    }

    #[test]
    fn test_without_client_credentials_strips_both_fields() {
        let mut record = TokenRecord::new("t".to_string(), fixed_now());
        record.status.client_certificate_data = Some("CERT".to_string());
        record.status.client_key_data = Some("KEY".to_string());

        let stripped = record.without_client_credentials();
        assert_eq!(stripped.status.client_certificate_data, None);
        assert_eq!(stripped.status.client_key_data, None);
        assert_eq!(stripped.status.token, record.status.token);

        let json = stripped.to_json().unwrap();
        assert!(!json.contains("clientCertificateData"));
        assert!(!json.contains("clientKeyData"));
        assert!(!json.contains("CERT"));
    }
}
