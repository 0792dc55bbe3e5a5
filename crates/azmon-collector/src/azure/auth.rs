//! Client profiles and the client-credentials token exchange
//!
//! Each monitored customer has a profile `azure_<client>.toml` in the
//! configuration directory:
//!
//! ```toml
//! tenant_id = "00000000-0000-0000-0000-000000000000"
//! client_id = "11111111-1111-1111-1111-111111111111"
//! client_secret = "..."
//! subscription_id = "22222222-2222-2222-2222-222222222222"
//! ```
//!
//! The keys may also sit under one named section, in which case the first
//! section in the file is used and any later ones are ignored:
//!
//! ```toml
//! [contoso-production]
//! tenant_id = "00000000-0000-0000-0000-000000000000"
//! # ...
//! ```
//!
//! Existing INI profiles (`azure_<client>.conf`) migrate by renaming the file
//! to `.toml` and quoting every value; the section header stays as it is.

use super::context::AzureContext;
use super::error::classify_response;
use crate::config::CollectorConfig;
use crate::error::CollectorError;
use azmon_common::defaults::{ARM_RESOURCE, AUTHORITY_HOST};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid profile {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Normalize a client name as given on the command line.
///
/// Host-style names are reduced to their first label: `Contoso.prod` → `contoso`.
pub fn extract_client_name(raw: &str) -> String {
    raw.trim()
        .split('.')
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// Profile file for a (normalized) client name
pub fn profile_path(conf_dir: &Path, client: &str) -> PathBuf {
    conf_dir.join(format!("azure_{client}.toml"))
}

/// Service principal credentials of one client
#[derive(Clone, Deserialize)]
pub struct ClientProfile {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub subscription_id: String,
}

impl ClientProfile {
    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ProfileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw).map_err(|source| ProfileError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse a profile given as top-level keys or inside its first section
    pub fn parse(raw: &str) -> Result<Self, toml::de::Error> {
        let table: toml::Table = raw.parse()?;
        if table.contains_key("tenant_id") {
            return toml::Value::Table(table).try_into();
        }
        match table.into_iter().find_map(|(_, v)| match v {
            toml::Value::Table(section) => Some(section),
            _ => None,
        }) {
            Some(section) => toml::Value::Table(section).try_into(),
            // Report the missing keys against the flat layout
            None => toml::Value::Table(toml::Table::new()).try_into(),
        }
    }
}

impl fmt::Debug for ClientProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientProfile")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("subscription_id", &self.subscription_id)
            .finish()
    }
}

/// Bearer token for Resource Manager calls
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Token endpoint of a tenant
pub fn token_url(authority: &str, tenant_id: &str) -> String {
    format!("{}/{tenant_id}/oauth2/token", authority.trim_end_matches('/'))
}

/// Resolves client names to authenticated [`AzureContext`]s
pub struct CredentialProvider<'a> {
    config: &'a CollectorConfig,
}

impl<'a> CredentialProvider<'a> {
    pub fn new(config: &'a CollectorConfig) -> Self {
        Self { config }
    }

    /// Load the client's profile and exchange its credentials for a token
    pub async fn authenticate(&self, client_name: &str) -> Result<AzureContext, CollectorError> {
        let client = extract_client_name(client_name);
        let fail = |reason: String| CollectorError::AuthenticationFailure {
            client: client.clone(),
            reason,
        };

        let path = profile_path(&self.config.conf_dir, &client);
        let profile = ClientProfile::load(&path).map_err(|e| fail(e.to_string()))?;
        info!(client = %client, tenant = %profile.tenant_id, "Authenticating");

        let http = super::context::build_http_client(self.config.timeout)
            .map_err(|e| fail(format!("{e:#}")))?;
        let token = self
            .request_token(&http, &profile)
            .await
            .map_err(|e| fail(format!("{e:#}")))?;

        Ok(AzureContext::new(http, token, &profile.subscription_id))
    }

    async fn request_token(
        &self,
        http: &reqwest::Client,
        profile: &ClientProfile,
    ) -> anyhow::Result<AccessToken> {
        let url = token_url(AUTHORITY_HOST, &profile.tenant_id);
        debug!(url = %url, client_id = %profile.client_id, "Requesting token");

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", profile.client_id.as_str()),
            ("client_secret", profile.client_secret.as_str()),
            ("resource", ARM_RESOURCE),
        ];
        let response = http.post(&url).form(&form).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(classify_response(status.as_u16(), &body).into());
        }

        let parsed: TokenResponse = serde_json::from_str(&body)?;
        Ok(AccessToken::new(parsed.access_token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PROFILE: &str = r#"
tenant_id = "tenant-1"
client_id = "app-1"
client_secret = "hunter2"
subscription_id = "sub-1"
"#;

    #[test]
    fn test_client_name_is_normalized() {
        assert_eq!(extract_client_name("Contoso"), "contoso");
        assert_eq!(extract_client_name("CONTOSO.prod.example"), "contoso");
        assert_eq!(extract_client_name(" fabrikam "), "fabrikam");
    }

    #[test]
    fn test_profile_path_uses_client_name() {
        assert_eq!(
            profile_path(Path::new("/etc/azmon"), "contoso"),
            PathBuf::from("/etc/azmon/azure_contoso.toml")
        );
    }

    #[test]
    fn test_token_url_for_tenant() {
        assert_eq!(
            token_url("https://login.microsoftonline.com/", "tenant-1"),
            "https://login.microsoftonline.com/tenant-1/oauth2/token"
        );
    }

    #[test]
    fn test_load_profile() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PROFILE.as_bytes()).unwrap();

        let profile = ClientProfile::load(file.path()).unwrap();
        assert_eq!(profile.tenant_id, "tenant-1");
        assert_eq!(profile.subscription_id, "sub-1");
        assert!(!format!("{profile:?}").contains("hunter2"));
    }

    #[test]
    fn test_sectioned_profile_uses_first_section() {
        let raw = r#"
[contoso-production]
tenant_id = "tenant-1"
client_id = "app-1"
client_secret = "hunter2"
subscription_id = "sub-1"

[contoso-staging]
tenant_id = "tenant-2"
client_id = "app-2"
client_secret = "x"
subscription_id = "sub-2"
"#;
        let profile = ClientProfile::parse(raw).unwrap();
        assert_eq!(profile.tenant_id, "tenant-1");
        assert_eq!(profile.subscription_id, "sub-1");
    }

    #[test]
    fn test_sectioned_profile_missing_keys() {
        let raw = "[contoso]\ntenant_id = \"t\"\n";
        assert!(ClientProfile::parse(raw).is_err());
        assert!(ClientProfile::parse("").is_err());
    }

    #[test]
    fn test_unquoted_ini_values_are_rejected() {
        let raw = "[contoso]\ntenant_id = contoso-tenant\n";
        assert!(ClientProfile::parse(raw).is_err());
    }

    #[test]
    fn test_load_profile_errors() {
        let missing = ClientProfile::load(Path::new("/nonexistent/azure_x.toml"));
        assert!(matches!(missing, Err(ProfileError::Io { .. })));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"tenant_id = \"t\"\n").unwrap();
        assert!(matches!(
            ClientProfile::load(file.path()),
            Err(ProfileError::Parse { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_profile_is_authentication_failure() {
        let dir = tempfile::tempdir().unwrap();
        let config = CollectorConfig {
            conf_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let err = CredentialProvider::new(&config)
            .authenticate("Contoso.prod")
            .await
            .unwrap_err();
        match err {
            CollectorError::AuthenticationFailure { client, reason } => {
                assert_eq!(client, "contoso");
                assert!(reason.contains("azure_contoso.toml"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_token_debug_is_redacted() {
        assert_eq!(
            format!("{:?}", AccessToken::new("eyJ0eXAi")),
            "AccessToken(<redacted>)"
        );
    }
}
