//! Caller identity from request headers.
//!
//! # Responsibilities
//! - Read the numeric user id headers set by the upstream auth layer
//! - Decode the optional JSON user document
//! - Hand the result to the dispatcher as an opaque `Identity`
//!
//! # Design Decisions
//! - Authentication happens upstream; headers are trusted as given
//! - Missing or non-numeric id headers are `None`, not errors
//! - A present but undecodable user document is an error (fail closed)

use std::str::FromStr;

use axum::http::header::{HeaderMap, HeaderName, InvalidHeaderName};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::IdentityConfig;

/// Identity of the caller, attached to every `ControllerRequest`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Identity {
    pub user_id: Option<i64>,
    pub half_auth_user_id: Option<i64>,
    pub user: Option<User>,
}

/// User document forwarded by the auth layer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct User {
    #[serde(rename = "UserID", alias = "userId", alias = "user_id", default)]
    pub user_id: i64,

    #[serde(rename = "Email", alias = "email", default)]
    pub email: String,

    #[serde(rename = "FullName", alias = "fullName", alias = "full_name", default)]
    pub full_name: String,

    /// The header value exactly as received.
    #[serde(skip)]
    pub json: String,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Unable to retrieve user information. Unauthorized: {0}")]
    InvalidUser(#[from] serde_json::Error),

    /// Returned by custom `IdentityExtractor`s that refuse a request
    /// outright. `HeaderIdentity` never rejects.
    #[error("Unauthorized: {0}")]
    Rejected(String),
}

/// Source of caller identity. Swap in a different implementation to
/// integrate another auth scheme.
pub trait IdentityExtractor: Send + Sync + 'static {
    fn extract(&self, headers: &HeaderMap) -> Result<Identity, IdentityError>;
}

/// Reads identity from configurable request headers.
#[derive(Debug, Clone)]
pub struct HeaderIdentity {
    user_id_header: HeaderName,
    half_auth_header: HeaderName,
    user_header: HeaderName,
}

impl HeaderIdentity {
    pub fn from_config(config: &IdentityConfig) -> Result<Self, InvalidHeaderName> {
        Ok(Self {
            user_id_header: HeaderName::from_str(&config.user_id_header)?,
            half_auth_header: HeaderName::from_str(&config.half_auth_header)?,
            user_header: HeaderName::from_str(&config.user_header)?,
        })
    }

    fn id(&self, headers: &HeaderMap, name: &HeaderName) -> Option<i64> {
        headers.get(name)?.to_str().ok()?.parse().ok()
    }
}

impl Default for HeaderIdentity {
    fn default() -> Self {
        Self {
            user_id_header: HeaderName::from_static("x-user-id"),
            half_auth_header: HeaderName::from_static("x-half-auth-user-id"),
            user_header: HeaderName::from_static("x-user"),
        }
    }
}

impl IdentityExtractor for HeaderIdentity {
    fn extract(&self, headers: &HeaderMap) -> Result<Identity, IdentityError> {
        let user = match headers.get(&self.user_header) {
            Some(raw) => {
                let mut user: User = serde_json::from_slice(raw.as_bytes())?;
                user.json = String::from_utf8_lossy(raw.as_bytes()).into_owned();
                Some(user)
            }
            None => None,
        };

        Ok(Identity {
            user_id: self.id(headers, &self.user_id_header),
            half_auth_user_id: self.id(headers, &self.half_auth_header),
            user,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_user_ids() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_static("12"));
        let identity = HeaderIdentity::default().extract(&headers).unwrap();
        assert_eq!(identity.user_id, Some(12));
        assert_eq!(identity.half_auth_user_id, None);
        assert_eq!(identity.user, None);

        headers.remove("x-user-id");
        headers.insert("x-half-auth-user-id", HeaderValue::from_static("123"));
        let identity = HeaderIdentity::default().extract(&headers).unwrap();
        assert_eq!(identity.user_id, None);
        assert_eq!(identity.half_auth_user_id, Some(123));
    }

    #[test]
    fn test_non_numeric_id_is_none() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_static("abc"));
        let identity = HeaderIdentity::default().extract(&headers).unwrap();
        assert_eq!(identity.user_id, None);
    }

    #[test]
    fn test_user_document() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user", HeaderValue::from_static(r#"{"Email":"test@test.com"}"#));
        let identity = HeaderIdentity::default().extract(&headers).unwrap();
        let user = identity.user.unwrap();
        assert_eq!(user.email, "test@test.com");
        assert_eq!(user.json, r#"{"Email":"test@test.com"}"#);
    }

    #[test]
    fn test_bad_user_document() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user", HeaderValue::from_static("not json"));
        let err = HeaderIdentity::default().extract(&headers).unwrap_err();
        assert!(err
            .to_string()
            .starts_with("Unable to retrieve user information. Unauthorized:"));
    }

    #[test]
    fn test_custom_header_names() {
        let config = IdentityConfig {
            user_id_header: "X-Account".into(),
            ..IdentityConfig::default()
        };
        let extractor = HeaderIdentity::from_config(&config).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("x-account", HeaderValue::from_static("7"));
        assert_eq!(extractor.extract(&headers).unwrap().user_id, Some(7));

        let bad = IdentityConfig {
            user_header: "bad header".into(),
            ..IdentityConfig::default()
        };
        assert!(HeaderIdentity::from_config(&bad).is_err());
    }
}
