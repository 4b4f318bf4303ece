/// JWT Claims structure
///
/// Both tokens of a pair carry the same identity claims; they differ only
/// in their expiry horizon.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Role literal granting access to `AdminOnly` endpoints
pub const ADMIN_ROLE: &str = "Admin";
pub const REGULAR_ROLE: &str = "Regular";

/// Identity embedded in access and refresh tokens.
///
/// Absent or `null` fields decode as empty so a signed token lacking them
/// still verifies and is then rejected by the completeness check instead of
/// failing as a malformed token. `id` accepts any JSON scalar.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct IdentityClaims {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub username: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub role: String,
    #[serde(default, deserialize_with = "any_as_string")]
    pub id: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn any_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

impl IdentityClaims {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        role: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            role: role.into(),
            id: id.into(),
        }
    }

    /// `username`, `email` and `role` are all present
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.email.is_empty() && !self.role.is_empty()
    }

    /// Same user as `other`. `id` is deliberately left out.
    pub fn same_identity(&self, other: &IdentityClaims) -> bool {
        self.username == other.username && self.email == other.email && self.role == other.role
    }

    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

/// Full token payload: identity plus registered time claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenClaims {
    #[serde(flatten)]
    pub identity: IdentityClaims,
    /// Issued at (Unix timestamp); not checked, so it may be absent
    #[serde(default)]
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl TokenClaims {
    pub fn new(identity: IdentityClaims, expiry_seconds: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            identity,
            iat: now,
            exp: now + expiry_seconds,
        }
    }

    /// A token whose expiry is not strictly in the future is expired
    pub fn is_expired(&self) -> bool {
        self.exp <= chrono::Utc::now().timestamp()
    }
}
