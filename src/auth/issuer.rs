/// Token pair issuance
///
/// Mints the access/refresh pair handed out at login. Persisting the refresh
/// token and setting cookies is left to the login route.

use crate::auth::claims::IdentityClaims;
use crate::auth::jwt::TokenKeys;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

/// Access and refresh tokens signed from the same identity
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct TokenIssuer {
    keys: TokenKeys,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

impl TokenIssuer {
    pub fn new(config: &JwtSettings) -> Self {
        Self {
            keys: TokenKeys::new(config),
            access_token_expiry: config.access_token_expiry,
            refresh_token_expiry: config.refresh_token_expiry,
        }
    }

    /// Sign a fresh access/refresh pair for `identity`
    ///
    /// # Errors
    /// Returns error if either token cannot be signed
    pub fn issue(&self, identity: &IdentityClaims) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            access_token: self.mint_access(identity)?,
            refresh_token: self.mint(identity, self.refresh_token_expiry)?,
        })
    }

    /// Sign a stand-alone access token, used when renewing an expired one
    pub fn mint_access(&self, identity: &IdentityClaims) -> Result<String, AppError> {
        self.mint(identity, self.access_token_expiry)
    }

    pub fn access_token_expiry(&self) -> i64 {
        self.access_token_expiry
    }

    pub fn refresh_token_expiry(&self) -> i64 {
        self.refresh_token_expiry
    }

    pub(crate) fn keys(&self) -> &TokenKeys {
        &self.keys
    }

    fn mint(&self, identity: &IdentityClaims, expiry_seconds: i64) -> Result<String, AppError> {
        self.keys
            .sign(identity, expiry_seconds)
            .map_err(|e| AppError::Auth(AuthError::TokenSigning(e.to_string())))
    }
}
