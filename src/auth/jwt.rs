/// JWT Token Signing and Verification
///
/// HS256 with a secret injected from `JwtSettings`. Expiry is checked here
/// rather than by `jsonwebtoken` so that a token expiring in the current
/// second already counts as expired and no leeway applies.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::fmt;

use crate::auth::claims::{IdentityClaims, TokenClaims};
use crate::configuration::JwtSettings;

/// Why a token failed verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Signature is valid but the expiry horizon has passed
    Expired,
    /// Any other failure, labelled by category
    Invalid(&'static str),
}

impl TokenError {
    /// Category name surfaced as the gate's denial reason
    pub fn category(&self) -> &'static str {
        match self {
            TokenError::Expired => "TokenExpired",
            TokenError::Invalid(category) => category,
        }
    }
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.category())
    }
}

impl std::error::Error for TokenError {}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        let category = match err.kind() {
            ErrorKind::ExpiredSignature => return TokenError::Expired,
            ErrorKind::InvalidToken => "InvalidToken",
            ErrorKind::InvalidSignature => "InvalidSignature",
            ErrorKind::InvalidAlgorithm | ErrorKind::MissingAlgorithm => "InvalidAlgorithm",
            ErrorKind::MissingRequiredClaim(_) => "MissingRequiredClaim",
            ErrorKind::ImmatureSignature => "ImmatureSignature",
            ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => "MalformedToken",
            _ => "TokenError",
        };
        TokenError::Invalid(category)
    }
}

/// Signing material derived once from the configured secret
#[derive(Clone)]
pub struct TokenKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenKeys {
    pub fn new(config: &JwtSettings) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }

    /// Sign `identity` into a token valid for `expiry_seconds`
    pub fn sign(
        &self,
        identity: &IdentityClaims,
        expiry_seconds: i64,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = TokenClaims::new(identity.clone(), expiry_seconds);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
    }

    /// Verify signature, structure and expiry
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let claims = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)?.claims;
        if claims.is_expired() {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::REGULAR_ROLE;

    fn get_test_config() -> JwtSettings {
        JwtSettings::new("test-secret-key-at-least-32-characters-long")
    }

    fn identity() -> IdentityClaims {
        IdentityClaims::new("mario", "m@example.com", REGULAR_ROLE, "42")
    }

    #[test]
    fn test_sign_and_verify_token() {
        let keys = TokenKeys::new(&get_test_config());

        let token = keys.sign(&identity(), 3600).expect("Failed to sign token");
        let claims = keys.verify(&token).expect("Failed to verify token");

        assert_eq!(claims.identity, identity());
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_expired_token() {
        let keys = TokenKeys::new(&get_test_config());
        let token = keys.sign(&identity(), 0).expect("Failed to sign token");

        assert_eq!(keys.verify(&token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn test_garbage_token() {
        let keys = TokenKeys::new(&get_test_config());
        let err = keys.verify("invalid.token.here").unwrap_err();

        assert!(matches!(err, TokenError::Invalid(_)));
        assert_ne!(err.category(), "TokenExpired");
    }

    #[test]
    fn test_wrong_secret() {
        let keys = TokenKeys::new(&get_test_config());
        let other = TokenKeys::new(&JwtSettings::new("another-secret-key-of-sufficient-length"));

        let token = other.sign(&identity(), 3600).expect("Failed to sign token");

        assert_eq!(
            keys.verify(&token).unwrap_err(),
            TokenError::Invalid("InvalidSignature")
        );
    }

    #[test]
    fn test_bad_signature_wins_over_expiry() {
        let keys = TokenKeys::new(&get_test_config());
        let other = TokenKeys::new(&JwtSettings::new("another-secret-key-of-sufficient-length"));

        let token = other.sign(&identity(), 0).expect("Failed to sign token");

        assert_eq!(
            keys.verify(&token).unwrap_err(),
            TokenError::Invalid("InvalidSignature")
        );
    }
}
