/// Access Gate
///
/// Decides whether a request carrying an access/refresh token pair satisfies
/// an `AuthPolicy`. An expired access token paired with a live refresh token
/// is renewed transparently: the decision then carries a replacement access
/// token that the HTTP layer must hand back to the client.
///
/// The gate never fails. Every outcome, including malformed input, is a
/// `GateDecision` whose `reason` is meant to reach the client unchanged.

use crate::auth::claims::IdentityClaims;
use crate::auth::issuer::TokenIssuer;
use crate::auth::jwt::TokenError;
use crate::auth::policy::AuthPolicy;
use crate::configuration::JwtSettings;

pub const ACCESS_TOKEN_MISSING: &str = "accessToken is missing";
pub const REFRESH_TOKEN_MISSING: &str = "refreshToken is missing";
pub const TOKEN_MISSING_INFORMATION: &str = "Token is missing information";
pub const MISMATCHED_USERS: &str = "Mismatched users";
pub const PERFORM_LOGIN_AGAIN: &str = "Perform login again";

pub const AUTHORIZED: &str = "Authorized";
pub const CORRECT_USER: &str = "Correct User";
pub const WRONG_USER: &str = "Wrong User";
pub const USER_IS_ADMIN: &str = "User is Admin";
pub const USER_NOT_ADMIN: &str = "User is not Admin";
pub const USER_IN_GROUP: &str = "User belongs to Group";
pub const USER_NOT_IN_GROUP: &str = "User does not belong to Group";

/// Notice surfaced to the client whenever the access token was renewed
pub const RENEWAL_NOTICE: &str =
    "Access token has been refreshed. Remember to copy the new one in the headers of subsequent calls";

/// Outcome of one gate evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateDecision {
    pub allowed: bool,
    pub reason: String,
    /// Identity the policy was checked against, when the tokens verified
    pub identity: Option<IdentityClaims>,
    /// Replacement access token minted from the refresh token
    pub renewed_access_token: Option<String>,
    missing_token: bool,
}

impl GateDecision {
    fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
            identity: None,
            renewed_access_token: None,
            missing_token: false,
        }
    }

    fn missing(reason: &str) -> Self {
        Self {
            missing_token: true,
            ..Self::deny(reason)
        }
    }

    fn verdict(allowed: bool, reason: &str, identity: &IdentityClaims) -> Self {
        Self {
            allowed,
            reason: reason.to_string(),
            identity: Some(identity.clone()),
            renewed_access_token: None,
            missing_token: false,
        }
    }

    /// Denied because a token was not sent at all (client error, not auth failure)
    pub fn is_missing_token(&self) -> bool {
        self.missing_token
    }

    pub fn renewal_notice(&self) -> Option<&'static str> {
        self.renewed_access_token.as_ref().map(|_| RENEWAL_NOTICE)
    }
}

/// Which verification path produced the trusted claims
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClaimSource {
    TokenPair,
    Renewal,
}

#[derive(Clone)]
pub struct AccessGate {
    issuer: TokenIssuer,
}

impl AccessGate {
    pub fn new(config: &JwtSettings) -> Self {
        Self {
            issuer: TokenIssuer::new(config),
        }
    }

    pub fn from_issuer(issuer: TokenIssuer) -> Self {
        Self { issuer }
    }

    /// Lifetime of a renewed access token, in seconds
    pub fn access_token_expiry(&self) -> i64 {
        self.issuer.access_token_expiry()
    }

    /// Evaluate a token pair against `policy`
    pub fn evaluate(
        &self,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
        policy: &AuthPolicy,
    ) -> GateDecision {
        let Some(access_token) = access_token.filter(|t| !t.is_empty()) else {
            return GateDecision::missing(ACCESS_TOKEN_MISSING);
        };
        let Some(refresh_token) = refresh_token.filter(|t| !t.is_empty()) else {
            return GateDecision::missing(REFRESH_TOKEN_MISSING);
        };

        let keys = self.issuer.keys();
        let verified = keys
            .verify(access_token)
            .and_then(|access| keys.verify(refresh_token).map(|refresh| (access, refresh)));

        match verified {
            Ok((access, refresh)) => {
                let (access, refresh) = (&access.identity, &refresh.identity);
                if !access.is_complete() || !refresh.is_complete() {
                    return GateDecision::deny(TOKEN_MISSING_INFORMATION);
                }
                if !access.same_identity(refresh) {
                    return GateDecision::deny(MISMATCHED_USERS);
                }
                apply_policy(policy, &[access, refresh], ClaimSource::TokenPair)
            }
            Err(TokenError::Expired) => self.renew(refresh_token, policy),
            Err(err) => GateDecision::deny(err.category()),
        }
    }

    fn renew(&self, refresh_token: &str, policy: &AuthPolicy) -> GateDecision {
        let refresh = match self.issuer.keys().verify(refresh_token) {
            Ok(claims) => claims.identity,
            Err(TokenError::Expired) => return GateDecision::deny(PERFORM_LOGIN_AGAIN),
            Err(err) => return GateDecision::deny(err.category()),
        };

        let renewed = match self.issuer.mint_access(&refresh) {
            Ok(token) => token,
            Err(e) => {
                tracing::error!(error = %e, "Failed to mint renewed access token");
                return GateDecision::deny(PERFORM_LOGIN_AGAIN);
            }
        };

        tracing::info!(username = %refresh.username, "Access token renewed from refresh token");

        GateDecision {
            renewed_access_token: Some(renewed),
            ..apply_policy(policy, &[&refresh], ClaimSource::Renewal)
        }
    }
}

/// Single source of truth for both verification paths.
///
/// `claims` holds every token whose identity must satisfy the policy; the
/// first entry is reported as the caller's identity.
fn apply_policy(
    policy: &AuthPolicy,
    claims: &[&IdentityClaims],
    source: ClaimSource,
) -> GateDecision {
    let identity = claims[0];
    match policy {
        AuthPolicy::Anonymous => GateDecision::verdict(true, AUTHORIZED, identity),
        AuthPolicy::SelfOnly { username } => {
            if claims.iter().all(|c| c.username == *username) {
                GateDecision::verdict(true, CORRECT_USER, identity)
            } else {
                GateDecision::verdict(false, WRONG_USER, identity)
            }
        }
        AuthPolicy::AdminOnly => {
            if claims.iter().all(|c| c.is_admin()) {
                GateDecision::verdict(true, USER_IS_ADMIN, identity)
            } else {
                GateDecision::verdict(false, USER_NOT_ADMIN, identity)
            }
        }
        AuthPolicy::MemberOf { emails } => {
            if claims.iter().all(|c| emails.contains(&c.email)) {
                GateDecision::verdict(true, USER_IN_GROUP, identity)
            } else {
                // Renewal path lets non-members through while reporting the
                // denial reason. Kept as-is pending a product decision.
                let allowed = source == ClaimSource::Renewal;
                GateDecision::verdict(allowed, USER_NOT_IN_GROUP, identity)
            }
        }
    }
}
