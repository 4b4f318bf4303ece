/// Authentication module
///
/// Token pair issuance, the access gate that guards every protected route,
/// token cookies and password hashing.

mod claims;
mod cookies;
mod gate;
mod issuer;
mod jwt;
mod password;
mod policy;

pub use claims::{IdentityClaims, TokenClaims, ADMIN_ROLE, REGULAR_ROLE};
pub use cookies::{
    access_token_cookie, expired_cookie, refresh_token_cookie, token_pair, ACCESS_TOKEN_COOKIE,
    COOKIE_PATH, REFRESH_TOKEN_COOKIE,
};
pub use gate::{AccessGate, GateDecision, RENEWAL_NOTICE};
pub use issuer::{TokenIssuer, TokenPair};
pub use jwt::{TokenError, TokenKeys};
pub use password::{hash_password, hash_password_with_cost, verify_password};
pub use policy::AuthPolicy;
