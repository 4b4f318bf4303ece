/// Request-level access checks
///
/// Binds the access gate to actix-web: reads the token cookies, evaluates a
/// policy and turns the decision into either an `Authorized` handle or an
/// `AppError` carrying the gate's reason.

use actix_web::cookie::Cookie;
use actix_web::{HttpRequest, HttpResponse, HttpResponseBuilder};
use serde::Serialize;

use crate::auth::{access_token_cookie, token_pair, AccessGate, AuthPolicy, IdentityClaims};
use crate::error::{AppError, AuthError};
use crate::response::ApiResponse;

/// Proof that the current request passed the gate
#[derive(Debug, Clone)]
pub struct Authorized {
    pub identity: IdentityClaims,
    pub reason: String,
    renewal_notice: Option<&'static str>,
    renewed_cookie: Option<Cookie<'static>>,
}

impl Authorized {
    /// Build a JSON success response, attaching the renewed access token
    /// cookie and notice when the gate refreshed the caller's token.
    pub fn respond<T: Serialize>(&self, mut builder: HttpResponseBuilder, data: T) -> HttpResponse {
        if let Some(cookie) = &self.renewed_cookie {
            builder.cookie(cookie.clone());
        }
        builder.json(ApiResponse {
            data,
            refreshed_token_message: self.renewal_notice,
        })
    }
}

/// Evaluate `policy` against the token cookies of `req`
pub fn authorize(
    req: &HttpRequest,
    gate: &AccessGate,
    policy: &AuthPolicy,
) -> Result<Authorized, AppError> {
    let (access_token, refresh_token) = token_pair(req);
    let decision = gate.evaluate(access_token.as_deref(), refresh_token.as_deref(), policy);

    let renewal_notice = decision.renewal_notice();
    let missing_token = decision.is_missing_token();
    let renewed_cookie = decision
        .renewed_access_token
        .map(|token| access_token_cookie(token, gate.access_token_expiry()));

    if !decision.allowed {
        tracing::warn!(
            path = %req.path(),
            policy = policy.name(),
            reason = %decision.reason,
            "Access denied"
        );
        let error = if missing_token {
            AuthError::MissingToken(decision.reason)
        } else {
            AuthError::Denied {
                reason: decision.reason,
                renewed_cookie,
            }
        };
        return Err(error.into());
    }

    let identity = decision
        .identity
        .ok_or_else(|| AppError::Internal("allowed decision without identity".to_string()))?;

    tracing::debug!(
        username = %identity.username,
        policy = policy.name(),
        reason = %decision.reason,
        "Access granted"
    );

    Ok(Authorized {
        identity,
        reason: decision.reason,
        renewal_notice,
        renewed_cookie,
    })
}
