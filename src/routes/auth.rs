/// Authentication Routes
///
/// Registration, login (token pair issuance) and logout (refresh token
/// null-out). Login and logout are the only writers of a user's live
/// refresh token.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{
    access_token_cookie, expired_cookie, hash_password, refresh_token_cookie, token_pair,
    verify_password, TokenIssuer, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE,
};
use crate::error::{AppError, AuthError, DatabaseError};
use crate::middleware::Authorized;
use crate::response::{ApiResponse, Message};
use crate::store::{NewUser, Role, Store, User};
use crate::validators::{is_valid_email, is_valid_username};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
}

async fn create_user(
    form: &RegisterRequest,
    role: Role,
    store: &dyn Store,
) -> Result<User, AppError> {
    let username = is_valid_username(&form.username)?;
    let email = is_valid_email(&form.email)?;
    let password_hash = hash_password(&form.password)?;

    let user = store
        .insert_user(NewUser {
            username,
            email,
            password_hash,
            role,
        })
        .await?;

    tracing::info!(user_id = %user.id, username = %user.username, role = %user.role, "User registered");
    Ok(user)
}

/// POST /api/register
///
/// # Errors
/// - 400: invalid username, email or password
/// - 409: username or email already registered
pub async fn register(
    form: web::Json<RegisterRequest>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    create_user(&form, Role::Regular, store.get_ref()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(Message::new("User added successfully"))))
}

/// POST /api/admin
///
/// Same as register but creates an admin; only admins may call it.
pub async fn register_admin(
    authorized: web::ReqData<Authorized>,
    form: web::Json<RegisterRequest>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    create_user(&form, Role::Admin, store.get_ref()).await?;
    Ok(authorized.respond(HttpResponse::Ok(), Message::new("Admin added successfully")))
}

/// POST /api/login
///
/// Verifies credentials, issues a fresh token pair, stores the refresh token
/// on the user (replacing any previous one) and sets both token cookies.
///
/// # Errors
/// - 400: malformed email
/// - 401: unknown email or wrong password (same message for both)
pub async fn login(
    form: web::Json<LoginRequest>,
    store: web::Data<dyn Store>,
    issuer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, AppError> {
    let email = is_valid_email(&form.email)?;

    let user = store
        .find_user_by_email(&email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !verify_password(&form.password, &user.password_hash) {
        return Err(AuthError::InvalidCredentials.into());
    }

    let pair = issuer.issue(&user.identity())?;
    store
        .set_refresh_token(user.id, Some(&pair.refresh_token))
        .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "User logged in");

    Ok(HttpResponse::Ok()
        .cookie(access_token_cookie(
            pair.access_token.clone(),
            issuer.access_token_expiry(),
        ))
        .cookie(refresh_token_cookie(
            pair.refresh_token.clone(),
            issuer.refresh_token_expiry(),
        ))
        .json(ApiResponse::new(LoginResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        })))
}

/// GET /api/logout
///
/// Clears the live refresh token of whoever owns the presented cookie and
/// expires both token cookies.
///
/// # Errors
/// - 400: no refresh token cookie
/// - 404: no user holds this refresh token (already logged out)
pub async fn logout(
    req: HttpRequest,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let (_, refresh_token) = token_pair(&req);
    let refresh_token = refresh_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::MissingToken("refreshToken is missing".to_string()))?;

    let user = store
        .find_user_by_refresh_token(&refresh_token)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("user".to_string()))?;

    store.set_refresh_token(user.id, None).await?;

    tracing::info!(user_id = %user.id, username = %user.username, "User logged out");

    Ok(HttpResponse::Ok()
        .cookie(expired_cookie(ACCESS_TOKEN_COOKIE))
        .cookie(expired_cookie(REFRESH_TOKEN_COOKIE))
        .json(ApiResponse::new(Message::new("User logged out"))))
}
