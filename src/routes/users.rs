use actix_web::{web, HttpRequest, HttpResponse};
use serde::Serialize;

use crate::auth::{AccessGate, AuthPolicy};
use crate::error::{AppError, DatabaseError};
use crate::middleware::{authorize, Authorized};
use crate::store::{Role, Store, User};

/// Public view of a user; never exposes hashes or tokens
#[derive(Serialize)]
pub struct UserSummary {
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            email: user.email,
            role: user.role,
        }
    }
}

/// GET /api/users (admin only)
pub async fn list_users(
    authorized: web::ReqData<Authorized>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let users: Vec<UserSummary> = store
        .list_users()
        .await?
        .into_iter()
        .map(UserSummary::from)
        .collect();

    Ok(authorized.respond(HttpResponse::Ok(), users))
}

/// GET /api/users/{username} (only that user)
pub async fn get_user(
    req: HttpRequest,
    path: web::Path<String>,
    gate: web::Data<AccessGate>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let username = path.into_inner();
    let authorized = authorize(&req, &gate, &AuthPolicy::self_only(username.as_str()))?;

    let user = store
        .find_user_by_username(&username)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("user".to_string()))?;

    Ok(authorized.respond(HttpResponse::Ok(), UserSummary::from(user)))
}
