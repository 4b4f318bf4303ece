use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::auth::{AccessGate, AuthPolicy};
use crate::error::AppError;
use crate::middleware::{authorize, Authorized};
use crate::routes::groups::authorize_member;
use crate::store::{NewTransaction, Store};
use crate::validators::{is_valid_amount, is_valid_label};

#[derive(Deserialize)]
pub struct CreateTransactionRequest {
    pub amount: f64,
    pub category: String,
}

/// POST /api/users/{username}/transactions (only that user)
pub async fn create_transaction(
    req: HttpRequest,
    path: web::Path<String>,
    form: web::Json<CreateTransactionRequest>,
    gate: web::Data<AccessGate>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let username = path.into_inner();
    let authorized = authorize(&req, &gate, &AuthPolicy::self_only(username.as_str()))?;

    let amount = is_valid_amount(form.amount)?;
    let category = is_valid_label("category", &form.category)?;

    let transaction = store
        .insert_transaction(NewTransaction {
            username,
            amount,
            category,
        })
        .await?;

    tracing::info!(transaction_id = %transaction.id, username = %transaction.username, "Transaction recorded");

    Ok(authorized.respond(HttpResponse::Created(), transaction))
}

/// GET /api/users/{username}/transactions (only that user)
pub async fn list_user_transactions(
    req: HttpRequest,
    path: web::Path<String>,
    gate: web::Data<AccessGate>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let username = path.into_inner();
    let authorized = authorize(&req, &gate, &AuthPolicy::self_only(username.as_str()))?;

    let transactions = store.transactions_for_user(&username).await?;
    Ok(authorized.respond(HttpResponse::Ok(), transactions))
}

/// GET /api/transactions (admin only)
pub async fn list_all_transactions(
    authorized: web::ReqData<Authorized>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let transactions = store.all_transactions().await?;
    Ok(authorized.respond(HttpResponse::Ok(), transactions))
}

/// GET /api/groups/{name}/transactions (group members only)
pub async fn list_group_transactions(
    req: HttpRequest,
    path: web::Path<String>,
    gate: web::Data<AccessGate>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let (group, authorized) = authorize_member(&req, &gate, store.get_ref(), &path).await?;

    let transactions = store.transactions_for_emails(&group.member_emails).await?;
    Ok(authorized.respond(HttpResponse::Ok(), transactions))
}
