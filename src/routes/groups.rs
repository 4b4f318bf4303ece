use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::auth::{AccessGate, AuthPolicy};
use crate::error::{AppError, DatabaseError};
use crate::middleware::{authorize, Authorized};
use crate::store::{Group, Store};
use crate::validators::{is_valid_email, is_valid_label};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default)]
    pub member_emails: Vec<String>,
}

/// POST /api/groups (any authenticated user)
///
/// The caller is always added as a member.
pub async fn create_group(
    authorized: web::ReqData<Authorized>,
    form: web::Json<CreateGroupRequest>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let name = is_valid_label("name", &form.name)?;

    let mut member_emails = vec![authorized.identity.email.clone()];
    for email in &form.member_emails {
        let email = is_valid_email(email)?;
        if !member_emails.contains(&email) {
            member_emails.push(email);
        }
    }

    let group = store
        .insert_group(Group {
            name,
            member_emails,
        })
        .await?;

    tracing::info!(
        group = %group.name,
        members = group.member_emails.len(),
        created_by = %authorized.identity.username,
        "Group created"
    );

    Ok(authorized.respond(HttpResponse::Created(), group))
}

/// Load a group and check the caller belongs to it
///
/// An unknown group is gated as a group with no members, so token failures
/// and non-members are rejected exactly as for an existing group. Only a
/// caller the gate lets through learns that the group does not exist.
pub(crate) async fn authorize_member(
    req: &HttpRequest,
    gate: &AccessGate,
    store: &dyn Store,
    name: &str,
) -> Result<(Group, Authorized), AppError> {
    let group = store.find_group(name).await?;

    let members = group
        .as_ref()
        .map(|g| g.member_emails.clone())
        .unwrap_or_default();
    let authorized = authorize(req, gate, &AuthPolicy::member_of(members))?;

    let group = group.ok_or_else(|| DatabaseError::NotFound("group".to_string()))?;
    Ok((group, authorized))
}

/// GET /api/groups/{name} (group members only)
pub async fn get_group(
    req: HttpRequest,
    path: web::Path<String>,
    gate: web::Data<AccessGate>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let (group, authorized) = authorize_member(&req, &gate, store.get_ref(), &path).await?;
    Ok(authorized.respond(HttpResponse::Ok(), group))
}
