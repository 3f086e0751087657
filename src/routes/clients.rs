use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use crate::{
    db::{self, clients},
    errors::AppError,
    routes::{found, required, scope_from_body},
    session::TenantSession,
    utils::{looks_like_email, non_blank},
    AppState,
};

const NOT_FOUND: &str = "Client not found or does not belong to this company";

#[derive(Deserialize)]
pub struct ClientForm {
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    city: Option<String>,
    company_id: Option<i64>,
}

fn checked_email(email: Option<String>) -> Result<Option<String>, AppError> {
    match non_blank(email).map(|e| e.to_lowercase()) {
        Some(email) if !looks_like_email(&email) => {
            Err(AppError::Validation("Invalid email address".to_owned()))
        }
        other => Ok(other),
    }
}

#[post("/clients")]
pub async fn create_handler(
    web::Json(form): web::Json<ClientForm>,
    tenant: TenantSession,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let company_id = tenant.company_from_body(form.company_id, "Company not found")?;
    let missing = "Name and email are required";
    let client = clients::NewClient {
        name: required(non_blank(form.name), missing)?,
        email: required(checked_email(form.email)?, missing)?,
        phone: non_blank(form.phone),
        city: non_blank(form.city),
    };

    let id = clients::create(&state.db_pool, company_id, client).await?;
    Ok(HttpResponse::Created().json(json!({
        "message": "Client added successfully",
        "clientId": id,
    })))
}

#[get("/clients/{company_id}")]
pub async fn list_handler(
    path: web::Path<i64>,
    tenant: TenantSession,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let company_id = tenant.company(path.into_inner())?;
    let clients = clients::list(&state.db_pool, company_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "clients": clients })))
}

#[put("/clients/{id}")]
pub async fn update_handler(
    path: web::Path<i64>,
    web::Json(form): web::Json<ClientForm>,
    tenant: TenantSession,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let company_id = tenant.company_from_body(form.company_id, NOT_FOUND)?;
    let changes = clients::ClientChanges {
        name: non_blank(form.name),
        email: checked_email(form.email)?,
        phone: non_blank(form.phone),
        city: non_blank(form.city),
    };

    let rows = clients::update(&state.db_pool, path.into_inner(), company_id, changes).await?;
    found(rows, NOT_FOUND)?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Client updated successfully" })))
}

#[delete("/clients/{id}")]
pub async fn delete_handler(
    path: web::Path<i64>,
    body: web::Bytes,
    tenant: TenantSession,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let claimed = scope_from_body(&body)?;
    let company_id = tenant.company_from_body(claimed, NOT_FOUND)?;
    let rows = db::delete_scoped(&state.db_pool, "clients", path.into_inner(), company_id).await?;
    found(rows, NOT_FOUND)?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Client deleted successfully" })))
}
