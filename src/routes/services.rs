use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use crate::{
    db::{self, services},
    errors::AppError,
    routes::{found, non_negative, required, scope_from_body},
    session::TenantSession,
    utils::non_blank,
    AppState,
};

const NOT_FOUND: &str = "Service not found or does not belong to this company";

#[derive(Deserialize)]
pub struct ServiceForm {
    name: Option<String>,
    description: Option<String>,
    // older clients post this field as `value`
    #[serde(alias = "value")]
    price: Option<f64>,
    company_id: Option<i64>,
}

#[post("/services")]
pub async fn create_handler(
    web::Json(form): web::Json<ServiceForm>,
    tenant: TenantSession,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let company_id = tenant.company_from_body(form.company_id, "Company not found")?;
    let missing = "Name and price are required";
    let service = services::NewService {
        name: required(non_blank(form.name), missing)?,
        description: non_blank(form.description),
        price: required(non_negative(form.price, "Price")?, missing)?,
    };

    let id = services::create(&state.db_pool, company_id, service).await?;
    Ok(HttpResponse::Created().json(json!({
        "message": "Service added successfully",
        "serviceId": id,
    })))
}

#[get("/services/{company_id}")]
pub async fn list_handler(
    path: web::Path<i64>,
    tenant: TenantSession,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let company_id = tenant.company(path.into_inner())?;
    let services = services::list(&state.db_pool, company_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "services": services })))
}

#[put("/services/{id}")]
pub async fn update_handler(
    path: web::Path<i64>,
    web::Json(form): web::Json<ServiceForm>,
    tenant: TenantSession,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let company_id = tenant.company_from_body(form.company_id, NOT_FOUND)?;
    let changes = services::ServiceChanges {
        name: non_blank(form.name),
        description: non_blank(form.description),
        price: non_negative(form.price, "Price")?,
    };

    let rows = services::update(&state.db_pool, path.into_inner(), company_id, changes).await?;
    found(rows, NOT_FOUND)?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Service updated successfully" })))
}

#[delete("/services/{id}")]
pub async fn delete_handler(
    path: web::Path<i64>,
    body: web::Bytes,
    tenant: TenantSession,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let claimed = scope_from_body(&body)?;
    let company_id = tenant.company_from_body(claimed, NOT_FOUND)?;
    let rows = db::delete_scoped(&state.db_pool, "services", path.into_inner(), company_id).await?;
    found(rows, NOT_FOUND)?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Service deleted successfully" })))
}
