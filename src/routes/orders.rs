use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use crate::{
    db::{self, orders},
    errors::AppError,
    routes::{found, non_negative, required, scope_from_body},
    session::TenantSession,
    structs::OrderStatus,
    AppState,
};

const NOT_FOUND: &str = "Service order not found or does not belong to this company";

#[derive(Deserialize)]
pub struct OrderForm {
    client_id: Option<i64>,
    service_id: Option<i64>,
    status: Option<OrderStatus>,
    value: Option<f64>,
    company_id: Option<i64>,
}

#[post("/orders")]
pub async fn create_handler(
    web::Json(form): web::Json<OrderForm>,
    tenant: TenantSession,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let company_id = tenant.company_from_body(form.company_id, "Company not found")?;
    let missing = "Client, service, status and value are required";
    let order = orders::NewOrder {
        client_id: required(form.client_id, missing)?,
        service_id: required(form.service_id, missing)?,
        status: required(form.status, missing)?,
        value: required(non_negative(form.value, "Value")?, missing)?,
    };

    let id = orders::create(&state.db_pool, company_id, order).await?;
    Ok(HttpResponse::Created().json(json!({
        "message": "Service order added successfully",
        "orderId": id,
    })))
}

#[get("/orders/{company_id}")]
pub async fn list_handler(
    path: web::Path<i64>,
    tenant: TenantSession,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let company_id = tenant.company(path.into_inner())?;
    let orders = orders::list(&state.db_pool, company_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "orders": orders })))
}

#[put("/orders/{id}")]
pub async fn update_handler(
    path: web::Path<i64>,
    web::Json(form): web::Json<OrderForm>,
    tenant: TenantSession,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let company_id = tenant.company_from_body(form.company_id, NOT_FOUND)?;
    let changes = orders::OrderChanges {
        client_id: form.client_id,
        service_id: form.service_id,
        status: form.status,
        value: non_negative(form.value, "Value")?,
    };

    let rows = orders::update(&state.db_pool, path.into_inner(), company_id, changes).await?;
    found(rows, NOT_FOUND)?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Service order updated successfully" })))
}

#[delete("/orders/{id}")]
pub async fn delete_handler(
    path: web::Path<i64>,
    body: web::Bytes,
    tenant: TenantSession,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let claimed = scope_from_body(&body)?;
    let company_id = tenant.company_from_body(claimed, NOT_FOUND)?;
    let rows = db::delete_scoped(&state.db_pool, "orders", path.into_inner(), company_id).await?;
    found(rows, NOT_FOUND)?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Service order deleted successfully" })))
}
