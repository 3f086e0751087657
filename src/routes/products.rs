use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use crate::{
    db::{self, products},
    errors::AppError,
    routes::{found, non_negative, required, scope_from_body},
    session::TenantSession,
    utils::non_blank,
    AppState,
};

const NOT_FOUND: &str = "Product not found or does not belong to this company";

#[derive(Deserialize)]
pub struct ProductForm {
    name: Option<String>,
    category: Option<String>,
    price: Option<f64>,
    stock: Option<i64>,
    company_id: Option<i64>,
}

#[post("/products")]
pub async fn create_handler(
    web::Json(form): web::Json<ProductForm>,
    tenant: TenantSession,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let company_id = tenant.company_from_body(form.company_id, "Company not found")?;
    let missing = "Name, price and stock are required";
    let product = products::NewProduct {
        name: required(non_blank(form.name), missing)?,
        category: non_blank(form.category),
        price: required(non_negative(form.price, "Price")?, missing)?,
        stock: required(non_negative(form.stock, "Stock")?, missing)?,
    };

    let id = products::create(&state.db_pool, company_id, product).await?;
    Ok(HttpResponse::Created().json(json!({
        "message": "Product added successfully",
        "productId": id,
    })))
}

#[get("/products/{company_id}")]
pub async fn list_handler(
    path: web::Path<i64>,
    tenant: TenantSession,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let company_id = tenant.company(path.into_inner())?;
    let products = products::list(&state.db_pool, company_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "products": products })))
}

#[put("/products/{id}")]
pub async fn update_handler(
    path: web::Path<i64>,
    web::Json(form): web::Json<ProductForm>,
    tenant: TenantSession,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let company_id = tenant.company_from_body(form.company_id, NOT_FOUND)?;
    let changes = products::ProductChanges {
        name: non_blank(form.name),
        category: non_blank(form.category),
        price: non_negative(form.price, "Price")?,
        stock: non_negative(form.stock, "Stock")?,
    };

    let rows = products::update(&state.db_pool, path.into_inner(), company_id, changes).await?;
    found(rows, NOT_FOUND)?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Product updated successfully" })))
}

#[delete("/products/{id}")]
pub async fn delete_handler(
    path: web::Path<i64>,
    body: web::Bytes,
    tenant: TenantSession,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let claimed = scope_from_body(&body)?;
    let company_id = tenant.company_from_body(claimed, NOT_FOUND)?;
    let rows = db::delete_scoped(&state.db_pool, "products", path.into_inner(), company_id).await?;
    found(rows, NOT_FOUND)?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Product deleted successfully" })))
}
