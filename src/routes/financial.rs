use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use crate::{
    db::{
        self,
        financial::{self, FinancialKind},
    },
    errors::AppError,
    routes::{found, non_negative, required, scope_from_body},
    session::TenantSession,
    utils::non_blank,
    AppState,
};

#[derive(Deserialize)]
pub struct RecordForm {
    description: Option<String>,
    date: Option<NaiveDate>,
    value: Option<f64>,
    company_id: Option<i64>,
}

#[derive(Deserialize)]
pub struct MonthFilter {
    month: Option<String>,
}

fn not_found(kind: FinancialKind) -> String {
    format!("{} not found or does not belong to this company", kind.label())
}

fn keys(kind: FinancialKind) -> (&'static str, &'static str) {
    match kind {
        FinancialKind::Entry => ("entryId", "entries"),
        FinancialKind::Exit => ("exitId", "exits"),
    }
}

async fn create(
    kind: FinancialKind,
    form: RecordForm,
    tenant: TenantSession,
    state: &AppState,
) -> Result<HttpResponse, AppError> {
    let company_id = tenant.company_from_body(form.company_id, "Company not found")?;
    let missing = "Description, date and value are required";
    let record = financial::NewRecord {
        description: required(non_blank(form.description), missing)?,
        date: required(form.date, missing)?,
        value: required(non_negative(form.value, "Value")?, missing)?,
    };

    let id = financial::create(&state.db_pool, kind, company_id, record).await?;
    let (id_key, _) = keys(kind);
    Ok(HttpResponse::Created().json(json!({
        "message": format!("{} added successfully", kind.label()),
        id_key: id,
    })))
}

async fn list(
    kind: FinancialKind,
    claimed_company: i64,
    filter: MonthFilter,
    tenant: TenantSession,
    state: &AppState,
) -> Result<HttpResponse, AppError> {
    let company_id = tenant.company(claimed_company)?;
    let month = non_blank(filter.month)
        .map(|m| financial::parse_month(&m))
        .transpose()?;
    let records = financial::list(&state.db_pool, kind, company_id, month.as_deref()).await?;
    let (_, list_key) = keys(kind);
    Ok(HttpResponse::Ok().json(json!({ list_key: records })))
}

async fn update(
    kind: FinancialKind,
    id: i64,
    form: RecordForm,
    tenant: TenantSession,
    state: &AppState,
) -> Result<HttpResponse, AppError> {
    let company_id = tenant.company_from_body(form.company_id, &not_found(kind))?;
    let changes = financial::RecordChanges {
        description: non_blank(form.description),
        date: form.date,
        value: non_negative(form.value, "Value")?,
    };

    let rows = financial::update(&state.db_pool, kind, id, company_id, changes).await?;
    found(rows, &not_found(kind))?;
    Ok(HttpResponse::Ok().json(json!({
        "message": format!("{} updated successfully", kind.label())
    })))
}

async fn remove(
    kind: FinancialKind,
    id: i64,
    body: web::Bytes,
    tenant: TenantSession,
    state: &AppState,
) -> Result<HttpResponse, AppError> {
    let claimed = scope_from_body(&body)?;
    let company_id = tenant.company_from_body(claimed, &not_found(kind))?;
    let rows = db::delete_scoped(&state.db_pool, kind.table(), id, company_id).await?;
    found(rows, &not_found(kind))?;
    Ok(HttpResponse::Ok().json(json!({
        "message": format!("{} deleted successfully", kind.label())
    })))
}

#[post("/financial-entries")]
pub async fn create_entry_handler(
    web::Json(form): web::Json<RecordForm>,
    tenant: TenantSession,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    create(FinancialKind::Entry, form, tenant, &state).await
}

#[get("/financial-entries/{company_id}")]
pub async fn list_entries_handler(
    path: web::Path<i64>,
    filter: web::Query<MonthFilter>,
    tenant: TenantSession,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    list(FinancialKind::Entry, path.into_inner(), filter.into_inner(), tenant, &state).await
}

#[put("/financial-entries/{id}")]
pub async fn update_entry_handler(
    path: web::Path<i64>,
    web::Json(form): web::Json<RecordForm>,
    tenant: TenantSession,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    update(FinancialKind::Entry, path.into_inner(), form, tenant, &state).await
}

#[delete("/financial-entries/{id}")]
pub async fn delete_entry_handler(
    path: web::Path<i64>,
    body: web::Bytes,
    tenant: TenantSession,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    remove(FinancialKind::Entry, path.into_inner(), body, tenant, &state).await
}

#[post("/financial-exits")]
pub async fn create_exit_handler(
    web::Json(form): web::Json<RecordForm>,
    tenant: TenantSession,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    create(FinancialKind::Exit, form, tenant, &state).await
}

#[get("/financial-exits/{company_id}")]
pub async fn list_exits_handler(
    path: web::Path<i64>,
    filter: web::Query<MonthFilter>,
    tenant: TenantSession,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    list(FinancialKind::Exit, path.into_inner(), filter.into_inner(), tenant, &state).await
}

#[put("/financial-exits/{id}")]
pub async fn update_exit_handler(
    path: web::Path<i64>,
    web::Json(form): web::Json<RecordForm>,
    tenant: TenantSession,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    update(FinancialKind::Exit, path.into_inner(), form, tenant, &state).await
}

#[delete("/financial-exits/{id}")]
pub async fn delete_exit_handler(
    path: web::Path<i64>,
    body: web::Bytes,
    tenant: TenantSession,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    remove(FinancialKind::Exit, path.into_inner(), body, tenant, &state).await
}
