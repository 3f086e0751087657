use actix_web::{get, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    db::{
        clients,
        financial::{self, FinancialKind},
    },
    errors::AppError,
    session::TenantSession,
    structs::DashboardSummary,
    utils::non_blank,
    AppState,
};

#[derive(Deserialize)]
pub struct SummaryFilter {
    month: Option<String>,
}

/// Totals for one company, optionally restricted to a `YYYY-MM` month.
pub async fn summarize(
    pool: &SqlitePool,
    company_id: i64,
    month: Option<&str>,
) -> Result<DashboardSummary, AppError> {
    let entries = financial::list(pool, FinancialKind::Entry, company_id, month).await?;
    let exits = financial::list(pool, FinancialKind::Exit, company_id, month).await?;
    let client_count = clients::count(pool, company_id).await?;

    let total_entries: f64 = entries.iter().map(|e| e.value).sum();
    let total_exits: f64 = exits.iter().map(|e| e.value).sum();

    Ok(DashboardSummary {
        total_entries,
        total_exits,
        balance: total_entries - total_exits,
        entry_count: entries.len() as i64,
        exit_count: exits.len() as i64,
        client_count,
        monthly: financial::monthly_totals(&entries, &exits),
    })
}

#[get("/dashboard/{company_id}")]
pub async fn summary_handler(
    path: web::Path<i64>,
    filter: web::Query<SummaryFilter>,
    tenant: TenantSession,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let company_id = tenant.company(path.into_inner())?;
    let month = non_blank(filter.into_inner().month)
        .map(|m| financial::parse_month(&m))
        .transpose()?;
    let summary = summarize(&state.db_pool, company_id, month.as_deref()).await?;
    Ok(HttpResponse::Ok().json(json!({ "summary": summary })))
}
