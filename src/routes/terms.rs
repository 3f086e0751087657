use actix_web::{get, put, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use crate::{
    db::terms::{self, TermsSaved},
    errors::AppError,
    session::TenantSession,
    structs::Terms,
    utils::non_blank,
    AppState,
};

pub const DEFAULT_TERMS: &str = "No terms registered yet.";

#[get("/terms/{company_id}")]
pub async fn get_handler(
    path: web::Path<i64>,
    tenant: TenantSession,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let company_id = tenant.company(path.into_inner())?;
    let terms = terms::get(&state.db_pool, company_id)
        .await?
        .unwrap_or_else(|| Terms {
            content: DEFAULT_TERMS.to_owned(),
            last_updated: None,
        });
    Ok(HttpResponse::Ok().json(json!({ "terms": terms })))
}

#[derive(Deserialize)]
pub struct TermsForm {
    content: Option<String>,
}

#[put("/terms/{company_id}")]
pub async fn put_handler(
    path: web::Path<i64>,
    web::Json(form): web::Json<TermsForm>,
    tenant: TenantSession,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let company_id = tenant.company(path.into_inner())?;
    let Some(content) = non_blank(form.content) else {
        return Err(AppError::Validation("Terms content is required".to_owned()));
    };

    let response = match terms::upsert(&state.db_pool, company_id, &content).await? {
        TermsSaved::Created(id) => HttpResponse::Created().json(json!({
            "message": "Terms added successfully",
            "termId": id,
        })),
        TermsSaved::Updated => {
            HttpResponse::Ok().json(json!({ "message": "Terms updated successfully" }))
        }
    };
    Ok(response)
}
