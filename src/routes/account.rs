use actix_web::{delete, get, put, web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use crate::{
    db::{companies, users},
    errors::AppError,
    routes::found,
    session::{self, TenantSession},
    utils::{self, non_blank},
    AppState,
};

#[get("/company/profile/{company_id}")]
pub async fn get_profile_handler(
    path: web::Path<i64>,
    tenant: TenantSession,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let company_id = tenant.company(path.into_inner())?;
    let company = companies::get(&state.db_pool, company_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Company not found".to_owned()))?;
    Ok(HttpResponse::Ok().json(json!({ "company": company })))
}

#[derive(Deserialize)]
pub struct CompanyProfile {
    name: Option<String>,
    email: Option<String>,
    #[serde(alias = "cnpj")]
    tax_id: Option<String>,
}

#[put("/company/profile/{company_id}")]
pub async fn update_profile_handler(
    path: web::Path<i64>,
    web::Json(form): web::Json<CompanyProfile>,
    tenant: TenantSession,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let company_id = tenant.company(path.into_inner())?;
    let email = non_blank(form.email).map(|e| e.to_lowercase());
    if email.as_deref().is_some_and(|e| !utils::looks_like_email(e)) {
        return Err(AppError::Validation("Invalid email address".to_owned()));
    }

    let rows = companies::update(
        &state.db_pool,
        company_id,
        companies::CompanyChanges {
            name: non_blank(form.name),
            tax_id: non_blank(form.tax_id),
            email,
        },
    )
    .await?;
    found(rows, "Company not found")?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Company profile updated successfully" })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePassword {
    current_password: Option<String>,
    new_password: Option<String>,
}

#[put("/user/password/{user_id}")]
pub async fn change_password_handler(
    path: web::Path<i64>,
    web::Json(form): web::Json<ChangePassword>,
    tenant: TenantSession,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let user_id = tenant.user(path.into_inner())?;
    let (Some(current), Some(new_password)) = (
        form.current_password.filter(|p| !p.is_empty()),
        form.new_password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::Validation(
            "Current and new passwords are required".to_owned(),
        ));
    };

    let user = users::get_user_by_id(&state.db_pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_owned()))?;

    if !utils::verify_password_blocking(current, user.pwd_hash.clone()).await? {
        log::warn!("Current password verification failed for user {}", user.id);
        return Err(AppError::Unauthorized("Current password is incorrect".to_owned()));
    }
    utils::check_password_strength(&new_password)?;

    let pwd_hash = utils::hash_password_blocking(new_password).await?;
    users::update_password(&state.db_pool, user.id, &pwd_hash).await?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Password changed successfully" })))
}

#[delete("/user/{user_id}")]
pub async fn delete_user_handler(
    path: web::Path<i64>,
    tenant: TenantSession,
    state: web::Data<AppState>,
    request: HttpRequest,
) -> Result<impl Responder, AppError> {
    let user_id = tenant.user(path.into_inner())?;
    found(users::delete_user(&state.db_pool, user_id).await?, "User not found")?;
    session::end(&request);
    Ok(HttpResponse::Ok().json(json!({ "message": "User deleted successfully" })))
}

#[delete("/company/{company_id}")]
pub async fn delete_company_handler(
    path: web::Path<i64>,
    tenant: TenantSession,
    state: web::Data<AppState>,
    request: HttpRequest,
) -> Result<impl Responder, AppError> {
    let company_id = tenant.company(path.into_inner())?;
    found(
        companies::delete(&state.db_pool, company_id).await?,
        "Company not found",
    )?;
    session::end(&request);
    Ok(HttpResponse::Ok().json(json!({
        "message": "Company and all related data deleted successfully"
    })))
}
